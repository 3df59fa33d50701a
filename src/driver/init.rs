//! Generating the project's ninja files.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use super::build_statement;
use crate::config::Config;
use crate::constants::{GITIGNORE_CONTENTS, NINJA_REQUIRED_VERSION, PROGRAM_NAME};
use crate::filesystem::{Filesystem, Mode, WriteOutcome};
use crate::ninja::{NinjaSyntaxError, to_depfile, to_ninja};
use crate::paths::{self, FsPath};
use crate::templating::TemplateRenderer;

/// Regenerates the minimal config cache from `ginjarator.toml`.
///
/// Returns [`WriteOutcome::Unchanged`] when only non-minimal fields changed,
/// which is what keeps most templates from rescanning.
pub fn minimal_config(root: &Path) -> Result<WriteOutcome> {
    let mut fs = Filesystem::internal(root)?;
    let config = fs.read_config()?;
    let outcome = fs.write_text(&*paths::MINIMAL_CONFIG, &config.minimal.to_json()?, false)?;
    debug!(?outcome, "Wrote minimal config");
    Ok(outcome)
}

/// Initializes a project and generates `build.ninja`.
///
/// This is also the command ninja reruns whenever `build.ninja` is stale.
pub fn init(root: &Path) -> Result<()> {
    let mut fs = Filesystem::internal(root)?;
    let config = fs.read_config()?;

    fs.write_text(&*paths::GITIGNORE, GITIGNORE_CONTENTS, false)?;

    // The cache has its own edge in main.ninja, so it must not also be an
    // output of init.
    minimal_config(root)?;

    let mut subninjas = Vec::new();
    let mut subninjas_changed = false;

    for template in &config.ninja_templates {
        let output = paths::ninja_template_output(template);
        let contents = render_ninja_template(&mut fs, template)?;
        subninjas_changed |= fs.write_text(&output, &contents, false)?.changed();
        subninjas.push(output);
    }

    // main.ninja comes last so it can include everything the ninja
    // templates added, and it lists itself as an output of init.
    fs.add_output(&*paths::NINJA_MAIN, false)?;
    let main = main_ninja(&mut fs, &config)?;
    subninjas_changed |= fs.write_text(&*paths::NINJA_MAIN, &main, false)?.changed();
    subninjas.push(paths::NINJA_MAIN.clone());

    let entrypoint = entrypoint(&subninjas)?;
    // Ninja only reloads build.ninja when its mtime moves, so any change in
    // an included file has to touch it too.
    let outcome = if subninjas_changed {
        fs.write_text_forced(&*paths::NINJA_ENTRYPOINT, &entrypoint, false)?
    } else {
        fs.write_text(&*paths::NINJA_ENTRYPOINT, &entrypoint, false)?
    };

    info!(
        templates = config.templates.len(),
        ninja_templates = config.ninja_templates.len(),
        changed = outcome.changed(),
        "Generated build.ninja"
    );
    Ok(())
}

/// Renders a ninja template and records its dependencies on `internal`.
fn render_ninja_template(internal: &mut Filesystem, template: &FsPath) -> Result<String> {
    let mut renderer = TemplateRenderer::new(Filesystem::new(internal.root(), Mode::Ninja)?);
    let contents = renderer.render(template)?;
    let ninja_fs = renderer.into_filesystem()?;
    // Ninja mode can't write, so there are no outputs to copy.
    for dependency in ninja_fs.dependencies() {
        internal.add_dependency(dependency, false)?;
    }
    Ok(contents)
}

fn rules() -> String {
    format!(
        "ninja_required_version = {NINJA_REQUIRED_VERSION}

rule init
    command = {PROGRAM_NAME} init
    description = INIT
    generator = true
    restat = true

rule minimal_config
    command = {PROGRAM_NAME} minimal-config
    description = MINIMAL CONFIG
    restat = true

rule scan
    command = {PROGRAM_NAME} scan $template
    description = SCAN $template
    restat = true

rule render
    command = {PROGRAM_NAME} render $template
    description = RENDER $template
    restat = true

rule touch
    command = touch $out
"
    )
}

fn template_edges(template: &FsPath) -> Result<String, NinjaSyntaxError> {
    let path = to_ninja(template, false)?;
    let template_var = to_ninja(template, true)?;
    let state = to_ninja(&paths::template_state(template), false)?;
    let depfile = to_ninja(&paths::template_depfile(template), false)?;
    let dyndep = to_ninja(&paths::template_dyndep(template), false)?;
    let stamp = to_ninja(&paths::template_render_stamp(template), false)?;

    let scan = build_statement(
        &[
            state.clone(),
            "|".to_string(),
            depfile.clone(),
            dyndep.clone(),
            ":".to_string(),
            "scan".to_string(),
            path.clone(),
            "||".to_string(),
            to_ninja(&*paths::MINIMAL_CONFIG, false)?,
        ],
        &[("depfile", depfile), ("template", template_var.clone())],
    );
    let render = build_statement(
        &[
            stamp,
            ":".to_string(),
            "render".to_string(),
            path,
            "|".to_string(),
            state,
            "||".to_string(),
            dyndep.clone(),
            to_ninja(&*paths::SCAN_DONE_STAMP, false)?,
        ],
        &[("dyndep", dyndep), ("template", template_var)],
    );
    Ok(format!("{scan}\n{render}"))
}

fn main_ninja(fs: &mut Filesystem, config: &Config) -> Result<String> {
    let mut parts = vec![rules()];

    parts.push(build_statement(
        &[
            to_ninja(&*paths::MINIMAL_CONFIG, false)?,
            ":".to_string(),
            "minimal_config".to_string(),
            to_ninja(&*paths::CONFIG, false)?,
        ],
        &[],
    ));

    let mut states = Vec::new();
    for template in &config.templates {
        parts.push(template_edges(template)?);
        states.push(paths::template_state(template));
    }

    // Written before the init edge is formatted, so the depfile itself is
    // listed among init's outputs.
    let depfile = to_depfile(&*paths::NINJA_ENTRYPOINT, fs.dependencies())?;
    fs.write_text(&*paths::NINJA_ENTRYPOINT_DEPFILE, &depfile, false)?;

    parts.push(build_statement(
        &[
            to_ninja(&*paths::NINJA_ENTRYPOINT, false)?,
            to_ninja(fs.outputs(), false)?,
            ":".to_string(),
            "init".to_string(),
        ],
        &[("depfile", to_ninja(&*paths::NINJA_ENTRYPOINT_DEPFILE, false)?)],
    ));

    parts.push(build_statement(
        &[
            to_ninja(&*paths::SCAN_DONE_STAMP, false)?,
            ":".to_string(),
            "touch".to_string(),
            "|".to_string(),
            to_ninja(&states, false)?,
        ],
        &[("description", "STAMP done scanning".to_string())],
    ));

    Ok(parts.join("\n"))
}

fn entrypoint(subninjas: &[FsPath]) -> Result<String, NinjaSyntaxError> {
    let mut text = format!(
        "ninja_required_version = {NINJA_REQUIRED_VERSION}\nbuilddir = {}\n",
        to_ninja(&*paths::NINJA_BUILDDIR, false)?
    );
    for subninja in subninjas {
        text.push_str(&format!("subninja {}\n", to_ninja(subninja, false)?));
    }
    Ok(text)
}
