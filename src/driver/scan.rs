//! The scan pass.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::build_statement;
use super::state::TemplateState;
use crate::filesystem::{Filesystem, Mode};
use crate::ninja::{NinjaSyntaxError, to_depfile, to_ninja};
use crate::paths::{self, FsPath};
use crate::templating::TemplateRenderer;

/// Scans `template` for the dependencies and outputs of its render pass.
///
/// Writes the template's state, a depfile listing what the scan itself read,
/// and a dyndep file with the render edge's inputs and outputs.
pub fn scan(root: &Path, template: &FsPath) -> Result<TemplateState> {
    let mut internal = Filesystem::internal(root)?;

    let mut renderer = TemplateRenderer::new(Filesystem::new(root, Mode::Scan)?);
    renderer.render(template)?;
    let fs = renderer.into_filesystem()?;

    let state = TemplateState {
        dependencies: fs.dependencies().union(fs.deferred_dependencies()).cloned().collect(),
        outputs: fs.outputs().union(fs.deferred_outputs()).cloned().collect(),
    };
    info!(
        %template,
        dependencies = state.dependencies.len(),
        deferred = fs.deferred_dependencies().len(),
        outputs = state.outputs.len(),
        "Scanned template"
    );

    let state_path = paths::template_state(template);
    let state_json = state.to_json().context("Failed to serialize template state")?;
    internal.write_text(&state_path, &state_json, false)?;

    // Only what the scan read immediately: deferred dependencies may not
    // exist yet, and ninja would fail on a missing depfile input.
    let depfile = to_depfile(&state_path, fs.dependencies())?;
    internal.write_text(paths::template_depfile(template), &depfile, false)?;

    internal.write_text(paths::template_dyndep(template), &dyndep(template, &state)?, false)?;
    Ok(state)
}

fn dyndep(template: &FsPath, state: &TemplateState) -> Result<String, NinjaSyntaxError> {
    let statement = build_statement(
        &[
            to_ninja(&paths::template_render_stamp(template), false)?,
            "|".to_string(),
            to_ninja(&state.outputs, false)?,
            ":".to_string(),
            "dyndep".to_string(),
            "|".to_string(),
            to_ninja(&state.dependencies, false)?,
        ],
        &[],
    );
    Ok(format!("ninja_dyndep_version = 1\n{statement}"))
}
