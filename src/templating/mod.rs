//! Tera templating backed by the dependency-tracking filesystem.
//!
//! Every template is rendered by a [`TemplateRenderer`] that owns exactly one
//! [`Filesystem`]. The template's own source is read through the façade, so
//! it becomes a dependency like any other file, and the functions registered
//! in [`functions`] give the template controlled access to everything else.
//!
//! # Template Context
//!
//! - `ginjarator.current_template`: path of the template being rendered,
//!   relative to the project root.
//!
//! # Functions, Filters and Testers
//!
//! | Name | Kind | Purpose |
//! |---|---|---|
//! | `read_text(path, defer_ok=true)` | function | Read a file, or `null` if deferred |
//! | `add_dependency(path, defer_ok=true)` | function | Record a dependency |
//! | `write_text(path, contents, defer_ok=true)` | function | Write a file |
//! | `add_output(path, defer_ok=true)` | function | Record an output |
//! | `read_config()` | function | The full `ginjarator.toml` |
//! | `read_minimal_config()` | function | Source, build and python paths |
//! | `to_ninja(value, escape_shell=false)` | function | Encode for ninja |
//! | `write_to(path, defer_ok=true)` | filter | Write the filtered block |
//! | `available` | tester | Whether a read produced contents |
//!
//! # Loading Other Templates
//!
//! `{% extends %}`, `{% import %}` and `{% include %}` name templates by
//! their path from the project root, e.g. `{% import "src/macros.jinja" as
//! m %}`. Referenced templates are read through the façade before rendering
//! (see [`references`]), so they are dependencies too. A referenced template
//! that is a build output not built yet fails with
//! [`GinjaratorError::TemplateNotBuilt`]. Names must be string literals.
//!
//! Autoescaping is off: outputs are build files and source text, not HTML.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ginjarator::filesystem::{Filesystem, Mode};
//! use ginjarator::paths::FsPath;
//! use ginjarator::templating::TemplateRenderer;
//!
//! # fn example() -> anyhow::Result<()> {
//! let fs = Filesystem::new(".", Mode::Scan)?;
//! let mut renderer = TemplateRenderer::new(fs);
//! renderer.render(&FsPath::new("src/index.html.jinja"))?;
//! let fs = renderer.into_filesystem()?;
//! println!("deferred outputs: {:?}", fs.deferred_outputs());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod functions;
pub mod references;

pub use error::{ErrorLocation, TemplateError, TemplateStage};
pub use functions::SharedFilesystem;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use serde_json::json;
use tera::{Context as TeraContext, Tera};
use tracing::debug;

use crate::core::GinjaratorError;
use crate::core::file_error::FileOperationError;
use crate::filesystem::{Filesystem, ReadOutcome};
use crate::paths::FsPath;

/// Renders templates through a [`Filesystem`].
pub struct TemplateRenderer {
    tera: Tera,
    fs: SharedFilesystem,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").field("fs", &self.fs).finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    /// Creates a renderer whose template functions use `fs`.
    pub fn new(fs: Filesystem) -> Self {
        let fs = Arc::new(Mutex::new(fs));
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        functions::register(&mut tera, &fs);
        Self {
            tera,
            fs,
        }
    }

    /// Locks the façade, e.g. to inspect what a render recorded.
    pub fn filesystem(&self) -> Result<MutexGuard<'_, Filesystem>> {
        self.fs.lock().map_err(|_| anyhow!("filesystem lock poisoned by an earlier failure"))
    }

    /// Renders `template` and returns its text.
    ///
    /// The rendered text itself is not written anywhere; templates produce
    /// files through `write_text` and `write_to`.
    ///
    /// # Errors
    ///
    /// - [`GinjaratorError::TemplateNotBuilt`] if the template is a build
    ///   output that does not exist yet.
    /// - [`TemplateError`] for parse and render failures. Errors raised by
    ///   template functions remain in its source chain.
    pub fn render(&mut self, template: &FsPath) -> Result<String> {
        let name = template.as_str();
        let source = self.load_source(template)?;
        let sources = self.load_references(name, source)?;

        debug!(%template, templates = sources.len(), "Rendering template");
        self.tera
            .add_raw_templates(sources)
            .map_err(|e| TemplateError::from_tera(e, template, TemplateStage::Parse))?;

        let mut context = TeraContext::new();
        context.insert("ginjarator", &json!({ "current_template": name }));

        let rendered = self
            .tera
            .render(name, &context)
            .map_err(|e| TemplateError::from_tera(e, template, TemplateStage::Render))?;
        debug!(%template, "Rendered template");
        Ok(rendered)
    }

    /// Reads a template's source through the façade.
    fn load_source(&self, template: &FsPath) -> Result<String> {
        match self.filesystem()?.read_text(template, true)? {
            ReadOutcome::Available(source) => Ok(source),
            ReadOutcome::NotYetAvailable => Err(GinjaratorError::TemplateNotBuilt {
                template: template.to_string(),
            }
            .into()),
        }
    }

    /// Loads `name` and every template it references, transitively.
    ///
    /// A referenced file that doesn't exist is left out, so Tera reports it
    /// (or skips it for `ignore missing`); its dependency is still recorded,
    /// so creating it triggers a rebuild.
    fn load_references(&self, name: &str, source: String) -> Result<Vec<(String, String)>> {
        let mut seen = HashSet::from([name.to_string()]);
        let mut pending = references::extract_template_references(&source);
        let mut sources = vec![(name.to_string(), source)];

        while let Some(reference) = pending.pop() {
            if !seen.insert(reference.clone()) {
                continue;
            }
            match self.load_source(&FsPath::new(&reference)) {
                Ok(source) => {
                    debug!(%reference, "Loaded referenced template");
                    pending.extend(references::extract_template_references(&source));
                    sources.push((reference, source));
                }
                Err(e) if is_not_found(&e) => {
                    debug!(%reference, "Referenced template does not exist");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(sources)
    }

    /// Consumes the renderer and returns its façade.
    pub fn into_filesystem(self) -> Result<Filesystem> {
        let Self {
            tera,
            fs,
        } = self;
        // The registered functions hold the other references.
        drop(tera);
        let fs = Arc::try_unwrap(fs)
            .map_err(|_| anyhow!("filesystem is still shared with template functions"))?;
        fs.into_inner().map_err(|_| anyhow!("filesystem lock poisoned by an earlier failure"))
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<FileOperationError>()
        .is_some_and(|file_error| file_error.source.kind() == ErrorKind::NotFound)
}
