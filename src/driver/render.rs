//! The render pass.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::state::TemplateState;
use crate::core::GinjaratorError;
use crate::filesystem::{Filesystem, Mode};
use crate::paths::{self, FsPath};
use crate::templating::TemplateRenderer;

/// What to do with files a failed render already created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnRenderError {
    /// Leave them for inspection.
    #[default]
    KeepOutputs,
    /// Delete files that did not exist before the render started.
    DeleteCreatedFiles,
}

/// Renders `template` using the state recorded by its scan.
///
/// The render may read exactly the scanned dependencies and write exactly
/// the scanned outputs. On success the template's render stamp is written.
///
/// # Errors
///
/// [`GinjaratorError::TemplateStateMissing`] if the template was never
/// scanned, plus any error from the template itself.
pub fn render(root: &Path, template: &FsPath, on_error: OnRenderError) -> Result<()> {
    let mut internal = Filesystem::internal(root)?;

    let state_path = paths::template_state(template);
    if !internal.resolve(&state_path).is_file() {
        return Err(GinjaratorError::TemplateStateMissing {
            template: template.to_string(),
        }
        .into());
    }
    let state = TemplateState::from_json(&internal.read_text_now(&state_path)?)
        .with_context(|| format!("Invalid template state in '{state_path}'"))?;

    let mode = Mode::Render {
        dependencies: state.dependencies,
        outputs: state.outputs,
    };
    let mut renderer = TemplateRenderer::new(Filesystem::new(root, mode)?);
    if let Err(error) = renderer.render(template) {
        if on_error == OnRenderError::DeleteCreatedFiles {
            match renderer.filesystem().and_then(|mut fs| fs.delete_created_files()) {
                Ok(removed) => info!(%template, removed = removed.len(), "Rolled back failed render"),
                Err(cleanup_error) => {
                    warn!(%template, error = %cleanup_error, "Failed to roll back failed render");
                }
            }
        }
        return Err(error);
    }

    internal.write_text(paths::template_render_stamp(template), "", false)?;
    info!(%template, "Rendered template");
    Ok(())
}
