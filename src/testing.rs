//! Helpers for testing a ginjarator project's own templates and data.
//!
//! These build façades in the test modes, which read `ginjarator.toml`
//! directly instead of the minimal config cache, so tests work in a checkout
//! where `init` never ran.
//!
//! ```rust,no_run
//! use ginjarator::paths::FsPath;
//! use ginjarator::templating::TemplateRenderer;
//! use ginjarator::testing;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut renderer = TemplateRenderer::new(testing::scan_filesystem(".")?);
//! renderer.render(&FsPath::new("src/index.html.jinja"))?;
//! let fs = renderer.into_filesystem()?;
//! assert!(fs.deferred_outputs().contains(&FsPath::new("build/index.html")));
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{ErrorContext, GinjaratorError, IntoAnyhowWithContext};
use crate::filesystem::{Filesystem, Mode};
use crate::paths::{self, FsPath};

/// A façade that behaves like the scan pass.
pub fn scan_filesystem(root: impl Into<PathBuf>) -> Result<Filesystem> {
    Filesystem::new(root, Mode::TestScan)
}

/// A façade that behaves like the render pass.
///
/// `dependencies` and `outputs` are what a scan would have recorded;
/// `ginjarator.toml` is always added to the dependencies.
///
/// # Errors
///
/// Refuses non-empty `outputs` when `root` is `.`, so a test can't
/// overwrite files in the project it is testing.
pub fn render_filesystem<D, O>(
    root: impl Into<PathBuf>,
    dependencies: impl IntoIterator<Item = D>,
    outputs: impl IntoIterator<Item = O>,
) -> Result<Filesystem>
where
    D: Into<FsPath>,
    O: Into<FsPath>,
{
    let root = root.into();
    let outputs: Vec<FsPath> = outputs.into_iter().map(Into::into).collect();
    if root == Path::new(".") && !outputs.is_empty() {
        let listed = outputs.iter().map(FsPath::as_str).collect::<Vec<_>>().join(" ");
        return Err(GinjaratorError::TestOutputsInProjectRoot {
            outputs: listed,
        }
        .into_anyhow_with_context(ErrorContext::suggestion(
            "Copy the project into a temporary directory and pass that as the root",
        )));
    }

    let mut all_dependencies = vec![paths::CONFIG.clone()];
    all_dependencies.extend(dependencies.into_iter().map(Into::into));
    let mode = Mode::TestRender {
        dependencies: all_dependencies.into_iter().collect(),
        outputs: outputs.into_iter().collect(),
    };
    Filesystem::new(root, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{ReadOutcome, WriteOutcome};
    use crate::test_utils::ProjectFixture;

    #[test]
    fn test_scan_filesystem_without_minimal_cache() {
        let project = ProjectFixture::new("").unwrap();
        project.write("src/in.txt", "in").unwrap();
        let mut fs = scan_filesystem(project.root()).unwrap();
        assert_eq!(fs.read_text("src/in.txt", true).unwrap(), ReadOutcome::Available("in".into()));
        assert_eq!(fs.read_text("build/x", true).unwrap(), ReadOutcome::NotYetAvailable);
        assert_eq!(fs.write_text("build/x", "x", true).unwrap(), WriteOutcome::Deferred);
    }

    #[test]
    fn test_render_filesystem() {
        let project = ProjectFixture::new("").unwrap();
        project.write("src/in.txt", "in").unwrap();
        let mut fs =
            render_filesystem(project.root(), ["src/in.txt"], ["build/out.txt"]).unwrap();
        assert_eq!(fs.read_text("src/in.txt", false).unwrap(), ReadOutcome::Available("in".into()));
        assert_eq!(fs.write_text("build/out.txt", "out", false).unwrap(), WriteOutcome::Written);
        assert_eq!(project.read("build/out.txt").unwrap(), "out");
        assert!(fs.read_text("src/other.txt", true).is_err());
    }

    #[test]
    fn test_render_filesystem_refuses_outputs_in_current_dir() {
        let err = render_filesystem(".", Vec::<FsPath>::new(), ["build/out.txt"]).unwrap_err();
        let context = err.downcast_ref::<ErrorContext>().unwrap();
        assert!(matches!(context.error, GinjaratorError::TestOutputsInProjectRoot { .. }));
        assert!(context.suggestion.is_some());
    }
}
