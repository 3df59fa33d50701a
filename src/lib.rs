//! ginjarator - meta-build-file generator
//!
//! ginjarator renders templates into build outputs and ninja files, while
//! tracking exactly which files every template reads and writes. Ninja then
//! rebuilds only what changed, including outputs of templates that read
//! outputs of other templates.
//!
//! # Architecture Overview
//!
//! Every template runs twice, in separate processes started by ninja:
//!
//! 1. **Scan**: reads that may depend on other templates' outputs are
//!    deferred instead of performed, and writes are only recorded. The
//!    result is the template's state: everything it will read and write.
//! 2. **Render**: the same template runs again, allowed to read and write
//!    exactly what the scan recorded. By now ninja has built every
//!    dependency, so deferred reads return real contents.
//!
//! All file access goes through [`filesystem::Filesystem`], whose
//! [`Mode`](filesystem::Mode) decides what is allowed in each pass.
//!
//! # Core Modules
//!
//! - [`paths`] - Project paths and the layout of `.ginjarator/`
//! - [`config`] - `ginjarator.toml` and the minimal config cache
//! - [`filesystem`] - Access modes and the dependency-tracking façade
//! - [`ninja`] - Encoding values for ninja files and depfiles
//! - [`templating`] - Tera rendering with the façade as template functions
//! - [`driver`] - The `init`, `minimal-config`, `scan` and `render` passes
//! - [`testing`] - Helpers for testing a project's templates
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and user-facing error reports
//! - [`utils`] - Atomic writes and directory helpers
//! - [`constants`] - Values baked into generated files
//!
//! # Project Layout
//!
//! ```toml
//! # ginjarator.toml
//! source_paths = ["src"]
//! build_paths = ["build"]
//! ninja_templates = ["src/rules.ninja.jinja"]
//! templates = ["src/index.html.jinja"]
//! ```
//!
//! ```bash
//! ginjarator init   # once, writes build.ninja
//! ninja             # every build afterwards
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod driver;
pub mod filesystem;
pub mod ninja;
pub mod paths;
pub mod templating;
pub mod testing;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
