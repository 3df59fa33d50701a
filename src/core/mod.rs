//! Core error types for ginjarator
//!
//! Every fallible operation returns [`anyhow::Result`]. Subsystems raise their
//! own typed errors, which stay downcastable through the anyhow chain. At
//! the process boundary [`user_friendly_error`] picks the most specific one
//! and turns it into an [`ErrorContext`] for display:
//!
//! ```rust,no_run
//! use ginjarator::core::{GinjaratorError, user_friendly_error};
//!
//! let error: anyhow::Error = GinjaratorError::MinimalConfigNotFound {
//!     path: ".ginjarator/config/minimal.json".to_string(),
//! }
//! .into();
//! user_friendly_error(error).display();
//! ```
//!
//! File I/O failures carry a [`FileOperationError`] with the path and the
//! reason the file was touched; see [`FileResultExt::with_file_context`].

pub mod error;
mod error_formatting;
pub mod file_error;

pub use error::{ErrorContext, GinjaratorError, IntoAnyhowWithContext};
pub use error_formatting::{create_error_context, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
