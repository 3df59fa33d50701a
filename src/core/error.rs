//! Error handling for ginjarator
//!
//! Two kinds of error type live in this crate:
//! - Typed errors owned by the subsystem that raises them, such as
//!   [`AccessError`](crate::filesystem::AccessError),
//!   [`ConfigError`](crate::config::ConfigError) and
//!   [`NinjaSyntaxError`](crate::ninja::NinjaSyntaxError).
//! - [`GinjaratorError`] for failures of the driver itself that have no more
//!   specific home.
//!
//! Everything propagates as [`anyhow::Error`] with `.with_context()` naming the
//! file involved. At the process boundary,
//! [`user_friendly_error`](crate::core::user_friendly_error) turns the chain
//! into an [`ErrorContext`] with a suggestion for the project author.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ginjarator::core::{ErrorContext, GinjaratorError};
//!
//! let context = ErrorContext::new(GinjaratorError::TemplateStateMissing {
//!     template: "src/index.html.jinja".to_string(),
//! })
//! .with_suggestion("Run the scan pass first");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Driver-level failures.
///
/// Access violations and config errors are *not* represented here; they keep
/// their own types so callers can match on them precisely.
#[derive(Error, Debug)]
pub enum GinjaratorError {
    /// `ginjarator.toml` is missing from the project root.
    #[error("Config file not found: {path}")]
    ConfigNotFound {
        /// Where the config was expected.
        path: String,
    },

    /// The minimal config cache is missing, so `init` has not run yet.
    #[error("Minimal config cache not found: {path}")]
    MinimalConfigNotFound {
        /// Where the cache was expected.
        path: String,
    },

    /// `render` ran before `scan` for a template.
    #[error("No scan state for template '{template}'")]
    TemplateStateMissing {
        /// The template whose state was missing.
        template: String,
    },

    /// The template source is itself a build output that does not exist yet.
    #[error("Template '{template}' is not built yet")]
    TemplateNotBuilt {
        /// The template path.
        template: String,
    },

    /// A test helper was asked to write outputs into the real project.
    #[error("Refusing to write outputs relative to the current directory: {outputs}")]
    TestOutputsInProjectRoot {
        /// The requested outputs, space separated.
        outputs: String,
    },

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Description of the error.
        message: String,
    },
}

/// An error plus the extra information shown to the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: GinjaratorError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: GinjaratorError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts a [`GinjaratorError`] into [`anyhow::Error`], keeping a suggestion.
pub trait IntoAnyhowWithContext {
    /// Convert the error to an [`anyhow::Error`] with the provided context
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error;
}

impl IntoAnyhowWithContext for GinjaratorError {
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error {
        anyhow::Error::new(ErrorContext {
            error: self,
            suggestion: context.suggestion,
            details: context.details,
        })
    }
}

impl ErrorContext {
    /// Create an [`ErrorContext`] with only a suggestion.
    pub fn suggestion(suggestion: impl Into<String>) -> Self {
        Self {
            error: GinjaratorError::Other {
                message: String::new(),
            },
            suggestion: Some(suggestion.into()),
            details: None,
        }
    }
}
