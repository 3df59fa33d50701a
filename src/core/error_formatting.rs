//! Error formatting for ginjarator
//!
//! Converts whatever reached the top of a command into an [`ErrorContext`]
//! that tells the project author what went wrong and what to change.

use super::*;
use crate::config::ConfigError;
use crate::core::file_error::FileOperationError;
use crate::filesystem::AccessError;
use crate::ninja::NinjaSyntaxError;
use crate::templating::TemplateError;

/// Convert any error into a user-friendly format with contextual suggestions
///
/// The error chain is searched for the most specific known error. If a
/// template was being rendered, its location and Tera's message become the
/// details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let template_details = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<TemplateError>())
        .map(TemplateError::format_with_context);

    for cause in error.chain() {
        if let Some(context) = cause.downcast_ref::<ErrorContext>() {
            return ErrorContext {
                error: GinjaratorError::Other {
                    message: context.error.to_string(),
                },
                suggestion: context.suggestion.clone(),
                details: context.details.clone(),
            };
        }

        if let Some(access_error) = cause.downcast_ref::<AccessError>() {
            let suggestion = match access_error {
                AccessError::NotAllowed {
                    ..
                } => {
                    "Templates may only read source_paths and write build_paths; \
                     check the path or update ginjarator.toml"
                }
                AccessError::DeferralDisabled {
                    ..
                } => {
                    "The file is built by another template; pass defer_ok=true \
                     and handle the value not being available during scan"
                }
            };
            return with_optional_details(
                ErrorContext::new(other(access_error)).with_suggestion(suggestion),
                template_details,
            );
        }

        if let Some(config_error) = cause.downcast_ref::<ConfigError>() {
            let suggestion = match config_error {
                ConfigError::Overlap {
                    ..
                } => "Make sure no source path contains, or is contained in, a build path",
                ConfigError::PythonPathOutsideSources {
                    ..
                } => "Move python_paths inside one of the source_paths",
                ConfigError::Toml(_) => "Check ginjarator.toml for syntax errors and unknown keys",
                ConfigError::Json(_) => {
                    "The cached minimal config is corrupt; run 'ginjarator minimal-config'"
                }
            };
            return ErrorContext::new(other(config_error)).with_suggestion(suggestion);
        }

        if let Some(ninja_error) = cause.downcast_ref::<NinjaSyntaxError>() {
            return with_optional_details(
                ErrorContext::new(other(ninja_error)).with_suggestion(
                    "Ninja files can't contain '#' or newlines in values, \
                     and depfiles can't contain spaces, ':' or quotes in paths",
                ),
                template_details,
            );
        }

        if let Some(ginjarator_error) = cause.downcast_ref::<GinjaratorError>() {
            return create_error_context(ginjarator_error);
        }

        if let Some(file_error) = cause.downcast_ref::<FileOperationError>() {
            let suggestion = match file_error.source.kind() {
                std::io::ErrorKind::NotFound => {
                    "Check that the file exists, or that the template creating it ran first"
                }
                std::io::ErrorKind::PermissionDenied => {
                    "Check file permissions and try running with appropriate privileges"
                }
                _ => "Check that the path exists and you have the necessary permissions",
            };
            return with_optional_details(
                ErrorContext::new(other(file_error))
                    .with_suggestion(suggestion)
                    .with_details(file_error.user_message()),
                template_details,
            );
        }
    }

    if let Some(details) = template_details {
        return ErrorContext::new(GinjaratorError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check your template syntax and variable declarations")
        .with_details(details);
    }

    if let Some(io_error) = error.chain().find_map(|cause| cause.downcast_ref::<std::io::Error>())
    {
        return ErrorContext::new(GinjaratorError::Other {
            message: format!("{error:#}"),
        })
        .with_suggestion("Check file permissions and disk space")
        .with_details(format!("IO error: {io_error}"));
    }

    ErrorContext::new(GinjaratorError::Other {
        message: format!("{error:#}"),
    })
}

/// Create a user-friendly error context from a [`GinjaratorError`]
pub fn create_error_context(error: &GinjaratorError) -> ErrorContext {
    let context = ErrorContext::new(other(error));
    match error {
        GinjaratorError::ConfigNotFound {
            ..
        } => context
            .with_suggestion("Create ginjarator.toml, or run from the project root (see -C)"),
        GinjaratorError::MinimalConfigNotFound {
            ..
        } => context.with_suggestion("Run 'ginjarator init' to set up the build"),
        GinjaratorError::TemplateStateMissing {
            template,
        } => context
            .with_suggestion(format!("Run 'ginjarator scan {template}' first, or build with ninja"))
            .with_details("Rendering uses the dependencies and outputs found while scanning"),
        GinjaratorError::TemplateNotBuilt {
            ..
        } => context.with_suggestion(
            "The template is generated by another template; let ninja build it first",
        ),
        GinjaratorError::TestOutputsInProjectRoot {
            ..
        } => context.with_suggestion("Pass a temporary directory as the root"),
        GinjaratorError::Other {
            ..
        } => context,
    }
}

fn other(error: &impl std::fmt::Display) -> GinjaratorError {
    GinjaratorError::Other {
        message: error.to_string(),
    }
}

fn with_optional_details(context: ErrorContext, details: Option<String>) -> ErrorContext {
    match details {
        Some(details) => match context.details {
            Some(ref existing) => {
                let combined = format!("{existing}\n\n{details}");
                context.with_details(combined)
            }
            None => context.with_details(details),
        },
        None => context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::FsPath;
    use anyhow::Context;
    use std::io;

    #[test]
    fn test_access_error_in_chain() {
        let error = anyhow::Error::new(AccessError::DeferralDisabled {
            path: FsPath::new("build/x"),
        })
        .context("while rendering");
        let ctx = user_friendly_error(error);
        assert!(ctx.error.to_string().contains("build/x"));
        assert!(ctx.suggestion.unwrap().contains("defer_ok=true"));
    }

    #[test]
    fn test_config_error() {
        let error = anyhow::Error::new(ConfigError::PythonPathOutsideSources {
            path: FsPath::new("py"),
        });
        let ctx = user_friendly_error(error);
        assert!(ctx.suggestion.unwrap().contains("python_paths"));
    }

    #[test]
    fn test_ginjarator_error() {
        let error: anyhow::Error = GinjaratorError::MinimalConfigNotFound {
            path: ".ginjarator/config/minimal.json".to_string(),
        }
        .into();
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, GinjaratorError::Other { .. }));
        assert!(ctx.error.to_string().contains("Minimal config cache not found"));
        assert!(ctx.suggestion.unwrap().contains("ginjarator init"));
    }

    #[test]
    fn test_template_state_missing_suggests_scan() {
        let ctx = create_error_context(&GinjaratorError::TemplateStateMissing {
            template: "src/t.jinja".to_string(),
        });
        assert!(ctx.suggestion.unwrap().contains("ginjarator scan src/t.jinja"));
        assert!(ctx.details.is_some());
    }

    #[test]
    fn test_template_error_details() {
        let template = FsPath::new("src/t.jinja");
        let error = TemplateError::from_tera(
            tera::Error::msg("unexpected token"),
            &template,
            crate::templating::TemplateStage::Parse,
        );
        let ctx = user_friendly_error(error.into());
        let details = ctx.details.unwrap();
        assert!(details.contains("Template Syntax Error"));
        assert!(details.contains("src/t.jinja"));
    }

    #[test]
    fn test_file_error() {
        let error = FileOperationError {
            operation: crate::core::FileOperation::Read,
            file_path: "src/missing".into(),
            purpose: "dependency 'src/missing'".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let ctx = user_friendly_error(error.into());
        assert!(ctx.details.unwrap().contains("does not exist"));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_error_context_passthrough() {
        let error = GinjaratorError::Other {
            message: "boom".to_string(),
        }
        .into_anyhow_with_context(ErrorContext::suggestion("try again"));
        let ctx = user_friendly_error(error);
        assert_eq!(ctx.error.to_string(), "boom");
        assert_eq!(ctx.suggestion.as_deref(), Some("try again"));
    }

    #[test]
    fn test_io_error() {
        let error = anyhow::Error::from(io::Error::other("disk on fire"))
            .context("writing state");
        let ctx = user_friendly_error(error);
        assert!(ctx.error.to_string().contains("writing state: disk on fire"));
        assert!(ctx.details.unwrap().contains("disk on fire"));
    }

    #[test]
    fn test_fallback() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("inner")).context("outer");
        let ctx = user_friendly_error(result.unwrap_err());
        assert_eq!(ctx.error.to_string(), "outer: inner");
        assert!(ctx.suggestion.is_none());
    }
}
