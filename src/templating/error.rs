//! Template error handling
//!
//! Tera reports every failure as a chain of [`tera::Error`]s. [`TemplateError`]
//! classifies the failure, remembers which template it came from and keeps
//! the original chain as its source, so typed errors raised by template
//! functions (access violations, encoder errors) stay reachable through
//! [`std::error::Error::source`].

use regex::Regex;
use strsim::levenshtein;

use crate::paths::FsPath;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Names a template can refer to without defining them.
pub(crate) const KNOWN_NAMES: &[&str] = &[
    "ginjarator",
    "ginjarator.current_template",
    "read_text",
    "add_dependency",
    "write_text",
    "add_output",
    "read_config",
    "read_minimal_config",
    "to_ninja",
    "write_to",
    "available",
];

/// Which stage of template processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStage {
    /// Parsing the template text.
    Parse,
    /// Rendering the parsed template.
    Render,
}

/// Location information for template errors
#[derive(Debug, Clone)]
pub struct ErrorLocation {
    /// The template being processed.
    pub template: FsPath,
    /// Line number, if Tera reported one.
    pub line_number: Option<usize>,
}

/// Template errors with context
#[derive(Debug)]
pub enum TemplateError {
    /// The template referenced an undefined variable.
    VariableNotFound {
        /// The variable name.
        variable: String,
        /// Similar names the author may have meant.
        suggestions: Vec<String>,
        /// Where it happened.
        location: Box<ErrorLocation>,
        /// Tera's error chain.
        source: tera::Error,
    },

    /// The template text could not be parsed.
    SyntaxError {
        /// Cleaned-up error message.
        message: String,
        /// Where it happened.
        location: Box<ErrorLocation>,
        /// Tera's error chain.
        source: tera::Error,
    },

    /// Rendering failed, usually inside a ginjarator function or `throw`.
    RenderFailed {
        /// Cleaned-up error message.
        message: String,
        /// Where it happened.
        location: Box<ErrorLocation>,
        /// Tera's error chain.
        source: tera::Error,
    },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::VariableNotFound {
                variable,
                location,
                ..
            } => {
                write!(f, "Template variable not found in '{}': '{}'", location.template, variable)
            }
            TemplateError::SyntaxError {
                location,
                ..
            } => {
                write!(f, "Template syntax error in '{}'", location.template)
            }
            TemplateError::RenderFailed {
                location,
                ..
            } => {
                write!(f, "Failed to render template '{}'", location.template)
            }
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::VariableNotFound {
                source,
                ..
            }
            | TemplateError::SyntaxError {
                source,
                ..
            }
            | TemplateError::RenderFailed {
                source,
                ..
            } => Some(source),
        }
    }
}

impl TemplateError {
    /// Classifies a Tera error.
    pub fn from_tera(error: tera::Error, template: &FsPath, stage: TemplateStage) -> Self {
        let message = format_tera_error(&error, template);
        let location = Box::new(ErrorLocation {
            template: template.clone(),
            line_number: extract_line_number(&error),
        });

        if let Some(variable) = extract_variable_name(&message) {
            let suggestions = find_similar_names(&variable, KNOWN_NAMES);
            return TemplateError::VariableNotFound {
                variable,
                suggestions,
                location,
                source: error,
            };
        }

        match stage {
            TemplateStage::Parse => TemplateError::SyntaxError {
                message,
                location,
                source: error,
            },
            TemplateStage::Render => TemplateError::RenderFailed {
                message,
                location,
                source: error,
            },
        }
    }

    /// The template the error came from.
    pub fn location(&self) -> &ErrorLocation {
        match self {
            TemplateError::VariableNotFound {
                location,
                ..
            }
            | TemplateError::SyntaxError {
                location,
                ..
            }
            | TemplateError::RenderFailed {
                location,
                ..
            } => location,
        }
    }

    /// Generate user-friendly error message with context and suggestions
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();
        let location = self.location();

        match self {
            TemplateError::VariableNotFound {
                variable,
                suggestions,
                ..
            } => {
                msg.push_str("ERROR: Template Variable Not Found\n\n");
                msg.push_str(&format!("Variable: {variable}\n"));
                push_location(&mut msg, location);
                if !suggestions.is_empty() {
                    msg.push_str("\nDid you mean one of these?\n");
                    for suggestion in suggestions {
                        msg.push_str(&format!("  - {suggestion}\n"));
                    }
                }
                msg.push_str("\nVariables set with {% set %} are only visible after the set.\n");
            }
            TemplateError::SyntaxError {
                message,
                ..
            } => {
                msg.push_str("ERROR: Template Syntax Error\n\n");
                msg.push_str(&format!("Error: {message}\n"));
                push_location(&mut msg, location);
                msg.push_str("\nCommon issues:\n");
                msg.push_str("  - Unclosed {{ }} or {% %} delimiters\n");
                msg.push_str("  - Invalid filter names\n");
                msg.push_str("  - Missing quotes around string values\n");
            }
            TemplateError::RenderFailed {
                message,
                ..
            } => {
                msg.push_str("ERROR: Template Rendering Failed\n\n");
                msg.push_str(&format!("Error: {message}\n"));
                push_location(&mut msg, location);
            }
        }

        msg
    }
}

fn push_location(msg: &mut String, location: &ErrorLocation) {
    msg.push_str(&format!("Template: {}\n", location.template));
    if let Some(line) = location.line_number {
        msg.push_str(&format!("Line: {line}\n"));
    }
}

/// Walks a Tera error chain into one readable message.
///
/// Tera's own wrappers ("Failed to render 'x'") add nothing once the template
/// name is known, so they are dropped.
pub fn format_tera_error(error: &tera::Error, template: &FsPath) -> String {
    use std::error::Error;

    let noise = [
        format!("Failed to render '{template}'"),
        format!("Failed to parse '{template}'"),
    ];

    let mut messages = Vec::new();
    let mut current: Option<&dyn Error> = Some(error);
    while let Some(err) = current {
        let message = err.to_string().trim().to_string();
        if !message.is_empty() && !noise.contains(&message) && !messages.contains(&message) {
            messages.push(message);
        }
        current = err.source();
    }

    if messages.is_empty() {
        "Template error (no details from Tera)".to_string()
    } else {
        messages.join("\n  -> ")
    }
}

/// Extracts a variable name from "Variable `foo` not found" messages.
fn extract_variable_name(message: &str) -> Option<String> {
    let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
    re.captures(message).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Extracts a line number from Tera's `line:column` parse positions.
fn extract_line_number(error: &tera::Error) -> Option<usize> {
    let error_msg = format!("{error:?}");
    let re = Regex::new(r"--> (\d+):(\d+)").ok()?;
    re.captures(&error_msg)
        .and_then(|caps| caps.get(1))
        .and_then(|line| line.as_str().parse::<usize>().ok())
}

/// Find similar names using Levenshtein distance
fn find_similar_names(target: &str, available: &[&str]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|name| (name.to_string(), levenshtein(target, name))).collect();
    scored.sort_by_key(|(_, distance)| *distance);
    scored
        .into_iter()
        .filter(|(_, distance)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(name, _)| name)
        .collect()
}
