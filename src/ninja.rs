//! Encoding values for ninja's lexer and for depfiles.
//!
//! Two formats are produced:
//!
//! - Ninja syntax ([`to_ninja`], [`ToNinja`]): space, `:` and `$` are escaped
//!   with `$`. Comments and newlines cannot be escaped, so strings
//!   containing `#` or `\n` are rejected rather than silently corrupting the
//!   build file. See <https://ninja-build.org/manual.html#ref_lexer>.
//! - Depfiles ([`to_depfile`]): the make-like format ninja reads for `deps`.
//!   Its escaping rules are poorly specified, so anything that could be
//!   ambiguous is rejected and only `%` is escaped.
//!
//! ```rust
//! use ginjarator::ninja::{to_depfile, to_ninja_str};
//!
//! assert_eq!(to_ninja_str("foo: $bar", false).unwrap(), "foo$:$ $$bar");
//! assert_eq!(
//!     to_depfile("state.json", ["d1", "d2"]).unwrap(),
//!     "state.json: d1\nstate.json: d2\n"
//! );
//! ```

use std::borrow::Cow;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::paths::FsPath;

/// A value that cannot be represented in the target syntax.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NinjaSyntaxError {
    /// The string contains `#` or a newline.
    #[error("Can't convert {value:?} to ninja syntax: comments and newlines can't be escaped")]
    Unescapable {
        /// The offending string.
        value: String,
    },

    /// The value's type has no ninja representation.
    #[error("Can't convert {value} to ninja syntax")]
    UnsupportedValue {
        /// The offending value, rendered as JSON.
        value: String,
    },

    /// A depfile path contains characters the depfile format can't carry.
    #[error("Unsupported characters in path {path:?} for a depfile")]
    UnsupportedDepfilePath {
        /// The offending path.
        path: String,
    },
}

/// Converts a string to ninja syntax.
///
/// With `escape_shell`, the string is first quoted for the shell, so it can
/// be used as a single argument inside a `command`.
pub fn to_ninja_str(value: &str, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
    let value: Cow<'_, str> = if escape_shell {
        shell_escape::unix::escape(Cow::Borrowed(value))
    } else {
        Cow::Borrowed(value)
    };

    if value.contains(['#', '\n']) {
        return Err(NinjaSyntaxError::Unescapable {
            value: value.into_owned(),
        });
    }

    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' => escaped.push_str("$ "),
            ':' => escaped.push_str("$:"),
            '$' => escaped.push_str("$$"),
            c => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Values with a ninja representation.
///
/// Ordered collections are space-separated in order; sets are sorted first
/// so the output is deterministic.
pub trait ToNinja {
    /// Converts to ninja syntax.
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError>;
}

impl ToNinja for str {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        to_ninja_str(self, escape_shell)
    }
}

impl ToNinja for String {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        to_ninja_str(self, escape_shell)
    }
}

impl ToNinja for FsPath {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        to_ninja_str(self.as_str(), escape_shell)
    }
}

impl<T: ToNinja + ?Sized> ToNinja for &T {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        (**self).to_ninja(escape_shell)
    }
}

impl<T: ToNinja> ToNinja for [T] {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        join(self.iter().map(|item| item.to_ninja(escape_shell)))
    }
}

impl<T: ToNinja> ToNinja for Vec<T> {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        self.as_slice().to_ninja(escape_shell)
    }
}

impl<T: ToNinja + Ord> ToNinja for BTreeSet<T> {
    fn to_ninja(&self, escape_shell: bool) -> Result<String, NinjaSyntaxError> {
        // BTreeSet iterates in sorted order already.
        join(self.iter().map(|item| item.to_ninja(escape_shell)))
    }
}

fn join(
    items: impl Iterator<Item = Result<String, NinjaSyntaxError>>,
) -> Result<String, NinjaSyntaxError> {
    Ok(items.collect::<Result<Vec<_>, _>>()?.join(" "))
}

/// Converts any [`ToNinja`] value.
pub fn to_ninja(
    value: &(impl ToNinja + ?Sized),
    escape_shell: bool,
) -> Result<String, NinjaSyntaxError> {
    value.to_ninja(escape_shell)
}

/// Converts a template value to ninja syntax.
///
/// Strings convert directly and arrays are joined in order. Objects are
/// treated as sets of their keys, which are sorted. Anything else (numbers,
/// booleans, null) is rejected, since templates should be explicit about how
/// such values become text.
pub fn value_to_ninja(
    value: &tera::Value,
    escape_shell: bool,
) -> Result<String, NinjaSyntaxError> {
    match value {
        tera::Value::String(value) => to_ninja_str(value, escape_shell),
        tera::Value::Array(items) => {
            join(items.iter().map(|item| value_to_ninja(item, escape_shell)))
        }
        tera::Value::Object(map) => {
            let keys: BTreeSet<&str> = map.keys().map(String::as_str).collect();
            join(keys.into_iter().map(|key| to_ninja_str(key, escape_shell)))
        }
        other => Err(NinjaSyntaxError::UnsupportedValue {
            value: other.to_string(),
        }),
    }
}

/// Whether `c` is invisible or has no glyph: Unicode format (`Cf`) and
/// private-use (`Co`) characters.
///
/// Separators and controls are covered by `char::is_whitespace` and
/// `char::is_control`. Unassigned code points are not detected.
fn is_non_printable(c: char) -> bool {
    matches!(
        c,
        '\u{AD}'
            | '\u{600}'..='\u{605}'
            | '\u{61C}'
            | '\u{6DD}'
            | '\u{70F}'
            | '\u{890}'..='\u{891}'
            | '\u{8E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

fn depfile_escape(path: &str) -> Result<String, NinjaSyntaxError> {
    let unsupported = |c: char| {
        c.is_whitespace()
            || c.is_control()
            || is_non_printable(c)
            || matches!(c, ':' | ';' | '#' | '"' | '\\')
    };
    if path.chars().any(unsupported) {
        return Err(NinjaSyntaxError::UnsupportedDepfilePath {
            path: path.to_string(),
        });
    }
    Ok(path.replace('%', "\\%"))
}

/// Returns depfile contents listing `dependencies` for `first_output`.
///
/// Ninja ignores depfile lines whose target isn't the first output of the
/// build statement, so every line uses the same target.
pub fn to_depfile<T, D>(
    first_output: T,
    dependencies: impl IntoIterator<Item = D>,
) -> Result<String, NinjaSyntaxError>
where
    T: AsRef<str>,
    D: AsRef<str>,
{
    let target = depfile_escape(first_output.as_ref())?;
    let mut contents = String::new();
    for dependency in dependencies {
        contents.push_str(&format!("{target}: {}\n", depfile_escape(dependency.as_ref())?));
    }
    Ok(contents)
}
