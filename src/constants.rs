//! Global constants used throughout ginjarator.
//!
//! These end up in generated files, so changing one changes what ninja
//! sees on the next `init`.

/// Name of the executable, as invoked by the generated ninja rules.
pub const PROGRAM_NAME: &str = "ginjarator";

/// Oldest ninja that understands the generated files.
///
/// 1.10 is the first release with dyndep support.
pub const NINJA_REQUIRED_VERSION: &str = "1.10";

/// Contents of `.ginjarator/.gitignore`.
pub const GITIGNORE_CONTENTS: &str = "# Automatically generated by ginjarator.\n*\n";

/// Indentation of continuation lines in generated ninja statements.
pub(crate) const NINJA_CONTINUATION_INDENT: &str = "        ";
