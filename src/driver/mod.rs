//! The passes ninja runs: `init`, `minimal-config`, `scan` and `render`.
//!
//! # Build graph
//!
//! `init` writes `build.ninja`, which pulls in `.ginjarator/main.ninja` and
//! the rendered ninja templates. For every template, `main.ninja` has two
//! edges:
//!
//! ```text
//! state.json | depfile.d dyndep.dd : scan template || minimal.json
//! render-stamp : render template | state.json || dyndep.dd scan-done.stamp
//! ```
//!
//! Scanning renders the template in [`Mode::Scan`](crate::filesystem::Mode)
//! and records what it touched in a [`TemplateState`]. The depfile reruns
//! the scan when anything it read immediately changes. The dyndep file tells
//! ninja the render edge's real inputs and outputs, which are only known
//! after the scan. Rendering then runs the template again with exactly those
//! sets allowed.
//!
//! Every pass writes through [`Filesystem::write_text`], which leaves
//! unchanged files untouched. Together with `restat = true` on every rule,
//! a rebuild stops as soon as a pass reproduces its previous outputs.
//!
//! [`Filesystem::write_text`]: crate::filesystem::Filesystem::write_text

mod init;
mod render;
mod scan;
pub mod state;

pub use init::{init, minimal_config};
pub use render::{OnRenderError, render};
pub use scan::scan;
pub use state::TemplateState;

use crate::constants::NINJA_CONTINUATION_INDENT;

/// Formats a ninja `build` statement with one token per line.
///
/// Empty tokens (such as an empty path list) are skipped.
pub(crate) fn build_statement(tokens: &[String], bindings: &[(&str, String)]) -> String {
    let tokens: Vec<&String> = tokens.iter().filter(|token| !token.is_empty()).collect();
    let mut text = String::from("build $\n");
    for (index, token) in tokens.iter().enumerate() {
        text.push_str(NINJA_CONTINUATION_INDENT);
        text.push_str(token);
        text.push_str(if index + 1 == tokens.len() { "\n" } else { " $\n" });
    }
    for (name, value) in bindings {
        text.push_str(&format!("    {name} = {value}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_statement() {
        let tokens = ["out".to_string(), String::new(), ":".to_string(), "rule".to_string()];
        assert_eq!(
            build_statement(&tokens, &[("template", "t".to_string())]),
            "build $\n        out $\n        : $\n        rule\n    template = t\n"
        );
    }
}
