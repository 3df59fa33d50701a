//! Finding the other templates a template loads.
//!
//! Tera resolves `{% extends %}`, `{% import %}` and `{% include %}` against
//! templates already registered on the instance, so every one of them has
//! to be read through the façade before rendering. That keeps shared macro
//! files and layouts in the dependency sets.

use regex::Regex;

/// Returns the template names referenced by `source`, in order of first
/// appearance.
///
/// Names are returned exactly as written, since that is the name Tera looks
/// up. Tags inside comments and `{% raw %}` blocks are ignored. Only string
/// literals are found; a name computed at render time can't be loaded ahead
/// of time and fails as an unknown template.
///
/// ```rust
/// use ginjarator::templating::references::extract_template_references;
///
/// let source = r#"{% extends "src/base.jinja" %}
/// {% import "src/macros.jinja" as macros %}
/// {% include ["src/a.jinja", "src/b.jinja"] ignore missing %}"#;
/// assert_eq!(
///     extract_template_references(source),
///     ["src/base.jinja", "src/macros.jinja", "src/a.jinja", "src/b.jinja"]
/// );
/// ```
#[must_use]
pub fn extract_template_references(source: &str) -> Vec<String> {
    let mut references = Vec::new();
    let source = remove_inert_blocks(source);

    if let (Ok(tag_regex), Ok(string_regex)) = (
        Regex::new(
            r#"\{%-?\s*(?:extends|import|include)\s+(\[[^\]]*\]|"[^"]*"|'[^']*')"#,
        ),
        Regex::new(r#""([^"]*)"|'([^']*)'"#),
    ) {
        for cap in tag_regex.captures_iter(&source) {
            let Some(argument) = cap.get(1) else {
                continue;
            };
            for name in string_regex.captures_iter(argument.as_str()) {
                if let Some(name) = name.get(1).or_else(|| name.get(2)) {
                    references.push(name.as_str().to_string());
                }
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    references.retain(|r| seen.insert(r.clone()));

    references
}

/// Drops comments and `{% raw %}` blocks, whose tags Tera never executes.
fn remove_inert_blocks(source: &str) -> String {
    let mut result = source.to_string();
    for pattern in [r"(?s)\{#.*?#\}", r"(?s)\{%-?\s*raw\s*-?%\}.*?\{%-?\s*endraw\s*-?%\}"] {
        if let Ok(regex) = Regex::new(pattern) {
            result = regex.replace_all(&result, "").into_owned();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_and_double_quotes() {
        let source = "{% import 'src/m.jinja' as m %}{%- include \"src/i.jinja\" -%}";
        assert_eq!(extract_template_references(source), ["src/m.jinja", "src/i.jinja"]);
    }

    #[test]
    fn test_extract_deduplicates() {
        let source = r#"{% include "src/i.jinja" %}{% include "src/i.jinja" %}"#;
        assert_eq!(extract_template_references(source), ["src/i.jinja"]);
    }

    #[test]
    fn test_ignores_comments_and_raw_blocks() {
        let source = r#"{# {% include "src/commented.jinja" %} #}
{% raw %}{% include "src/raw.jinja" %}{% endraw %}
{{ read_text(path="src/include.txt") }}"#;
        assert!(extract_template_references(source).is_empty());
    }

    #[test]
    fn test_ignores_computed_names() {
        assert!(extract_template_references("{% include name %}").is_empty());
    }
}
