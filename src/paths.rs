//! Path types, well-known paths, and per-template derived paths.
//!
//! Every path that crosses the [`Filesystem`](crate::filesystem::Filesystem)
//! API is an [`FsPath`]. Relative paths are relative to the project root (the
//! directory holding `build.ninja`), not to the process's current directory.
//! An `FsPath` is never resolved against the OS: two spellings of the same
//! logical path compare equal after normalization, and that is the only
//! identity the access checks rely on.
//!
//! # Internal state layout
//!
//! Bookkeeping files live under [`INTERNAL`]. Paths derived from a template's
//! own path escape the template path into a single component with
//! [`internal`], so `src/a/b.jinja` maps to
//! `.ginjarator/templates/src%2Fa%2Fb.jinja.json`:
//!
//! ```rust
//! use ginjarator::paths::{self, FsPath};
//!
//! let state = paths::template_state(&FsPath::new("src/a/b.jinja"));
//! assert_eq!(state.as_str(), ".ginjarator/templates/src%2Fa%2Fb.jinja.json");
//! ```

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// A project path, compared by its normalized string form.
///
/// Normalization collapses repeated separators, drops `.` components and any
/// trailing separator. `..` components are kept as written; resolving them
/// would require consulting the filesystem, which this type never does.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FsPath(String);

impl FsPath {
    /// Creates a normalized path.
    pub fn new(path: impl AsRef<str>) -> Self {
        let raw = path.as_ref();
        let absolute = raw.starts_with('/');
        let components: Vec<&str> =
            raw.split('/').filter(|component| !component.is_empty() && *component != ".").collect();

        let normalized = match (absolute, components.is_empty()) {
            (true, _) => format!("/{}", components.join("/")),
            (false, true) => ".".to_string(),
            (false, false) => components.join("/"),
        };
        Self(normalized)
    }

    /// Returns the normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this path is absolute.
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    /// Path components, excluding the root of an absolute path.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|component| !component.is_empty() && *component != ".")
    }

    /// Whether `other` is this path or one of its ancestors.
    ///
    /// This is a purely lexical component-prefix test. `.` is an ancestor of
    /// every relative path, and relative and absolute paths are never related.
    pub fn is_relative_to(&self, other: &FsPath) -> bool {
        if self.is_absolute() != other.is_absolute() {
            return false;
        }
        let mut mine = self.components();
        other.components().all(|theirs| mine.next() == Some(theirs))
    }

    /// Joins a relative component onto this path.
    pub fn join(&self, component: impl AsRef<str>) -> Self {
        let component = component.as_ref();
        if component.starts_with('/') {
            return Self::new(component);
        }
        Self::new(format!("{}/{}", self.0, component))
    }

    /// The path as an OS path, still relative to the project root.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FsPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for FsPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&FsPath> for FsPath {
    fn from(value: &FsPath) -> Self {
        value.clone()
    }
}

impl From<FsPath> for String {
    fn from(value: FsPath) -> Self {
        value.0
    }
}

impl AsRef<str> for FsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Project configuration file.
pub static CONFIG: LazyLock<FsPath> = LazyLock::new(|| FsPath::new("ginjarator.toml"));

/// Directory for ginjarator's internal state.
pub static INTERNAL: LazyLock<FsPath> = LazyLock::new(|| FsPath::new(".ginjarator"));

/// Entrypoint that ninja reads.
pub static NINJA_ENTRYPOINT: LazyLock<FsPath> = LazyLock::new(|| FsPath::new("build.ninja"));

/// Depfile for [`NINJA_ENTRYPOINT`].
pub static NINJA_ENTRYPOINT_DEPFILE: LazyLock<FsPath> =
    LazyLock::new(|| internal(&["build.ninja.d"]));

/// Ninja's own `builddir`.
pub static NINJA_BUILDDIR: LazyLock<FsPath> = LazyLock::new(|| internal(&["ninja_builddir"]));

/// Generated ninja file with ginjarator's rules and edges.
pub static NINJA_MAIN: LazyLock<FsPath> = LazyLock::new(|| internal(&["main.ninja"]));

/// Cached minimal config.
pub static MINIMAL_CONFIG: LazyLock<FsPath> =
    LazyLock::new(|| internal(&["config", "minimal.json"]));

/// Stamp touched once every template has been scanned.
pub static SCAN_DONE_STAMP: LazyLock<FsPath> = LazyLock::new(|| internal(&["scan-done.stamp"]));

/// Ignore file that keeps internal state out of version control.
pub static GITIGNORE: LazyLock<FsPath> = LazyLock::new(|| internal(&[".gitignore"]));

/// Percent-escapes a single path component.
///
/// Everything outside `[A-Za-z0-9_.~-]` is escaped byte by byte, so `/`
/// becomes `%2F` and a literal `%` becomes `%25`.
pub fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for byte in component.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'~' | b'-') {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

/// Returns a path for internal state.
///
/// Each component is escaped with [`escape_component`] so other paths can be
/// used as single components. `.` and `..` pass through unescaped.
pub fn internal(components: &[&str]) -> FsPath {
    components
        .iter()
        .fold(INTERNAL.clone(), |path, component| path.join(escape_component(component)))
}

/// Output path for a rendered ninja template.
pub fn ninja_template_output(template: &FsPath) -> FsPath {
    internal(&["ninja_templates", &format!("{template}.ninja")])
}

/// Path of a template's persisted scan state.
pub fn template_state(template: &FsPath) -> FsPath {
    internal(&["templates", &format!("{template}.json")])
}

/// Path of a template's depfile.
pub fn template_depfile(template: &FsPath) -> FsPath {
    internal(&["templates", &format!("{template}.d")])
}

/// Path of a template's dyndep file.
pub fn template_dyndep(template: &FsPath) -> FsPath {
    internal(&["templates", &format!("{template}.dd")])
}

/// Path of a template's render stamp.
pub fn template_render_stamp(template: &FsPath) -> FsPath {
    internal(&["templates", &format!("{template}.render-stamp")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(FsPath::new("a//b/./c/").as_str(), "a/b/c");
        assert_eq!(FsPath::new("./a").as_str(), "a");
        assert_eq!(FsPath::new("").as_str(), ".");
        assert_eq!(FsPath::new("./").as_str(), ".");
        assert_eq!(FsPath::new("/").as_str(), "/");
        assert_eq!(FsPath::new("//x/../y").as_str(), "/x/../y");
        assert_eq!(FsPath::new("a/b"), FsPath::new("a/./b/"));
    }

    #[test]
    fn test_is_relative_to() {
        let path = FsPath::new("src/foo/bar");
        assert!(path.is_relative_to(&FsPath::new("src")));
        assert!(path.is_relative_to(&FsPath::new("src/foo/bar")));
        assert!(path.is_relative_to(&FsPath::new(".")));
        assert!(!path.is_relative_to(&FsPath::new("sr")));
        assert!(!path.is_relative_to(&FsPath::new("src/foo/bar/baz")));
        assert!(!path.is_relative_to(&FsPath::new("/src")));
        assert!(!FsPath::new("/src").is_relative_to(&FsPath::new(".")));
        assert!(FsPath::new("/src/x").is_relative_to(&FsPath::new("/")));
    }

    #[test]
    fn test_serde_normalizes() {
        let path: FsPath = serde_json::from_str(r#""./a//b/""#).unwrap();
        assert_eq!(path, FsPath::new("a/b"));
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""a/b""#);
    }

    #[test]
    fn test_escape_component() {
        assert_eq!(escape_component("src/foo.jinja"), "src%2Ffoo.jinja");
        assert_eq!(escape_component("a%2Fb"), "a%252Fb");
        assert_eq!(escape_component("a b~c"), "a%20b~c");
    }

    #[test]
    fn test_internal() {
        assert_eq!(internal(&["foo/bar", "baz"]).as_str(), ".ginjarator/foo%2Fbar/baz");
        assert_eq!(internal(&[]).as_str(), ".ginjarator");
    }

    #[test]
    fn test_escaped_names_do_not_collide() {
        let nested = template_state(&FsPath::new("a/b.tmpl"));
        let literal = template_state(&FsPath::new("a%2Fb.tmpl"));
        assert_ne!(nested, literal);
    }

    #[test]
    fn test_template_paths() {
        let template = FsPath::new("src/foo.jinja");
        assert_eq!(
            ninja_template_output(&template).as_str(),
            ".ginjarator/ninja_templates/src%2Ffoo.jinja.ninja"
        );
        assert_eq!(template_state(&template).as_str(), ".ginjarator/templates/src%2Ffoo.jinja.json");
        assert_eq!(template_depfile(&template).as_str(), ".ginjarator/templates/src%2Ffoo.jinja.d");
        assert_eq!(template_dyndep(&template).as_str(), ".ginjarator/templates/src%2Ffoo.jinja.dd");
        assert_eq!(
            template_render_stamp(&template).as_str(),
            ".ginjarator/templates/src%2Ffoo.jinja.render-stamp"
        );
        assert_eq!(MINIMAL_CONFIG.as_str(), ".ginjarator/config/minimal.json");
    }
}
