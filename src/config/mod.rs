//! Project configuration.
//!
//! A project is configured by `ginjarator.toml` at its root:
//!
//! ```toml
//! source_paths = ["src"]          # readable by templates
//! build_paths = ["build"]         # written by templates, read in later passes
//! python_paths = ["src/python"]   # optional, must lie within source_paths
//! ninja_templates = ["src/rules.ninja.jinja"]
//! templates = ["src/index.html.jinja"]
//! ```
//!
//! # Minimal vs full config
//!
//! Nearly every template depends on the source and build roots, because the
//! access checks are built from them. Those fields form [`MinimalConfig`],
//! which is cached as JSON under the internal-state directory. Templates
//! depend on the cache rather than on `ginjarator.toml`, so adding a template
//! to the config does not force every existing template to rebuild.
//!
//! Minimal values are normalized on construction (deduplicated and sorted),
//! so configs that differ only in ordering or repetition serialize to
//! identical cache contents and do not trigger a rebuild.

mod parser;

pub use parser::{parse_config_toml, parse_minimal_json};

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::paths::FsPath;
use parser::RawMinimalConfig;

/// Errors from parsing or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source path and a build path are the same or nested.
    #[error("source_paths and build_paths must not overlap: '{source_path}' and '{build_path}'")]
    Overlap {
        /// The overlapping source path.
        source_path: FsPath,
        /// The overlapping build path.
        build_path: FsPath,
    },

    /// A python path is outside every source path.
    #[error("python_paths must all be within source_paths: '{path}' is not")]
    PythonPathOutsideSources {
        /// The offending python path.
        path: FsPath,
    },

    /// The TOML config is malformed or has unknown keys.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON minimal-config cache is malformed or has unknown keys.
    #[error("invalid minimal config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Subset of the config needed by (almost) everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinimalConfig {
    source_paths: BTreeSet<FsPath>,
    build_paths: BTreeSet<FsPath>,
    python_paths: Vec<FsPath>,
}

impl MinimalConfig {
    /// Builds a minimal config, normalizing and validating it.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Overlap`] if any source path is equal to, inside, or
    ///   an ancestor of any build path.
    /// - [`ConfigError::PythonPathOutsideSources`] if a python path is not
    ///   within some source path.
    pub fn new(
        source_paths: impl IntoIterator<Item = FsPath>,
        build_paths: impl IntoIterator<Item = FsPath>,
        python_paths: impl IntoIterator<Item = FsPath>,
    ) -> Result<Self, ConfigError> {
        let source_paths: BTreeSet<FsPath> = source_paths.into_iter().collect();
        let build_paths: BTreeSet<FsPath> = build_paths.into_iter().collect();
        let python_paths: Vec<FsPath> = python_paths.into_iter().collect();

        for source_path in &source_paths {
            for build_path in &build_paths {
                if source_path.is_relative_to(build_path) || build_path.is_relative_to(source_path)
                {
                    return Err(ConfigError::Overlap {
                        source_path: source_path.clone(),
                        build_path: build_path.clone(),
                    });
                }
            }
        }

        if let Some(path) = python_paths
            .iter()
            .find(|python_path| !source_paths.iter().any(|source| python_path.is_relative_to(source)))
        {
            return Err(ConfigError::PythonPathOutsideSources {
                path: path.clone(),
            });
        }

        Ok(Self {
            source_paths,
            build_paths,
            python_paths,
        })
    }

    /// Source files/directories, readable in every pass.
    pub fn source_paths(&self) -> &BTreeSet<FsPath> {
        &self.source_paths
    }

    /// Build files/directories, written by templates.
    pub fn build_paths(&self) -> &BTreeSet<FsPath> {
        &self.build_paths
    }

    /// Directories holding python modules used by templates, in order.
    pub fn python_paths(&self) -> &[FsPath] {
        &self.python_paths
    }

    /// Serializes to the JSON cache format, with sorted keys.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let raw = RawMinimalConfig {
            build_paths: Some(to_strings(&self.build_paths)),
            python_paths: Some(to_strings(&self.python_paths)),
            source_paths: Some(to_strings(&self.source_paths)),
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }
}

fn to_strings<'a>(paths: impl IntoIterator<Item = &'a FsPath>) -> Vec<String> {
    paths.into_iter().map(|path| path.as_str().to_string()).collect()
}

impl Default for MinimalConfig {
    fn default() -> Self {
        Self {
            source_paths: parser::DEFAULT_SOURCE_PATHS.iter().map(|path| FsPath::new(path)).collect(),
            build_paths: parser::DEFAULT_BUILD_PATHS.iter().map(|path| FsPath::new(path)).collect(),
            python_paths: Vec::new(),
        }
    }
}

/// Full project config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// The minimal subset.
    #[serde(flatten)]
    pub minimal: MinimalConfig,

    /// Templates rendered to ninja code, in order.
    pub ninja_templates: Vec<FsPath>,

    /// Normal templates, scanned and rendered, in order.
    pub templates: Vec<FsPath>,
}

impl Config {
    /// Returns the minimal subset.
    pub fn minimal(&self) -> &MinimalConfig {
        &self.minimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(values: &[&str]) -> Vec<FsPath> {
        values.iter().map(|value| FsPath::new(value)).collect()
    }

    #[test]
    fn test_normalizes_source_and_build_paths() {
        let config =
            MinimalConfig::new(paths(&["b", "a", "a"]), paths(&["out", "./out/"]), paths(&[]))
                .unwrap();
        assert_eq!(config.source_paths().iter().cloned().collect::<Vec<_>>(), paths(&["a", "b"]));
        assert_eq!(config.build_paths().len(), 1);
    }

    #[test]
    fn test_serialize_round_trip_is_stable() {
        let first =
            MinimalConfig::new(paths(&["b", "a", "a"]), paths(&["build"]), paths(&["a/py"]))
                .unwrap();
        let json = first.to_json().unwrap();
        let second = parse_minimal_json(&json).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.to_json().unwrap(), json);

        let reordered =
            MinimalConfig::new(paths(&["a", "b"]), paths(&["build", "build"]), paths(&["a/py"]))
                .unwrap();
        assert_eq!(reordered.to_json().unwrap(), json);
    }

    #[test]
    fn test_json_keys_are_sorted() {
        let json = MinimalConfig::default().to_json().unwrap();
        let build = json.find("build_paths").unwrap();
        let python = json.find("python_paths").unwrap();
        let source = json.find("source_paths").unwrap();
        assert!(build < python && python < source);
    }

    #[test]
    fn test_overlap_rejected() {
        for (source, build) in [
            ("src", "src"),
            ("src", "src/build"),
            ("build/src", "build"),
            (".", "build"),
        ] {
            let err = MinimalConfig::new(paths(&[source]), paths(&[build]), paths(&[])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Overlap { .. }),
                "expected overlap for {source} and {build}, got {err}"
            );
        }
    }

    #[test]
    fn test_siblings_with_shared_prefix_do_not_overlap() {
        MinimalConfig::new(paths(&["src"]), paths(&["src-build"]), paths(&[])).unwrap();
    }

    #[test]
    fn test_python_paths_must_be_in_sources() {
        let err = MinimalConfig::new(paths(&["src"]), paths(&["build"]), paths(&["lib"])).unwrap_err();
        assert!(matches!(err, ConfigError::PythonPathOutsideSources { .. }));
    }

    #[test]
    fn test_python_paths_keep_order() {
        let config =
            MinimalConfig::new(paths(&["src"]), paths(&["build"]), paths(&["src/z", "src/a"]))
                .unwrap();
        assert_eq!(config.python_paths(), paths(&["src/z", "src/a"]).as_slice());
    }
}
