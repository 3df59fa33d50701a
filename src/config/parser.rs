//! Raw config shapes and text parsing.
//!
//! The raw structs mirror the on-disk formats one-to-one and reject unknown
//! keys, so a typo such as `source_path` fails at parse time instead of being
//! silently ignored. Validation and normalization happen when a raw value is
//! converted into [`MinimalConfig`] or [`Config`].

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError, MinimalConfig};
use crate::paths::FsPath;

/// Default `source_paths` when the key is absent.
pub(crate) const DEFAULT_SOURCE_PATHS: &[&str] = &["src"];

/// Default `build_paths` when the key is absent.
pub(crate) const DEFAULT_BUILD_PATHS: &[&str] = &["build"];

/// Raw minimal config, as stored in the JSON cache.
///
/// Field order is alphabetical so the serialized form has sorted keys.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawMinimalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_paths: Option<Vec<String>>,
}

/// Raw project config, as written in `ginjarator.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub source_paths: Option<Vec<String>>,
    #[serde(default)]
    pub build_paths: Option<Vec<String>>,
    #[serde(default)]
    pub python_paths: Option<Vec<String>>,
    #[serde(default)]
    pub ninja_templates: Vec<String>,
    #[serde(default)]
    pub templates: Vec<String>,
}

fn paths_or_default(raw: Option<Vec<String>>, default: &[&str]) -> Vec<FsPath> {
    match raw {
        Some(values) => values.into_iter().map(FsPath::from).collect(),
        None => default.iter().map(|value| FsPath::new(value)).collect(),
    }
}

impl TryFrom<RawMinimalConfig> for MinimalConfig {
    type Error = ConfigError;

    fn try_from(raw: RawMinimalConfig) -> Result<Self, Self::Error> {
        MinimalConfig::new(
            paths_or_default(raw.source_paths, DEFAULT_SOURCE_PATHS),
            paths_or_default(raw.build_paths, DEFAULT_BUILD_PATHS),
            paths_or_default(raw.python_paths, &[]),
        )
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let minimal = MinimalConfig::try_from(RawMinimalConfig {
            build_paths: raw.build_paths,
            python_paths: raw.python_paths,
            source_paths: raw.source_paths,
        })?;
        Ok(Config {
            minimal,
            ninja_templates: raw.ninja_templates.into_iter().map(FsPath::from).collect(),
            templates: raw.templates.into_iter().map(FsPath::from).collect(),
        })
    }
}

/// Parses the full project config from TOML text.
pub fn parse_config_toml(contents: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(contents)?;
    Config::try_from(raw)
}

/// Parses a minimal config from the JSON cache format.
pub fn parse_minimal_json(contents: &str) -> Result<MinimalConfig, ConfigError> {
    let raw: RawMinimalConfig = serde_json::from_str(contents)?;
    MinimalConfig::try_from(raw)
}
