//! Persisted result of scanning a template.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::paths::FsPath;

/// What a template's render pass may read and write.
///
/// Written by scan, read back by render to configure its allow-sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateState {
    /// Everything render will read: immediate and deferred dependencies.
    pub dependencies: BTreeSet<FsPath>,
    /// Everything render will write: immediate and deferred outputs.
    pub outputs: BTreeSet<FsPath>,
}

impl TemplateState {
    /// Serializes to pretty JSON with sorted keys and paths.
    pub fn to_json(&self) -> serde_json::Result<String> {
        // Field order is alphabetical and the sets are sorted, so the output
        // is stable across runs.
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parses the JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
