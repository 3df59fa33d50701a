//! Temporary ginjarator projects.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::driver;

/// A project in a temporary directory, deleted on drop.
pub struct ProjectFixture {
    temp_dir: TempDir,
}

impl ProjectFixture {
    /// Creates a project with `ginjarator.toml` and an empty `src/`.
    ///
    /// The minimal config cache is not created; call
    /// [`minimal_config`](Self::minimal_config) or run `init`.
    pub fn new(config_toml: &str) -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp dir")?;
        let fixture = Self {
            temp_dir,
        };
        fixture.write("ginjarator.toml", config_toml)?;
        fs::create_dir_all(fixture.path("src"))?;
        Ok(fixture)
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolves a project-relative path.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root().join(relative)
    }

    /// Writes a file, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Reads a file.
    pub fn read(&self, relative: impl AsRef<Path>) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Writes the minimal config cache, as `init` would.
    pub fn minimal_config(&self) -> Result<()> {
        driver::minimal_config(self.root())?;
        Ok(())
    }

    /// Modification times of every file in the project.
    ///
    /// Ninja's own state directory is skipped, since ninja rewrites its log
    /// on every run.
    pub fn mtimes(&self) -> Result<BTreeMap<PathBuf, SystemTime>> {
        let builddir = self.path(crate::paths::NINJA_BUILDDIR.as_path());
        let mut mtimes = BTreeMap::new();
        for entry in WalkDir::new(self.root()) {
            let entry = entry?;
            if entry.path().starts_with(&builddir) || !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(self.root())?.to_path_buf();
            mtimes.insert(relative, entry.metadata()?.modified()?);
        }
        Ok(mtimes)
    }
}
