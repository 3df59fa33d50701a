//! Dependency-tracking filesystem access.
//!
//! [`Filesystem`] is the object templates (and ginjarator itself) read and
//! write through. Every access is checked against a [`ConfiguredMode`] and
//! recorded in one of four sets:
//!
//! - `dependencies`: files read now
//! - `deferred_dependencies`: files that will be read in a later pass
//! - `outputs`: files written now
//! - `deferred_outputs`: files that will be written in a later pass
//!
//! The sets only grow. After a pass, the driver turns them into the state,
//! depfile and dyndep artifacts that tell ninja what to rebuild.
//!
//! # Construction
//!
//! The mode cannot check anything until it has the project's
//! [`MinimalConfig`], so the config is loaded with a plain read before the
//! façade exists. The file it came from is then recorded as the very first
//! dependency, which keeps the config itself tracked.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ginjarator::filesystem::{Filesystem, Mode, ReadOutcome};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut fs = Filesystem::new(".", Mode::Scan)?;
//! match fs.read_text("build/generated.txt", true)? {
//!     ReadOutcome::Available(contents) => println!("{contents}"),
//!     ReadOutcome::NotYetAvailable => println!("will be read during render"),
//! }
//! # Ok(())
//! # }
//! ```

mod mode;

pub use mode::{Access, AccessError, ConfigSource, ConfiguredMode, Mode};

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{self, Config, MinimalConfig};
use crate::core::GinjaratorError;
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::paths::{self, FsPath};
use crate::utils::fs::{atomic_write, read_existing, remove_file_if_exists};

/// Result of [`Filesystem::read_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The file was read.
    Available(String),
    /// The file may not be built yet; it was recorded as a deferred
    /// dependency.
    NotYetAvailable,
}

impl ReadOutcome {
    /// The contents, if available.
    pub fn into_option(self) -> Option<String> {
        match self {
            ReadOutcome::Available(contents) => Some(contents),
            ReadOutcome::NotYetAvailable => None,
        }
    }

    /// Whether the contents were read.
    pub fn is_available(&self) -> bool {
        matches!(self, ReadOutcome::Available(_))
    }
}

/// Result of [`Filesystem::write_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// New contents were written.
    Written,
    /// The file already had these contents and was left untouched.
    Unchanged,
    /// The write was recorded as a deferred output.
    Deferred,
}

impl WriteOutcome {
    /// Whether the file on disk changed.
    pub fn changed(self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Interface to the filesystem for one pass.
#[derive(Debug)]
pub struct Filesystem {
    root: PathBuf,
    mode: ConfiguredMode,
    minimal_config: Arc<MinimalConfig>,
    dependencies: BTreeSet<FsPath>,
    deferred_dependencies: BTreeSet<FsPath>,
    outputs: BTreeSet<FsPath>,
    deferred_outputs: BTreeSet<FsPath>,
    created_files: Vec<FsPath>,
}

impl Filesystem {
    /// Creates a façade for `root` in `mode`.
    ///
    /// # Errors
    ///
    /// Fails if the config for the mode's [`ConfigSource`] is missing or
    /// invalid.
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Result<Self> {
        let root = root.into();
        let source = mode.config_source();
        let loaded_from = source.path();

        debug!(mode = mode.name(), config = %loaded_from, "Loading minimal config");
        let minimal_config = Arc::new(load_minimal_config(&root, source)?);

        let mut fs = Self {
            root,
            mode: mode.configure(Arc::clone(&minimal_config)),
            minimal_config,
            dependencies: BTreeSet::new(),
            deferred_dependencies: BTreeSet::new(),
            outputs: BTreeSet::new(),
            deferred_outputs: BTreeSet::new(),
            created_files: Vec::new(),
        };

        fs.add_dependency(loaded_from, false)?;
        Ok(fs)
    }

    /// Creates a façade in [`Mode::Internal`].
    pub fn internal(root: impl Into<PathBuf>) -> Result<Self> {
        Self::new(root, Mode::Internal)
    }

    /// Top-level path of the project.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured mode.
    pub fn mode(&self) -> &ConfiguredMode {
        &self.mode
    }

    /// Resolves a project path to an OS path.
    pub fn resolve(&self, path: &FsPath) -> PathBuf {
        self.root.join(path.as_path())
    }

    /// Files that were read.
    pub fn dependencies(&self) -> &BTreeSet<FsPath> {
        &self.dependencies
    }

    /// Files deferred to be read in another pass.
    pub fn deferred_dependencies(&self) -> &BTreeSet<FsPath> {
        &self.deferred_dependencies
    }

    /// Files that were written (or will be, within this pass).
    pub fn outputs(&self) -> &BTreeSet<FsPath> {
        &self.outputs
    }

    /// Files deferred to be written in another pass.
    pub fn deferred_outputs(&self) -> &BTreeSet<FsPath> {
        &self.deferred_outputs
    }

    /// Files this façade created that did not exist before.
    pub fn created_files(&self) -> &[FsPath] {
        &self.created_files
    }

    /// Records a dependency without reading it.
    ///
    /// Returns whether the file can be read in this pass.
    pub fn add_dependency(
        &mut self,
        path: impl Into<FsPath>,
        defer_ok: bool,
    ) -> Result<Access, AccessError> {
        let path = path.into();
        let access = self.mode.check_read(&path, defer_ok)?;
        match access {
            Access::Now => {
                debug!(%path, "Recorded dependency");
                self.dependencies.insert(path);
            }
            Access::Deferred => {
                debug!(%path, "Recorded deferred dependency");
                self.deferred_dependencies.insert(path);
            }
        }
        Ok(access)
    }

    /// Reads a file, or defers it to a later pass.
    ///
    /// With `defer_ok`, a path that may not be built yet is recorded and
    /// [`ReadOutcome::NotYetAvailable`] is returned. Without it, such a path
    /// fails with [`AccessError::DeferralDisabled`].
    pub fn read_text(&mut self, path: impl Into<FsPath>, defer_ok: bool) -> Result<ReadOutcome> {
        let path = path.into();
        match self.add_dependency(path.clone(), defer_ok)? {
            Access::Deferred => Ok(ReadOutcome::NotYetAvailable),
            Access::Now => {
                let full_path = self.resolve(&path);
                let contents = std::fs::read_to_string(&full_path).with_file_context(
                    FileOperation::Read,
                    &full_path,
                    format!("dependency '{path}'"),
                )?;
                Ok(ReadOutcome::Available(contents))
            }
        }
    }

    /// Reads a file that must be readable in this pass.
    pub fn read_text_now(&mut self, path: impl Into<FsPath>) -> Result<String> {
        let path = path.into();
        match self.read_text(path.clone(), false)? {
            ReadOutcome::Available(contents) => Ok(contents),
            ReadOutcome::NotYetAvailable => Err(AccessError::DeferralDisabled {
                path,
            }
            .into()),
        }
    }

    /// Parses and returns the full config, recording it as a dependency.
    pub fn read_config(&mut self) -> Result<Config> {
        let contents = self.read_text_now(paths::CONFIG.clone())?;
        config::parse_config_toml(&contents)
            .with_context(|| format!("Invalid config in {}", *paths::CONFIG))
    }

    /// The minimal config this façade was configured with.
    ///
    /// Its source was recorded as a dependency on construction.
    pub fn read_minimal_config(&self) -> &MinimalConfig {
        &self.minimal_config
    }

    /// Records an output without writing it.
    ///
    /// Returns whether the file can be written in this pass.
    pub fn add_output(
        &mut self,
        path: impl Into<FsPath>,
        defer_ok: bool,
    ) -> Result<Access, AccessError> {
        let path = path.into();
        let access = self.mode.check_write(&path, defer_ok)?;
        match access {
            Access::Now => {
                debug!(%path, "Recorded output");
                self.outputs.insert(path);
            }
            Access::Deferred => {
                debug!(%path, "Recorded deferred output");
                self.deferred_outputs.insert(path);
            }
        }
        Ok(access)
    }

    /// Writes a file, or defers it to a later pass.
    ///
    /// Identical contents are not rewritten, so the file's mtime only moves
    /// when something changed and ninja's `restat` can prune the graph.
    pub fn write_text(
        &mut self,
        path: impl Into<FsPath>,
        contents: &str,
        defer_ok: bool,
    ) -> Result<WriteOutcome> {
        self.write(path.into(), contents, defer_ok, false)
    }

    /// Like [`write_text`](Self::write_text), but rewrites identical contents.
    ///
    /// Used for `build.ninja` when a file it includes changed, so ninja
    /// notices and reloads it.
    pub fn write_text_forced(
        &mut self,
        path: impl Into<FsPath>,
        contents: &str,
        defer_ok: bool,
    ) -> Result<WriteOutcome> {
        self.write(path.into(), contents, defer_ok, true)
    }

    fn write(
        &mut self,
        path: FsPath,
        contents: &str,
        defer_ok: bool,
        force: bool,
    ) -> Result<WriteOutcome> {
        if self.add_output(path.clone(), defer_ok)? == Access::Deferred {
            return Ok(WriteOutcome::Deferred);
        }

        let full_path = self.resolve(&path);
        let existing = read_existing(&full_path)?;
        if !force && existing.as_deref() == Some(contents.as_bytes()) {
            debug!(%path, "Contents unchanged, not writing");
            return Ok(WriteOutcome::Unchanged);
        }

        atomic_write(&full_path, contents.as_bytes())
            .with_context(|| format!("Failed to write '{path}'"))?;
        if existing.is_none() {
            self.created_files.push(path.clone());
        }
        debug!(%path, "Wrote file");
        Ok(WriteOutcome::Written)
    }

    /// Deletes every file this façade created, returning the ones removed.
    pub fn delete_created_files(&mut self) -> Result<Vec<FsPath>> {
        let mut removed = Vec::new();
        for path in std::mem::take(&mut self.created_files) {
            if remove_file_if_exists(&self.resolve(&path))? {
                info!(%path, "Deleted partially rendered output");
                removed.push(path);
            }
        }
        Ok(removed)
    }
}

/// Reads the minimal config without going through a façade.
fn load_minimal_config(root: &Path, source: ConfigSource) -> Result<MinimalConfig> {
    let path = root.join(source.path().as_path());
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let path = path.display().to_string();
            return Err(match source {
                ConfigSource::ConfigFile => GinjaratorError::ConfigNotFound {
                    path,
                },
                ConfigSource::MinimalConfigCache => GinjaratorError::MinimalConfigNotFound {
                    path,
                },
            }
            .into());
        }
        Err(e) => {
            return Err(e)
                .with_file_context(FileOperation::Read, &path, "loading config")
                .map_err(Into::into);
        }
    };

    let minimal = match source {
        ConfigSource::ConfigFile => config::parse_config_toml(&contents).map(|config| config.minimal),
        ConfigSource::MinimalConfigCache => config::parse_minimal_json(&contents),
    };
    minimal.with_context(|| format!("Invalid config in {}", source.path()))
}
