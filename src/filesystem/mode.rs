//! Access modes.
//!
//! A [`Mode`] describes *who* is touching the filesystem and in which pass.
//! It has no behavior of its own: [`Mode::configure`] consumes it together
//! with the project's [`MinimalConfig`] and returns a [`ConfiguredMode`],
//! which answers read and write checks. A mode can therefore be configured
//! exactly once.
//!
//! | Mode | Read | Write |
//! |---|---|---|
//! | `Internal` | `.ginjarator/`, source paths, `ginjarator.toml` | `.ginjarator/`, `build.ninja` |
//! | `Ninja` | source paths, `ginjarator.toml` | nothing |
//! | `Scan` | source paths, config files; build paths deferred | build paths deferred |
//! | `Render` | exactly the scanned dependencies | exactly the scanned outputs |
//!
//! The checks catch build-authoring mistakes. They are not a sandbox: paths
//! are compared lexically and never resolved against the OS.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::config::MinimalConfig;
use crate::paths::{self, FsPath};

/// Result of a successful access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The access may happen now.
    Now,
    /// The access must wait for a later pass.
    Deferred,
}

/// A rejected access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The path is in none of the mode's allow-sets.
    #[error("'{path}' is not in allowed paths: {allowed:?}")]
    NotAllowed {
        /// The rejected path.
        path: FsPath,
        /// Allow-set entries that were considered, sorted.
        allowed: Vec<String>,
    },

    /// The path could only be accessed in a later pass, and the caller
    /// asked not to defer.
    #[error("'{path}' is not allowed in this pass and deferring to a later pass is disabled")]
    DeferralDisabled {
        /// The rejected path.
        path: FsPath,
    },
}

/// Where a façade loads its minimal config from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// The cached minimal config under `.ginjarator/`.
    MinimalConfigCache,
    /// `ginjarator.toml` itself.
    ConfigFile,
}

impl ConfigSource {
    /// The file this source reads.
    pub fn path(self) -> &'static FsPath {
        match self {
            ConfigSource::MinimalConfigCache => &paths::MINIMAL_CONFIG,
            ConfigSource::ConfigFile => &paths::CONFIG,
        }
    }
}

/// How the filesystem can be accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Access by ginjarator itself, not templates.
    Internal,
    /// Rendering a template that produces ninja code. Nothing can be written.
    Ninja,
    /// First pass: discover dependencies and outputs.
    Scan,
    /// [`Mode::Scan`] for project tests, configured from `ginjarator.toml`.
    TestScan,
    /// Second pass: exactly the accesses a scan discovered.
    Render {
        /// Dependencies (immediate and deferred) from the scan pass.
        dependencies: BTreeSet<FsPath>,
        /// Outputs (immediate and deferred) from the scan pass.
        outputs: BTreeSet<FsPath>,
    },
    /// [`Mode::Render`] for project tests, configured from `ginjarator.toml`.
    TestRender {
        /// Dependencies allowed to be read.
        dependencies: BTreeSet<FsPath>,
        /// Outputs allowed to be written.
        outputs: BTreeSet<FsPath>,
    },
}

impl Mode {
    /// Render mode for the given scan results.
    pub fn render(
        dependencies: impl IntoIterator<Item = FsPath>,
        outputs: impl IntoIterator<Item = FsPath>,
    ) -> Self {
        Mode::Render {
            dependencies: dependencies.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }

    /// Where the minimal config for this mode comes from.
    ///
    /// Internal and Ninja modes run during `init`, which produces the cache,
    /// so they cannot depend on it. Test modes read the real config so tests
    /// don't need `init` to have run.
    pub fn config_source(&self) -> ConfigSource {
        match self {
            Mode::Scan | Mode::Render { .. } => ConfigSource::MinimalConfigCache,
            Mode::Internal | Mode::Ninja | Mode::TestScan | Mode::TestRender { .. } => {
                ConfigSource::ConfigFile
            }
        }
    }

    /// Short name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Internal => "internal",
            Mode::Ninja => "ninja",
            Mode::Scan => "scan",
            Mode::TestScan => "test-scan",
            Mode::Render { .. } => "render",
            Mode::TestRender { .. } => "test-render",
        }
    }

    /// Binds the mode to a minimal config.
    pub fn configure(self, minimal_config: Arc<MinimalConfig>) -> ConfiguredMode {
        ConfiguredMode {
            mode: self,
            minimal_config,
        }
    }
}

/// A [`Mode`] bound to a minimal config, ready to check accesses.
#[derive(Debug, Clone)]
pub struct ConfiguredMode {
    mode: Mode,
    minimal_config: Arc<MinimalConfig>,
}

/// Allow-sets for one check.
#[derive(Default)]
struct AllowSets<'a> {
    /// Prefixes accessible now.
    now: Vec<&'a FsPath>,
    /// Exact paths accessible now.
    now_exact: Vec<&'a FsPath>,
    /// Prefixes accessible in a later pass.
    deferred: Vec<&'a FsPath>,
}

impl AllowSets<'_> {
    fn check(&self, path: &FsPath, defer_ok: bool) -> Result<Access, AccessError> {
        if self.now_exact.contains(&path) || is_relative_to_any(path, &self.now) {
            return Ok(Access::Now);
        }

        if is_relative_to_any(path, &self.deferred) {
            return if defer_ok {
                Ok(Access::Deferred)
            } else {
                Err(AccessError::DeferralDisabled {
                    path: path.clone(),
                })
            };
        }

        let mut considered: BTreeSet<&str> =
            self.now.iter().chain(&self.now_exact).map(|allowed| allowed.as_str()).collect();
        if defer_ok {
            considered.extend(self.deferred.iter().map(|allowed| allowed.as_str()));
        }
        Err(AccessError::NotAllowed {
            path: path.clone(),
            allowed: considered.into_iter().map(str::to_string).collect(),
        })
    }
}

fn is_relative_to_any(path: &FsPath, others: &[&FsPath]) -> bool {
    others.iter().any(|other| path.is_relative_to(other))
}

impl ConfiguredMode {
    /// The underlying mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// The minimal config this mode was configured with.
    pub fn minimal_config(&self) -> &MinimalConfig {
        &self.minimal_config
    }

    /// Checks whether `path` can be read.
    ///
    /// Internal and Ninja modes never defer, whatever `defer_ok` says.
    pub fn check_read(&self, path: &FsPath, defer_ok: bool) -> Result<Access, AccessError> {
        let config = &*self.minimal_config;
        match &self.mode {
            Mode::Internal => {
                let mut now = vec![&*paths::INTERNAL];
                now.extend(config.source_paths());
                AllowSets {
                    now,
                    now_exact: vec![&*paths::CONFIG],
                    ..AllowSets::default()
                }
                .check(path, false)
            }
            Mode::Ninja => AllowSets {
                now: config.source_paths().iter().collect(),
                now_exact: vec![&*paths::CONFIG],
                ..AllowSets::default()
            }
            .check(path, false),
            Mode::Scan | Mode::TestScan => self.scan_check_read(path, defer_ok),
            Mode::Render {
                dependencies,
                ..
            }
            | Mode::TestRender {
                dependencies,
                ..
            } => {
                self.scan_check_read(path, true)?;
                AllowSets {
                    now_exact: dependencies.iter().collect(),
                    ..AllowSets::default()
                }
                .check(path, false)
            }
        }
    }

    /// Checks whether `path` can be written.
    pub fn check_write(&self, path: &FsPath, defer_ok: bool) -> Result<Access, AccessError> {
        match &self.mode {
            Mode::Internal => AllowSets {
                now: vec![&*paths::INTERNAL],
                now_exact: vec![&*paths::NINJA_ENTRYPOINT],
                ..AllowSets::default()
            }
            .check(path, false),
            Mode::Ninja => AllowSets::default().check(path, false),
            Mode::Scan | Mode::TestScan => self.scan_check_write(path, defer_ok),
            Mode::Render {
                outputs,
                ..
            }
            | Mode::TestRender {
                outputs,
                ..
            } => {
                self.scan_check_write(path, true)?;
                AllowSets {
                    now_exact: outputs.iter().collect(),
                    ..AllowSets::default()
                }
                .check(path, false)
            }
        }
    }

    fn scan_check_read(&self, path: &FsPath, defer_ok: bool) -> Result<Access, AccessError> {
        AllowSets {
            now: self.minimal_config.source_paths().iter().collect(),
            now_exact: vec![&*paths::CONFIG, &*paths::MINIMAL_CONFIG],
            deferred: self.minimal_config.build_paths().iter().collect(),
        }
        .check(path, defer_ok)
    }

    fn scan_check_write(&self, path: &FsPath, defer_ok: bool) -> Result<Access, AccessError> {
        AllowSets {
            deferred: self.minimal_config.build_paths().iter().collect(),
            ..AllowSets::default()
        }
        .check(path, defer_ok)
    }
}
