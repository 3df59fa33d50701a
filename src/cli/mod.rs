//! Command-line interface for ginjarator.
//!
//! The commands are normally run by ninja, from the rules `init` writes
//! into `build.ninja`. Only `init` is meant to be run by hand, once, to
//! create the first `build.ninja`:
//!
//! ```bash
//! ginjarator init
//! ninja
//! ```
//!
//! # Global Options
//!
//! - `-v, --verbose`: debug logging
//! - `-q, --quiet`: errors only
//! - `-C, --directory <DIR>`: project root (default: current directory)
//!
//! Without `-v` or `-q`, `RUST_LOG` selects the log filter, falling back to
//! `warn`. Logs go to stderr.

mod init;
mod minimal_config;
mod render;
mod scan;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Log filter; `None` defers to `RUST_LOG`.
    pub log_level: Option<String>,

    /// Project root.
    pub root: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            root: PathBuf::from("."),
        }
    }
}

impl CliConfig {
    /// Installs the global tracing subscriber.
    ///
    /// Does nothing if one is already installed.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();
    }
}

/// Main CLI structure for ginjarator.
#[derive(Parser)]
#[command(
    name = "ginjarator",
    about = "Generate ninja build files from templates",
    version,
    long_about = "ginjarator renders templates with tracked dependencies and outputs. \
                  Each template is scanned to discover what it reads and writes, then \
                  rendered by ninja once those files are up to date."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Project root, containing ginjarator.toml
    #[arg(short = 'C', long = "directory", global = true, default_value = ".")]
    directory: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the project and generate build.ninja
    Init(init::InitCommand),

    /// Regenerate the minimal config cache (run by ninja)
    MinimalConfig(minimal_config::MinimalConfigCommand),

    /// Find a template's dependencies and outputs (run by ninja)
    Scan(scan::ScanCommand),

    /// Render a scanned template (run by ninja)
    Render(render::RenderCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Build the runtime configuration from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            root: self.directory.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Init(cmd) => cmd.execute(&config.root),
            Commands::MinimalConfig(cmd) => cmd.execute(&config.root),
            Commands::Scan(cmd) => cmd.execute(&config.root),
            Commands::Render(cmd) => cmd.execute(&config.root),
        }
    }
}
