//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result};

pub use ginjarator::test_utils::ProjectFixture;

/// Path to the compiled `ginjarator` binary.
pub fn ginjarator_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ginjarator"))
}

/// Whether a `ninja` executable is on `PATH`.
pub fn ninja_available() -> bool {
    which::which("ninja").is_ok()
}

/// `PATH` with the compiled binary's directory first, so the rules in
/// generated ninja files find it.
fn path_with_binary() -> Result<OsString> {
    let binary = ginjarator_binary();
    let bin_dir = binary.parent().context("binary has no parent directory")?;
    let mut dirs = vec![bin_dir.to_path_buf()];
    if let Some(path) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path));
    }
    std::env::join_paths(dirs).context("Failed to build PATH")
}

/// Runs `ninja` in `root` and returns its output.
pub fn run_ninja(root: &Path) -> Result<Output> {
    let output = Command::new("ninja")
        .current_dir(root)
        .env("PATH", path_with_binary()?)
        .output()
        .context("Failed to run ninja")?;
    Ok(output)
}

/// Runs `ninja` and fails with its output if it did not succeed.
pub fn run_ninja_ok(root: &Path) -> Result<String> {
    let output = run_ninja(root)?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        anyhow::bail!(
            "ninja failed with {}:\n{stdout}\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(stdout)
}
