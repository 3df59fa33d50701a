//! `ginjarator init`

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::driver;

/// Command to initialize a project.
///
/// Generates `.ginjarator/` and `build.ninja`. Safe to run repeatedly;
/// unchanged files are left alone.
#[derive(Args, Debug)]
pub struct InitCommand {}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self, root: &Path) -> Result<()> {
        driver::init(root)
    }
}
