//! `ginjarator minimal-config`

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::driver;

/// Command to regenerate the minimal config cache.
#[derive(Args, Debug)]
pub struct MinimalConfigCommand {}

impl MinimalConfigCommand {
    /// Execute the minimal-config command.
    pub fn execute(self, root: &Path) -> Result<()> {
        driver::minimal_config(root)?;
        Ok(())
    }
}
