//! `ginjarator scan TEMPLATE`

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::driver;
use crate::paths::FsPath;

/// Command to scan a template.
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Template to scan, relative to the project root
    pub template: String,
}

impl ScanCommand {
    /// Execute the scan command.
    pub fn execute(self, root: &Path) -> Result<()> {
        driver::scan(root, &FsPath::new(&self.template))?;
        Ok(())
    }
}
