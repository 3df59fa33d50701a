//! `ginjarator render TEMPLATE`

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::driver::{self, OnRenderError};
use crate::paths::FsPath;

/// Command to render a scanned template.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template to render, relative to the project root
    pub template: String,

    /// Delete files the render created if it fails
    #[arg(long)]
    pub delete_created_on_error: bool,
}

impl RenderCommand {
    /// Execute the render command.
    pub fn execute(self, root: &Path) -> Result<()> {
        let on_error = if self.delete_created_on_error {
            OnRenderError::DeleteCreatedFiles
        } else {
            OnRenderError::KeepOutputs
        };
        driver::render(root, &FsPath::new(&self.template), on_error)
    }
}
