//! Integration tests for ginjarator.
//!
//! - **cli**: the binary's commands, exit codes and error messages
//! - **ninja_build**: full builds driven by a real `ninja`, skipped when it
//!   isn't installed
//! - **passes**: scan and render passes across several templates

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod ninja_build;
mod passes;
