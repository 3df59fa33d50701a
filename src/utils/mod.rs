//! Utility functions for ginjarator
//!
//! Low-level helpers that do not know about access modes or dependency
//! tracking. Everything here takes OS paths; the
//! [`Filesystem`](crate::filesystem::Filesystem) façade decides *whether* a
//! path may be touched, these functions only do the touching.

pub mod fs;

pub use fs::{atomic_write, ensure_dir, ensure_parent_dir, read_existing, remove_file_if_exists};
