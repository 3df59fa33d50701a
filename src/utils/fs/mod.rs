//! File system utilities
//!
//! - [`dirs`]: directory creation
//! - [`atomic`]: atomic writes and reads that tolerate missing files

pub mod atomic;
pub mod dirs;

// Directory operations
pub use dirs::{ensure_dir, ensure_parent_dir};

// Atomic write operations
pub use atomic::{atomic_write, read_existing, remove_file_if_exists};
