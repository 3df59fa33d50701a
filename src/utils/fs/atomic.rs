//! Atomic file writes using a temp-and-rename strategy.

use crate::core::file_error::{FileOperation, FileResultExt};
use crate::utils::fs::dirs::ensure_parent_dir;
use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Atomically writes bytes to a file.
///
/// The content goes to a temporary file in the target's directory, which is
/// synced and then renamed over the target. Readers never see a partial
/// file. Parent directories are created as needed.
///
/// A new file gets the same mode `fs::write` would give it (0666 less the
/// umask); an existing file keeps its permissions.
///
/// # Examples
///
/// ```rust,no_run
/// use ginjarator::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("build/index.html"), b"<html></html>")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
    file.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;

    match fs::metadata(path) {
        Ok(metadata) => file
            .as_file()
            .set_permissions(metadata.permissions())
            .with_file_context(FileOperation::Write, path, "keeping permissions")?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => Err(e).with_file_context(FileOperation::Read, path, "checking permissions")?,
    }
    file.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    file.persist(path)
        .map_err(|e| e.error)
        .with_file_context(FileOperation::Write, path, "atomic rename")?;

    Ok(())
}

/// Reads a file's bytes, or `None` if it does not exist.
pub fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(e).with_file_context(FileOperation::Read, path, "comparing contents").map_err(Into::into)
        }
    }
}

/// Removes a file, succeeding if it is already gone.
///
/// Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_file_context(FileOperation::Remove, path, "cleanup").map_err(Into::into),
    }
}
