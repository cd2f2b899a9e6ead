//! Synchronous file helpers for the generator's output paths.
//!
//! Workspace documents and graph exports go through [`atomic_write`], which
//! stages the content in a temporary file and renames it into place. A crash
//! mid-write leaves the previous file intact, and readers never observe a torn
//! document. The cache has its own async write path and does not come through
//! here.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a directory and any missing parents.
///
/// Already-existing directories are fine; only a real filesystem failure is an
/// error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Write a UTF-8 string through [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Replace `path` with `content` in a single step.
///
/// The bytes are staged in a uniquely named temporary file, synced, and then
/// renamed over the target. The stage file shares the target's parent
/// directory, which keeps the rename on one filesystem and therefore atomic.
/// Missing parent directories are created first.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let target = crate::utils::platform::windows_long_path(path);
    let parent = target
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut stage = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to stage a write under {}", parent.display()))?;
    stage
        .write_all(content)
        .with_context(|| format!("Failed to stage content for {}", target.display()))?;
    stage
        .as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync staged content for {}", target.display()))?;
    stage
        .persist(&target)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to move staged file into {}", target.display()))?;

    Ok(())
}
