//! SHA-256 checksums for cached artifacts.
//!
//! Artifacts can be single files or whole directories. A directory checksum
//! hashes the sorted relative paths together with each file's checksum, so
//! both renames and content changes invalidate it. Paths are normalized to
//! forward slashes first to keep checksums identical across platforms.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::utils::normalize_path_for_storage;

/// Compute the SHA-256 checksum of a single file.
///
/// Returns the checksum in the format `sha256:<hex>`.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};

    let content = fs::read(path).with_context(|| {
        format!("Cannot read file for checksum calculation: {}", path.display())
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&content);

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Compute a combined checksum over every file in a directory.
pub fn compute_directory_checksum(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use walkdir::WalkDir;

    let mut file_hashes: Vec<(String, String)> = Vec::new();

    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in: {}", path.display()))?;

        if entry.file_type().is_file() {
            let file_path = entry.path();
            let relative_path =
                normalize_path_for_storage(file_path.strip_prefix(path).unwrap_or(file_path));
            let file_checksum = compute_file_checksum(file_path)?;
            file_hashes.push((relative_path, file_checksum));
        }
    }

    // Sort by relative path for deterministic ordering
    file_hashes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (path, checksum) in &file_hashes {
        hasher.update(format!("{path}:{checksum}\n").as_bytes());
    }

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Checksum an artifact, dispatching on whether it is a file or a directory.
pub fn compute_artifact_checksum(path: &Path) -> Result<String> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Cannot stat artifact: {}", path.display()))?;

    if metadata.is_dir() {
        compute_directory_checksum(path)
    } else {
        compute_file_checksum(path)
    }
}

/// Verify an artifact against a recorded checksum.
pub fn verify_artifact(path: &Path, expected: &str) -> Result<bool> {
    let actual = compute_artifact_checksum(path)?;
    Ok(actual == expected)
}
