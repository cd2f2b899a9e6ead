//! Fingerprint-keyed artifact cache.
//!
//! Cache entries are small JSON descriptors pointing at previously built
//! artifacts, namespaced per profile:
//!
//! ```text
//! <cache root>/
//! ├── development/
//! │   └── entries/
//! │       ├── 3fc9b689459d...e7f2.json   # keyed by fingerprint hex digest
//! │       └── a665a4592042...7ae3.json
//! └── release/
//!     └── entries/
//! ```
//!
//! The store is deliberately forgiving. A missing entry, a configuration
//! mismatch, or a vanished artifact all surface as a plain miss; only
//! unreadable or corrupt state is reported as a [`CacheError`]. Callers
//! treat those errors as soft, so a broken cache can slow generation down
//! but never fail it.

pub mod checksum;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::CacheProfile;
use crate::constants::{CACHE_READ_RETRIES, MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::graph::Fingerprint;

/// Failures at the cache boundary.
///
/// These never abort a generation run. The focus engine logs them at
/// warning level and treats the lookup as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache entry at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// A cached build artifact addressed by fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Fingerprint of the node the artifact was built from.
    pub fingerprint: Fingerprint,
    /// Target name recorded at store time, for diagnostics.
    pub target: String,
    /// Build configuration the artifact was produced with.
    pub configuration: String,
    /// Artifact location on disk, a file or a directory.
    pub path: PathBuf,
    /// Integrity checksum over the artifact contents, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// When the artifact was recorded.
    pub created_at: DateTime<Utc>,
}

/// Lookup and store operations against an artifact cache backend.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Find a valid artifact for the fingerprint under the given profile.
    ///
    /// Absence is not an error: `Ok(None)` means "build from source".
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        profile: &CacheProfile,
    ) -> Result<Option<ArtifactDescriptor>, CacheError>;

    /// Record a descriptor so later runs can substitute the artifact.
    async fn store(
        &self,
        descriptor: &ArtifactDescriptor,
        profile: &CacheProfile,
    ) -> Result<(), CacheError>;
}

/// Artifact cache backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalCacheStore {
    root: PathBuf,
}

impl LocalCacheStore {
    /// Create a store rooted at the given directory. The directory does not
    /// need to exist yet; it is created on first `store`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the entry for a fingerprint lives under the given profile.
    pub fn entry_path(&self, fingerprint: &Fingerprint, profile: &CacheProfile) -> PathBuf {
        self.root
            .join(&profile.name)
            .join("entries")
            .join(format!("{}.json", fingerprint.hex_digest()))
    }

    /// Read an entry file, retrying transient failures a bounded number of
    /// times. A missing file is a miss, not a failure, and is never retried.
    async fn read_entry(&self, path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        let mut attempt: u32 = 0;
        loop {
            match tokio::fs::read(path).await {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(err) if attempt < CACHE_READ_RETRIES => {
                    attempt += 1;
                    debug!(
                        path = %path.display(),
                        attempt,
                        error = %err,
                        "retrying cache entry read"
                    );
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
                Err(source) => {
                    return Err(CacheError::Io {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl CacheStore for LocalCacheStore {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        profile: &CacheProfile,
    ) -> Result<Option<ArtifactDescriptor>, CacheError> {
        let entry = self.entry_path(fingerprint, profile);
        let Some(bytes) = self.read_entry(&entry).await? else {
            return Ok(None);
        };

        let descriptor: ArtifactDescriptor =
            serde_json::from_slice(&bytes).map_err(|err| CacheError::Malformed {
                path: entry.clone(),
                reason: err.to_string(),
            })?;

        if descriptor.configuration != profile.configuration {
            debug!(
                target_name = %descriptor.target,
                entry_configuration = %descriptor.configuration,
                profile_configuration = %profile.configuration,
                "cache entry configuration mismatch, treating as miss"
            );
            return Ok(None);
        }

        match tokio::fs::try_exists(&descriptor.path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    path = %descriptor.path.display(),
                    "cached artifact no longer exists, treating as miss"
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: descriptor.path.clone(),
                    source,
                });
            }
        }

        if let Some(expected) = descriptor.checksum.clone() {
            let artifact = descriptor.path.clone();
            let verified =
                tokio::task::spawn_blocking(move || checksum::verify_artifact(&artifact, &expected))
                    .await
                    .map_err(|err| CacheError::Io {
                        path: descriptor.path.clone(),
                        source: std::io::Error::other(err),
                    })?
                    .map_err(|err| CacheError::Io {
                        path: descriptor.path.clone(),
                        source: std::io::Error::other(err),
                    })?;
            if !verified {
                return Err(CacheError::Malformed {
                    path: entry,
                    reason: format!("artifact checksum mismatch for '{}'", descriptor.target),
                });
            }
        }

        Ok(Some(descriptor))
    }

    async fn store(
        &self,
        descriptor: &ArtifactDescriptor,
        profile: &CacheProfile,
    ) -> Result<(), CacheError> {
        let entry = self.entry_path(&descriptor.fingerprint, profile);
        if let Some(parent) = entry.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let bytes = serde_json::to_vec_pretty(descriptor).map_err(|err| CacheError::Malformed {
            path: entry.clone(),
            reason: err.to_string(),
        })?;

        // Write-then-rename so a concurrent lookup never sees partial JSON
        let tmp = entry.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        tokio::fs::rename(&tmp, &entry).await.map_err(|source| CacheError::Io {
            path: entry,
            source,
        })?;

        Ok(())
    }
}

/// Exponential backoff for entry read retries, capped at the configured
/// maximum delay.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let millis = STARTING_BACKOFF_DELAY_MS.saturating_mul(1 << exp).min(MAX_BACKOFF_DELAY_MS);
    Duration::from_millis(millis)
}
