//! Test fixtures for creating sample manifests, configs, and cache entries
//!
//! This module provides builders for the files gantry reads and writes in
//! tests: gantry.toml manifests, configuration files with cache profiles,
//! and pre-seeded cache entries.

use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{ArtifactDescriptor, LocalCacheStore};
use crate::config::CacheProfile;
use crate::constants::MANIFEST_FILE;
use crate::graph::Fingerprint;

/// Test fixture for creating sample gantry.toml files
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    pub content: String,
    pub name: String,
}

impl ManifestFixture {
    /// Diamond-shaped workspace: App depends on UI and Net, both on Core
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
[workspace]
name = "Shop"

[targets.App]
kind = "application"
platform = "ios"
sources = ["App/Sources/**/*.swift"]
dependencies = ["UI", "Net"]

[targets.UI]
kind = "framework"
sources = ["UI/Sources/**/*.swift"]
dependencies = ["Core"]

[targets.Net]
kind = "framework"
sources = ["Net/Sources/**/*.swift"]
dependencies = ["Core"]

[targets.Core]
kind = "static-library"
sources = ["Core/Sources/**/*.swift"]
"#
            .trim()
            .to_string(),
        }
    }

    /// App depending on Core, plus an unrelated Tool target
    ///
    /// Focusing on App must keep Core and drop Tool entirely.
    pub fn app_core() -> Self {
        Self {
            name: "app_core".to_string(),
            content: r#"
[workspace]
name = "Focus"

[targets.App]
kind = "application"
sources = ["App/**/*.swift"]
dependencies = ["Core"]

[targets.Core]
kind = "framework"
sources = ["Core/**/*.swift"]

[targets.Tool]
kind = "application"
sources = ["Tool/**/*.swift"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Workspace with an external prebuilt dependency
    pub fn with_external() -> Self {
        Self {
            name: "with_external".to_string(),
            content: r#"
[workspace]
name = "Shop"

[targets.App]
kind = "application"
sources = ["App/**/*.swift"]
dependencies = ["Core", "Analytics"]

[targets.Core]
kind = "framework"
sources = ["Core/**/*.swift"]

[external.Analytics]
dependencies = []
"#
            .trim()
            .to_string(),
        }
    }

    /// Dependency cycle between App and Core
    pub fn cyclic() -> Self {
        Self {
            name: "cyclic".to_string(),
            content: r#"
[workspace]
name = "Loop"

[targets.App]
kind = "application"
dependencies = ["Core"]

[targets.Core]
kind = "framework"
dependencies = ["App"]
"#
            .trim()
            .to_string(),
        }
    }

    /// References a dependency that is never declared (typo of Core)
    pub fn unknown_dependency() -> Self {
        Self {
            name: "unknown_dependency".to_string(),
            content: r#"
[workspace]
name = "Broken"

[targets.App]
kind = "application"
dependencies = ["Coer"]

[targets.Core]
kind = "framework"
"#
            .trim()
            .to_string(),
        }
    }

    /// Manifest with invalid TOML syntax
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: r#"
[workspace
name = "Broken"

[targets.App]
kind = "application"
"#
            .trim()
            .to_string(),
        }
    }

    /// Write the fixture as `gantry.toml` inside `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let manifest_path = dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, &self.content)?;
        Ok(manifest_path)
    }
}

/// Test fixture for creating configuration files with cache profiles
#[derive(Clone, Debug)]
pub struct ConfigFixture {
    pub content: String,
    pub name: String,
}

impl ConfigFixture {
    /// Config with `development` (debug) and `release` profiles, defaulting
    /// to `development`, and the cache rooted at `cache_dir`.
    pub fn with_cache_dir(cache_dir: &Path) -> Self {
        let dir = cache_dir.display().to_string().replace('\\', "/");
        Self {
            name: "with_cache_dir".to_string(),
            content: format!(
                r#"[cache]
dir = "{dir}"
default_profile = "development"

[cache.profiles.development]
configuration = "debug"

[cache.profiles.release]
configuration = "release"
"#
            ),
        }
    }

    /// Same profiles but no `default_profile`; selecting no profile must
    /// fail.
    pub fn without_default_profile(cache_dir: &Path) -> Self {
        let dir = cache_dir.display().to_string().replace('\\', "/");
        Self {
            name: "without_default_profile".to_string(),
            content: format!(
                r#"[cache]
dir = "{dir}"

[cache.profiles.development]
configuration = "debug"
"#
            ),
        }
    }

    /// Write the config to a directory as `config.toml`
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join("config.toml");
        fs::write(&config_path, &self.content)?;
        Ok(config_path)
    }
}

/// Build an artifact descriptor for tests.
pub fn descriptor(
    fingerprint: Fingerprint,
    target: &str,
    configuration: &str,
    artifact: &Path,
) -> ArtifactDescriptor {
    ArtifactDescriptor {
        fingerprint,
        target: target.to_string(),
        configuration: configuration.to_string(),
        path: artifact.to_path_buf(),
        checksum: None,
        created_at: Utc::now(),
    }
}

/// Write a cache entry directly to disk, without going through the async
/// store. The entry lands exactly where [`LocalCacheStore`] will look for
/// it.
pub fn seed_cache_entry(
    cache_root: &Path,
    profile: &CacheProfile,
    descriptor: &ArtifactDescriptor,
) -> Result<PathBuf> {
    let store = LocalCacheStore::new(cache_root);
    let entry = store.entry_path(&descriptor.fingerprint, profile);
    if let Some(parent) = entry.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&entry, serde_json::to_vec_pretty(descriptor)?)?;
    Ok(entry)
}
