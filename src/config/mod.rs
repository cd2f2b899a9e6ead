//! Configuration management for Gantry
//!
//! This module provides user-level configuration for the workspace generator:
//! where the artifact cache lives and which cache profiles exist. The
//! configuration is deliberately separate from the project manifest
//! (`gantry.toml`); it describes the *user's* environment, not the project.
//!
//! # File Location
//!
//! - **Unix/macOS**: `~/.gantry/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\gantry\config.toml`
//!
//! The location can be overridden with the `GANTRY_CONFIG` environment
//! variable or the global `--config` flag.
//!
//! # Format
//!
//! ```toml
//! [cache]
//! dir = "~/.gantry/cache"
//! default_profile = "development"
//!
//! [cache.profiles.development]
//! configuration = "debug"
//!
//! [cache.profiles.release]
//! configuration = "release"
//! ```
//!
//! # Bootstrap Behavior
//!
//! When no configuration file exists at all, Gantry bootstraps a built-in
//! `development` profile (configuration `debug`) and uses it as the default,
//! so a fresh checkout generates without any setup. A configuration file that
//! *does* exist is taken at face value: if it defines profiles but no
//! `default_profile`, profile selection requires an explicit `--profile`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::constants::{
    BOOTSTRAP_PROFILE_CONFIGURATION, BOOTSTRAP_PROFILE_NAME, CONFIG_ENV_VAR,
};
use crate::core::GantryError;
use crate::utils::similar_names;

/// A named cache profile from the `[cache.profiles.<name>]` tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Build configuration the profile caches artifacts for (e.g. `debug`).
    pub configuration: String,
}

/// Cache-related settings from the `[cache]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Root directory of the artifact cache.
    ///
    /// Supports `~` and `$VAR` expansion. Defaults to `~/.gantry/cache`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Profile used when no `--profile` flag is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Available cache profiles keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

/// A fully resolved cache profile: the name plus its build configuration.
///
/// This is what the focus engine and cache store work with; resolution from
/// the requested name happens exactly once, in [`Config::resolve_profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheProfile {
    /// Profile name, also the namespace directory inside the cache root.
    pub name: String,
    /// Build configuration recorded in and matched against cache entries.
    pub configuration: String,
}

/// User-level Gantry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Artifact cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Creates the built-in configuration used when no file exists on disk:
    /// a single `development` profile set as the default.
    #[must_use]
    pub fn bootstrap() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            BOOTSTRAP_PROFILE_NAME.to_string(),
            ProfileConfig {
                configuration: BOOTSTRAP_PROFILE_CONFIGURATION.to_string(),
            },
        );

        Self {
            cache: CacheConfig {
                dir: None,
                default_profile: Some(BOOTSTRAP_PROFILE_NAME.to_string()),
                profiles,
            },
        }
    }

    /// Load configuration from the default location.
    ///
    /// Honors the `GANTRY_CONFIG` environment variable; falls back to
    /// [`Config::default_path`]. When neither names an existing file, the
    /// bootstrap configuration is returned.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::ConfigNotFound`] when `GANTRY_CONFIG` points at
    /// a file that does not exist, or a parse error when a file exists but is
    /// not valid TOML.
    pub async fn load() -> Result<Self> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(env_path);
            if !path.exists() {
                return Err(GantryError::ConfigNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            return Self::load_from(&path).await;
        }

        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::bootstrap())
        }
    }

    /// Load configuration from a specific file path.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            GantryError::ConfigError {
                message: format!("invalid config at {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Save configuration to a specific file path, creating parent
    /// directories as needed.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Get the default file path for the configuration.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\gantry\config.toml`
    /// - **Unix/macOS**: `~/.gantry/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("gantry")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".gantry")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Resolve the root directory of the artifact cache.
    ///
    /// Uses `cache.dir` with tilde and environment expansion when set,
    /// otherwise `~/.gantry/cache`.
    pub fn cache_root(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => crate::utils::platform::resolve_path(dir),
            None => Ok(crate::utils::platform::get_home_dir()?.join(".gantry").join("cache")),
        }
    }

    /// Resolve which cache profile a generation run should use.
    ///
    /// # Selection
    ///
    /// 1. An explicitly requested profile must exist, otherwise
    ///    [`GantryError::UnknownProfile`]
    /// 2. Without a request, `cache.default_profile` is looked up
    /// 3. Without a default either, [`GantryError::NoDefaultProfile`]
    pub fn resolve_profile(&self, requested: Option<&str>) -> Result<CacheProfile, GantryError> {
        let name = match requested {
            Some(name) => name,
            None => match self.cache.default_profile.as_deref() {
                Some(name) => name,
                None => return Err(GantryError::NoDefaultProfile),
            },
        };

        let profile = self.cache.profiles.get(name).ok_or_else(|| {
            let candidates: Vec<&str> = self.cache.profiles.keys().map(String::as_str).collect();
            let similar = similar_names(name, &candidates);
            if !similar.is_empty() {
                warn!(
                    profile = %name,
                    "unknown cache profile, closest defined names: {}",
                    similar.join(", ")
                );
            }
            GantryError::UnknownProfile { name: name.to_string() }
        })?;

        Ok(CacheProfile {
            name: name.to_string(),
            configuration: profile.configuration.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn config_with_profiles() -> Config {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "development".to_string(),
            ProfileConfig {
                configuration: "debug".to_string(),
            },
        );
        profiles.insert(
            "release".to_string(),
            ProfileConfig {
                configuration: "release".to_string(),
            },
        );

        Config {
            cache: CacheConfig {
                dir: None,
                default_profile: Some("development".to_string()),
                profiles,
            },
        }
    }

    #[test]
    fn test_resolve_profile_explicit() {
        let config = config_with_profiles();
        let profile = config.resolve_profile(Some("release")).unwrap();
        assert_eq!(profile.name, "release");
        assert_eq!(profile.configuration, "release");
    }

    #[test]
    fn test_resolve_profile_default() {
        let config = config_with_profiles();
        let profile = config.resolve_profile(None).unwrap();
        assert_eq!(profile.name, "development");
        assert_eq!(profile.configuration, "debug");
    }

    #[test]
    fn test_resolve_profile_unknown() {
        let config = config_with_profiles();
        let err = config.resolve_profile(Some("beta")).unwrap_err();
        match err {
            GantryError::UnknownProfile {
                name,
            } => assert_eq!(name, "beta"),
            other => panic!("Expected UnknownProfile, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_profile_no_default() {
        let config = Config::default();
        let err = config.resolve_profile(None).unwrap_err();
        assert!(matches!(err, GantryError::NoDefaultProfile));
    }

    #[test]
    fn test_bootstrap_has_development_default() {
        let config = Config::bootstrap();
        let profile = config.resolve_profile(None).unwrap();
        assert_eq!(profile.name, "development");
        assert_eq!(profile.configuration, "debug");
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");

        let config = config_with_profiles();
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_from_invalid_toml() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "not [ valid toml").unwrap();

        let err = Config::load_from(&path).await.unwrap_err();
        let gantry_err = err.downcast_ref::<GantryError>().unwrap();
        assert!(matches!(gantry_err, GantryError::ConfigError { .. }));
    }

    #[tokio::test]
    #[serial]
    async fn test_load_honors_env_override() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("custom.toml");
        config_with_profiles().save_to(&path).await.unwrap();

        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, &path);
        }
        let loaded = Config::load().await.unwrap();
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }

        assert_eq!(loaded.cache.default_profile.as_deref(), Some("development"));
    }

    #[tokio::test]
    #[serial]
    async fn test_load_env_override_missing_file() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing.toml");

        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, &missing);
        }
        let result = Config::load().await;
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }

        let err = result.unwrap_err();
        let gantry_err = err.downcast_ref::<GantryError>().unwrap();
        assert!(matches!(gantry_err, GantryError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_cache_root_default_is_under_home() {
        let config = Config::default();
        let root = config.cache_root().unwrap();
        assert!(root.ends_with(".gantry/cache"));
    }

    #[test]
    fn test_cache_root_expands_custom_dir() {
        let config = Config {
            cache: CacheConfig {
                dir: Some("/var/cache/gantry".to_string()),
                ..CacheConfig::default()
            },
        };
        assert_eq!(config.cache_root().unwrap(), PathBuf::from("/var/cache/gantry"));
    }
}
