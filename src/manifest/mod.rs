//! Manifest file parsing and validation for Gantry projects.
//!
//! This module handles `gantry.toml` manifest files, the declarative description
//! of a project's targets, external dependencies, and workspace settings.
//!
//! # Features
//!
//! - Declarative targets with kind, platform, sources, resources, and settings
//! - External prebuilt dependencies declared alongside regular targets
//! - Upward manifest discovery from any subdirectory, like Cargo and Git
//! - Validation of names, kinds, and declared paths at load time
//!
//! # Basic Structure
//!
//! ```toml
//! [workspace]
//! name = "Shop"
//!
//! [targets.App]
//! kind = "application"
//! platform = "ios"
//! sources = ["App/Sources/**"]
//! resources = ["App/Assets/**"]
//! dependencies = ["Core"]
//!
//! [targets.App.settings]
//! PRODUCT_NAME = "Shop"
//!
//! [targets.Core]
//! kind = "framework"
//! platform = "ios"
//! sources = ["Core/Sources/**"]
//!
//! [external.Analytics]
//! platform = "ios"
//! ```
//!
//! Target and external names share one namespace: a dependency entry may name
//! either, and the same name may not be declared twice.
//!
//! # Discovery
//!
//! [`find_manifest`] searches for `gantry.toml` starting from the current
//! working directory and walking up until found or the filesystem root is
//! reached, mirroring Cargo, Git, and NPM project file discovery behavior.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_FILE;
use crate::core::GantryError;
use crate::graph::model::{NodeKind, Platform};

/// Workspace-level settings from the `[workspace]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceSettings {
    /// Workspace name used for the generated bundle.
    ///
    /// Falls back to the manifest directory name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A buildable target declared under `[targets.<name>]`.
///
/// The declaration order of `sources` and `resources` is significant: it is
/// preserved into the graph and participates in fingerprinting. Dependency
/// order is not significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    /// What kind of product the target builds.
    pub kind: NodeKind,
    /// Platform the target builds for.
    #[serde(default)]
    pub platform: Platform,
    /// Source file patterns, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Resource file patterns, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Build settings as key/value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
    /// Names of targets or externals this target depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// A prebuilt external dependency declared under `[external.<name>]`.
///
/// Externals have no sources of their own but occupy the same namespace as
/// targets and can appear in any dependencies list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalSpec {
    /// Platform the external is built for.
    #[serde(default)]
    pub platform: Platform,
    /// Build settings as key/value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
    /// Names of other targets or externals this external depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// The parsed `gantry.toml` manifest.
///
/// `BTreeMap` keeps targets and externals in name order so resolution and
/// error reporting are deterministic regardless of declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Workspace-level settings.
    #[serde(default)]
    pub workspace: WorkspaceSettings,
    /// Buildable targets keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, TargetSpec>,
    /// Prebuilt externals keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub external: BTreeMap<String, ExternalSpec>,
    /// Directory containing the manifest, captured at load time.
    #[serde(skip)]
    pub manifest_dir: Option<PathBuf>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a manifest from a TOML file.
    ///
    /// # Errors
    ///
    /// - File I/O errors (not found, permission denied)
    /// - [`GantryError::ManifestParseError`] for invalid TOML
    /// - [`GantryError::DuplicateTarget`] when a name appears in both
    ///   `[targets]` and `[external]`
    /// - [`GantryError::ManifestValidationError`] for structural issues
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        let mut manifest: Self = toml::from_str(&content).map_err(|e| {
            GantryError::ManifestParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        // Relative source and resource paths resolve against this directory.
        manifest.manifest_dir = Some(
            path.parent()
                .ok_or_else(|| anyhow::anyhow!("Manifest path has no parent directory"))?
                .to_path_buf(),
        );

        manifest.validate()?;

        Ok(manifest)
    }

    /// Validates the manifest structure.
    ///
    /// Dependency references are deliberately not checked here; the resolver
    /// owns that so wire-format graphs get the same treatment as manifests.
    pub fn validate(&self) -> Result<()> {
        for name in self.targets.keys().chain(self.external.keys()) {
            if name.trim().is_empty() {
                return Err(GantryError::ManifestValidationError {
                    reason: "target names must not be empty".to_string(),
                }
                .into());
            }
        }

        // Targets and externals share a namespace
        for name in self.external.keys() {
            if self.targets.contains_key(name) {
                return Err(GantryError::DuplicateTarget {
                    name: name.clone(),
                }
                .into());
            }
        }

        for (name, target) in &self.targets {
            for dep in &target.dependencies {
                if dep.trim().is_empty() {
                    return Err(GantryError::ManifestValidationError {
                        reason: format!("target '{name}' declares an empty dependency name"),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Returns the workspace name, falling back to the manifest directory
    /// name and finally to `"Workspace"`.
    #[must_use]
    pub fn workspace_name(&self) -> String {
        if let Some(name) = &self.workspace.name {
            return name.clone();
        }
        self.manifest_dir
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Workspace".to_string())
    }

    /// Iterates over all declared node names (targets then externals).
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().chain(self.external.keys()).map(String::as_str)
    }

    /// Total number of declared nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.targets.len() + self.external.len()
    }
}

/// Find manifest by searching up directory tree from current directory.
///
/// Searches for `gantry.toml` starting from the current working directory
/// and walking up until found or filesystem root is reached.
///
/// # Examples
///
/// ```rust,no_run
/// use gantry_cli::manifest::find_manifest;
///
/// match find_manifest() {
///     Ok(path) => println!("Found manifest at: {}", path.display()),
///     Err(e) => println!("No manifest found: {}", e),
/// }
/// ```
pub fn find_manifest() -> Result<PathBuf> {
    let current = std::env::current_dir()
        .context("Cannot determine current working directory. This may indicate a permission issue or corrupted filesystem")?;
    find_manifest_from(current)
}

/// Find manifest by searching up from a specific starting directory.
///
/// # Algorithm
///
/// 1. Check for `gantry.toml` in the starting directory
/// 2. If found, return the full path
/// 3. If not found, move to the parent directory
/// 4. Repeat until found or filesystem root reached
pub fn find_manifest_from(start: PathBuf) -> Result<PathBuf> {
    let mut current = start;

    loop {
        let manifest_path = current.join(MANIFEST_FILE);
        if manifest_path.exists() {
            return Ok(manifest_path);
        }

        if !current.pop() {
            return Err(GantryError::ManifestNotFound.into());
        }
    }
}

/// Find the manifest inside an explicitly chosen project directory.
///
/// Unlike [`find_manifest_from`], no upward search happens: pointing Gantry
/// at a directory asserts the manifest lives exactly there.
pub fn find_manifest_in(dir: &Path) -> Result<PathBuf> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        Ok(manifest_path)
    } else {
        Err(GantryError::ManifestNotFound.into())
    }
}

/// Find manifest using an explicit project directory or upward search.
///
/// Uses the explicit directory if provided, otherwise searches upward from
/// the current working directory.
///
/// # Examples
///
/// ```rust,no_run
/// use gantry_cli::manifest::find_manifest_with_optional;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Use explicit project directory
/// let explicit = Some(PathBuf::from("/path/to/project"));
/// let manifest = find_manifest_with_optional(explicit)?;
///
/// // Search from current directory
/// let manifest = find_manifest_with_optional(None)?;
/// # Ok(())
/// # }
/// ```
pub fn find_manifest_with_optional(project_dir: Option<PathBuf>) -> Result<PathBuf> {
    match project_dir {
        Some(dir) => find_manifest_in(&dir),
        None => find_manifest(),
    }
}
