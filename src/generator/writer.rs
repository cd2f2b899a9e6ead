//! Default project writer emitting a JSON workspace document
//!
//! The workspace lands as a `<name>.gworkspace` directory containing a
//! single `workspace.json`. Source-built targets carry their glob-expanded
//! file lists; prebuilt targets carry the cache artifact descriptor instead
//! and list no sources at all.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProjectWriting;
use crate::cache::ArtifactDescriptor;
use crate::constants::{WORKSPACE_DOCUMENT, WORKSPACE_EXTENSION};
use crate::focus::{BuildDisposition, FocusedGraph};
use crate::graph::{NodeKind, Platform, TargetNode};
use crate::utils::fs::{atomic_write, ensure_dir};
use crate::utils::platform::normalize_path_for_storage;

/// Location of a generated workspace on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceHandle {
    /// The `<name>.gworkspace` directory
    pub path: PathBuf,
    /// Workspace name, taken from the manifest
    pub name: String,
}

impl WorkspaceHandle {
    /// Path of the workspace document inside the workspace directory.
    pub fn document_path(&self) -> PathBuf {
        self.path.join(WORKSPACE_DOCUMENT)
    }
}

/// How a target is built in the generated workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetDisposition {
    /// Compiled from its sources
    Source,
    /// Replaced by a cached artifact
    Prebuilt,
}

/// One target entry in the workspace document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceTarget {
    pub name: String,
    pub kind: NodeKind,
    pub platform: Platform,
    pub disposition: TargetDisposition,
    /// Concrete source files, relative to the project root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Concrete resource files, relative to the project root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Present exactly when `disposition` is `prebuilt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactDescriptor>,
}

/// Top-level workspace document, one per generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    pub name: String,
    pub generated_at: DateTime<Utc>,
    /// Targets sorted by name
    pub targets: Vec<WorkspaceTarget>,
}

/// Writes workspace documents with source globs expanded against a project
/// root.
#[derive(Debug, Clone)]
pub struct WorkspaceWriter {
    project_root: PathBuf,
}

impl WorkspaceWriter {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    fn render_target(
        &self,
        node: &TargetNode,
        disposition: &BuildDisposition,
    ) -> Result<WorkspaceTarget> {
        let (disposition, artifact, sources, resources) = match disposition {
            BuildDisposition::Source => {
                let sources = expand_patterns(&self.project_root, &node.sources, &node.name)?;
                let resources = expand_patterns(&self.project_root, &node.resources, &node.name)?;
                (TargetDisposition::Source, None, sources, resources)
            }
            BuildDisposition::Prebuilt(descriptor) => (
                TargetDisposition::Prebuilt,
                Some(descriptor.clone()),
                Vec::new(),
                Vec::new(),
            ),
        };

        Ok(WorkspaceTarget {
            name: node.name.clone(),
            kind: node.kind,
            platform: node.platform,
            disposition,
            sources,
            resources,
            settings: node.settings.clone(),
            dependencies: node.dependencies.clone(),
            artifact,
        })
    }
}

impl ProjectWriting for WorkspaceWriter {
    fn write(&self, focused: &FocusedGraph, output_dir: &Path) -> Result<WorkspaceHandle> {
        let name = focused.graph().name().to_string();
        let workspace_dir = output_dir.join(format!("{name}.{WORKSPACE_EXTENSION}"));
        ensure_dir(&workspace_dir)?;

        let mut targets = Vec::new();
        for (node, disposition) in focused.entries() {
            targets.push(self.render_target(node, disposition)?);
        }

        let document = WorkspaceDocument {
            name: name.clone(),
            generated_at: Utc::now(),
            targets,
        };

        let document_path = workspace_dir.join(WORKSPACE_DOCUMENT);
        let json = serde_json::to_string_pretty(&document)?;
        atomic_write(&document_path, json.as_bytes())
            .with_context(|| format!("writing workspace document {}", document_path.display()))?;

        tracing::debug!(
            workspace = %workspace_dir.display(),
            targets = document.targets.len(),
            prebuilt = focused.prebuilt_count(),
            "wrote workspace document"
        );

        Ok(WorkspaceHandle {
            path: workspace_dir,
            name,
        })
    }
}

/// Expands glob patterns against `project_root` into a sorted, deduplicated
/// list of relative file paths. Directories matched by a pattern are
/// skipped; a pattern matching nothing contributes nothing.
fn expand_patterns(project_root: &Path, patterns: &[String], target: &str) -> Result<Vec<String>> {
    let mut files = BTreeSet::new();
    for pattern in patterns {
        let absolute = project_root.join(pattern);
        let matches = glob::glob(&absolute.display().to_string())
            .with_context(|| format!("invalid source pattern '{pattern}' for target '{target}'"))?;
        for entry in matches {
            let path = entry
                .with_context(|| format!("reading files matched by pattern '{pattern}'"))?;
            if path.is_file() {
                let relative = path.strip_prefix(project_root).unwrap_or(&path);
                files.insert(normalize_path_for_storage(relative));
            }
        }
    }
    Ok(files.into_iter().collect())
}
