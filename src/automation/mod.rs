//! Client for loading dependency graphs through the export CLI contract
//!
//! Editor integrations and scripts do not link against gantry internals;
//! they drive a binary implementing the export contract instead:
//! `<binary> graph --format json --output-path <dir> [--path <path>]`,
//! which writes `graph.json` into the output directory. [`GraphClient`]
//! wraps one invocation of that contract and parses the result back into a
//! [`Graph`]. The binary defaults to `gantry` on `PATH` and can be
//! overridden with the `GANTRY_BINARY_PATH` environment variable.

use std::path::Path;

use crate::constants::{
    BINARY_PATH_ENV_VAR, GRAPH_EXPORT_FILE, GRAPH_EXPORT_TIMEOUT, NO_PROGRESS_ENV_VAR,
};
use crate::core::GantryError;
use crate::graph::{Graph, WireGraph};
use crate::runner::ProcessCommand;

/// Fallback binary name when `GANTRY_BINARY_PATH` is not set
const DEFAULT_BINARY: &str = "gantry";

/// Drives graph exports through an external binary.
#[derive(Debug, Clone)]
pub struct GraphClient {
    /// The exporter binary to invoke
    binary: String,
}

impl GraphClient {
    /// Creates a client for the binary named by `GANTRY_BINARY_PATH`,
    /// falling back to `gantry` on `PATH`.
    pub fn new() -> Self {
        let binary =
            std::env::var(BINARY_PATH_ENV_VAR).unwrap_or_else(|_| DEFAULT_BINARY.to_string());
        Self { binary }
    }

    /// Creates a client for a specific exporter binary.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Exports the dependency graph of the project at `path` (or the
    /// exporter's working directory when `None`) and parses it.
    ///
    /// The export lands in a temporary directory that is removed once the
    /// graph has been read. Progress output is suppressed in the child so
    /// interleaved spinner frames never corrupt captured streams. An
    /// exporter that exits successfully without writing the export file
    /// maps to [`GantryError::GraphExportMissing`].
    pub async fn load_graph(&self, path: Option<&Path>) -> Result<Graph, GantryError> {
        let export_dir = tempfile::tempdir()?;

        let mut command = ProcessCommand::new(&self.binary)
            .args(["graph", "--format", "json", "--output-path"])
            .arg(export_dir.path().display().to_string())
            .env(NO_PROGRESS_ENV_VAR, "1")
            .with_timeout(Some(GRAPH_EXPORT_TIMEOUT))
            .with_context("graph export");
        if let Some(project) = path {
            command = command.arg("--path").arg(project.display().to_string());
        }
        command.execute_success().await?;

        let export_path = export_dir.path().join(GRAPH_EXPORT_FILE);
        let contents = match tokio::fs::read_to_string(&export_path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(GantryError::GraphExportMissing {
                    path: export_path.display().to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        WireGraph::from_json(&contents)?.into_graph()
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}
