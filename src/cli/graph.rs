//! Dependency graph export command
//!
//! `gantry graph` resolves and validates the manifest's dependency graph
//! and writes it to disk, either as the machine-readable `graph.json`
//! consumed by automation clients or as a Graphviz `graph.dot` rendering.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::config::Config;
use crate::constants::{DOT_EXPORT_FILE, GRAPH_EXPORT_FILE};
use crate::graph::{WireGraph, wire};
use crate::manifest::{Manifest, find_manifest_with_optional};
use crate::resolver::GraphResolver;
use crate::utils::fs::{ensure_dir, safe_write};
use crate::utils::progress::spinner_with_message;

/// Output format for graph exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Machine-readable JSON document (`graph.json`)
    Json,
    /// Graphviz DOT rendering (`graph.dot`)
    Dot,
}

/// Export the resolved dependency graph.
#[derive(Args)]
pub struct GraphCommand {
    /// Export format
    #[arg(long, value_enum, default_value = "json")]
    format: GraphFormat,

    /// Directory to write the export into (defaults to the working directory)
    #[arg(long, value_name = "DIR")]
    output_path: Option<PathBuf>,
}

impl GraphCommand {
    /// Export the graph of the project at `path`, or of the project found
    /// by upward search from the working directory.
    pub async fn execute_from_path(self, path: Option<PathBuf>) -> Result<()> {
        let manifest_path = find_manifest_with_optional(path)?;
        let manifest = Manifest::load(&manifest_path)?;
        let config = Config::load().await?;

        let pb = spinner_with_message("Resolving dependency graph...");
        let graph = GraphResolver::new(&manifest, &config).build_graph();
        pb.finish_and_clear();
        let graph = graph?;

        let output_dir = match self.output_path {
            Some(dir) => dir,
            None => std::env::current_dir()
                .context("Cannot determine current working directory")?,
        };
        ensure_dir(&output_dir)?;

        let export_path = match self.format {
            GraphFormat::Json => {
                let document = WireGraph::from_graph(&graph).to_json()?;
                let path = output_dir.join(GRAPH_EXPORT_FILE);
                safe_write(&path, &format!("{document}\n"))?;
                path
            }
            GraphFormat::Dot => {
                let path = output_dir.join(DOT_EXPORT_FILE);
                safe_write(&path, &wire::to_dot(&graph))?;
                path
            }
        };

        println!("Graph exported to {}", export_path.display());
        Ok(())
    }
}
