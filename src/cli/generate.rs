//! Workspace generation command
//!
//! `gantry generate [TARGETS]...` resolves the manifest, focuses the graph
//! on the requested targets (all of them when none are named), substitutes
//! cached artifacts for unfocused dependencies, and writes the workspace.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cache::LocalCacheStore;
use crate::config::Config;
use crate::generator::{GenerateOptions, Generator, WorkspaceWriter, open_workspace};
use crate::manifest::{Manifest, find_manifest_with_optional};
use crate::utils::progress::spinner_with_message;

/// Generate an IDE workspace from the manifest.
#[derive(Args)]
pub struct GenerateCommand {
    /// Targets to focus on; generates the whole graph when omitted
    #[arg(value_name = "TARGETS")]
    sources: Vec<String>,

    /// Cache profile to resolve artifacts against
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Skip cache lookups and keep every target a source build
    #[arg(long)]
    ignore_cache: bool,

    /// Do not open the generated workspace
    #[arg(long)]
    no_open: bool,

    /// Directory to write the workspace into (defaults to the project root)
    #[arg(long, value_name = "DIR")]
    output_path: Option<PathBuf>,
}

impl GenerateCommand {
    /// Run generation for the project at `path`, or the project found by
    /// upward search from the working directory.
    pub async fn execute_from_path(self, path: Option<PathBuf>) -> Result<()> {
        let manifest_path = find_manifest_with_optional(path)?;
        let project_dir = manifest_path
            .parent()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let manifest = Manifest::load(&manifest_path)?;
        let config = Config::load().await?;

        let store = LocalCacheStore::new(config.cache_root()?);
        let writer = WorkspaceWriter::new(&project_dir);
        let generator = Generator::new(store, writer);

        let options = GenerateOptions {
            sources: self.sources,
            profile: self.profile,
            ignore_cache: self.ignore_cache,
            output_dir: self.output_path.unwrap_or_else(|| project_dir.clone()),
        };

        let pb = spinner_with_message("Generating workspace...");
        let outcome = generator.generate(&manifest, &config, &options).await;
        pb.finish_and_clear();
        let (handle, elapsed) = outcome?;

        println!("\n{}", "Project generated.".green().bold());
        println!("  Workspace at {}", handle.path.display());

        if !self.no_open {
            open_workspace(&handle.path).await;
        }

        println!("Total time taken: {:.3}s", elapsed.as_secs_f64());
        Ok(())
    }
}
