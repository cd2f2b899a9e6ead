//! Generation orchestrator: resolve, focus, write
//!
//! [`Generator::generate`] drives one generation run end to end. The
//! manifest is resolved into a validated graph, the graph is focused onto
//! the requested source targets with cache substitution applied, and only
//! then is the project writer invoked. Resolution and focus errors abort
//! the run before anything is written; writer errors propagate unchanged.
//! The whole sequence is timed for reporting.

pub mod opener;
pub mod writer;

pub use opener::open_workspace;
pub use writer::{
    TargetDisposition, WorkspaceDocument, WorkspaceHandle, WorkspaceTarget, WorkspaceWriter,
};

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::constants::default_parallelism;
use crate::focus::{FocusEngine, FocusedGraph};
use crate::manifest::Manifest;
use crate::resolver::GraphResolver;

/// Options controlling a single generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Requested source targets; empty generates the whole graph
    pub sources: Vec<String>,
    /// Cache profile name; `None` selects the configured default
    pub profile: Option<String>,
    /// Skip cache substitution entirely
    pub ignore_cache: bool,
    /// Directory the workspace is written into
    pub output_dir: PathBuf,
}

/// Emits a focused graph as IDE-consumable project files.
///
/// Writer failures are opaque to the generation core; they bubble out of
/// [`Generator::generate`] exactly as returned here.
pub trait ProjectWriting {
    fn write(&self, focused: &FocusedGraph, output_dir: &Path) -> Result<WorkspaceHandle>;
}

/// Drives resolution, focusing, and writing for one generation run.
pub struct Generator<S, W> {
    store: S,
    writer: W,
    max_parallel: usize,
}

impl<S: CacheStore, W: ProjectWriting> Generator<S, W> {
    pub fn new(store: S, writer: W) -> Self {
        Self {
            store,
            writer,
            max_parallel: default_parallelism(),
        }
    }

    /// Caps concurrent fingerprint computation and cache lookups.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Runs one generation and returns the workspace handle together with
    /// the wall-clock duration of the run.
    pub async fn generate(
        &self,
        manifest: &Manifest,
        config: &Config,
        options: &GenerateOptions,
    ) -> Result<(WorkspaceHandle, Duration)> {
        let started = Instant::now();

        let resolution =
            GraphResolver::new(manifest, config).resolve(options.profile.as_deref())?;

        let focused = FocusEngine::new(&self.store, &resolution.profile)
            .with_max_parallel(self.max_parallel)
            .focus(&resolution.graph, &options.sources, options.ignore_cache)
            .await?;

        tracing::debug!(
            targets = focused.graph().node_count(),
            prebuilt = focused.prebuilt_count(),
            source = focused.source_count(),
            profile = %resolution.profile.name,
            "focused graph ready"
        );

        let handle = self.writer.write(&focused, &options.output_dir)?;

        let elapsed = started.elapsed();
        tracing::debug!(
            workspace = %handle.path.display(),
            "generation finished in {:.3}s",
            elapsed.as_secs_f64()
        );
        Ok((handle, elapsed))
    }
}
