//! Command-line interface for gantry.
//!
//! Each command is implemented as a separate module with its own argument
//! structure and execution logic:
//!
//! - `generate` - Resolve the manifest and write an IDE workspace, with
//!   focused generation and cache substitution
//! - `graph` - Export the resolved dependency graph as JSON or DOT
//!
//! # Typical Invocations
//!
//! ```bash
//! # Generate the full workspace
//! gantry generate
//!
//! # Focused generation: only App and its dependencies, cached where possible
//! gantry generate App
//!
//! # Focused generation against a named cache profile, building everything
//! gantry generate App --profile release --ignore-cache
//!
//! # Export the dependency graph for tooling
//! gantry graph --format json --output-path ./exports
//! ```
//!
//! # Global Options
//!
//! Every subcommand accepts:
//! - `--verbose` / `--quiet` - Raise the log level to debug, or silence it
//! - `--path` - Project directory containing gantry.toml
//! - `--no-progress` - Skip spinners, for scripts and CI logs
//! - `--config` - Configuration file to use instead of the default

mod generate;
mod graph;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::{CONFIG_ENV_VAR, NO_PROGRESS_ENV_VAR};

/// Process-level settings derived from the global flags.
///
/// Everything here is ultimately applied as environment variables, which
/// keeps environment mutation in one place and lets tests inject settings
/// without parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for the tracing filter.
    ///
    /// When `None` (quiet mode) no subscriber is installed and nothing is
    /// logged; errors still reach the user through the main error handler.
    pub log_level: Option<String>,

    /// Suppresses spinners and animated output when set.
    pub no_progress: bool,

    /// Custom path to the configuration file, overriding the default
    /// location.
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Defaults: info-level logging, progress on, standard config lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Export the settings as environment variables.
    ///
    /// Called once at the start of CLI execution, before any threads are
    /// spawned; the rest of the process reads these variables instead of
    /// threading the configuration through every call site.
    pub fn apply_to_env(&self) {
        if self.no_progress {
            unsafe { std::env::set_var(NO_PROGRESS_ENV_VAR, "1") };
        }

        if let Some(ref path) = self.config_path {
            unsafe { std::env::set_var(CONFIG_ENV_VAR, path) };
        }
    }
}

/// Top-level command-line interface.
///
/// Global options are available to all subcommands; `--verbose` and
/// `--quiet` are mutually exclusive and map onto the tracing filter level.
#[derive(Parser)]
#[command(
    name = "gantry",
    about = "Generate IDE workspaces from declarative manifests",
    version,
    author,
    long_about = "Gantry resolves the dependency graph declared in gantry.toml and \
                  materializes it as an IDE-consumable workspace, substituting cached \
                  build artifacts for targets outside the focused set."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug-level logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to a custom configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the project directory containing gantry.toml
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Disable progress bars and spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate the workspace, optionally focused on a subset of targets.
    ///
    /// See [`generate::GenerateCommand`] for detailed options and behavior.
    Generate(generate::GenerateCommand),

    /// Export the resolved dependency graph.
    ///
    /// See [`graph::GraphCommand`] for detailed options and behavior.
    Graph(graph::GraphCommand),
}

impl Cli {
    /// Execute the CLI with configuration built from the parsed arguments.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Derive the [`CliConfig`] the parsed flags ask for.
    ///
    /// Verbose mode selects "debug", quiet mode disables logging entirely,
    /// and the default is "info". Mutual exclusion of `--verbose` and
    /// `--quiet` is enforced by the parser.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with a specific configuration.
    ///
    /// Applies the configuration to the environment, installs the tracing
    /// subscriber, and dispatches to the selected subcommand.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();
        init_logging(&config);

        match self.command {
            Commands::Generate(cmd) => cmd.execute_from_path(self.path).await,
            Commands::Graph(cmd) => cmd.execute_from_path(self.path).await,
        }
    }
}

/// Install the global tracing subscriber for this process.
///
/// `RUST_LOG` takes precedence over the CLI-derived level so targeted
/// filters like `RUST_LOG=process=trace` keep working. Logs go to stderr;
/// stdout is reserved for command output.
fn init_logging(config: &CliConfig) {
    let Some(ref level) = config.log_level else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
