//! Gantry CLI entry point
//!
//! Parses arguments, runs the selected command, and renders any failure as
//! a colored error with a suggestion before exiting non-zero.
//!
//! Available commands:
//! - `generate` - Generate an IDE workspace from gantry.toml, optionally
//!   focused on a subset of targets with cache substitution
//! - `graph` - Export the resolved dependency graph as JSON or DOT

use anyhow::Result;
use clap::Parser;
use gantry_cli::cli;
use gantry_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // ANSI colors need an explicit opt-in on Windows consoles.
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
