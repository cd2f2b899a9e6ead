//! Integration test suite for gantry
//!
//! End-to-end tests that drive the compiled `gantry` binary against real
//! projects in temporary directories.
//!
//! Run with:
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Areas
//! - **automation**: Driving graph exports through the automation client
//! - **cli_surface**: Help text, version output, and argument validation
//! - **errors**: Error handling and edge cases
//! - **focus**: Focused generation, pruning, and cache substitution
//! - **generate**: Full workspace generation workflows
//! - **graph_export**: Graph export in JSON and DOT formats

#[path = "../common/mod.rs"]
mod common;

mod automation;
mod cli_surface;
mod errors;
mod focus;
mod generate;
mod graph_export;
