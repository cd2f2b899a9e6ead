//! Test utilities for gantry
//!
//! This module provides helpers for writing tests: fixtures for manifests
//! and configuration files, direct cache seeding, and logging setup that
//! cooperates with `cargo test` output capture.
//!
//! # Test Isolation
//!
//! Fixtures write into caller-provided directories (usually a `TempDir`),
//! and cache entries are seeded at the exact path the store reads from, so
//! tests never touch the real user cache.

pub mod fixtures;

pub use fixtures::{ConfigFixture, ManifestFixture, descriptor, seed_cache_entry};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Route tracing output through the test writer, at most once per process.
///
/// Passing a level turns logging on at that level; passing `None` defers to
/// `RUST_LOG`, and when that is unset too no subscriber is installed at all.
/// Repeat calls are no-ops, so every test can call this unconditionally.
///
/// ```bash
/// RUST_LOG=gantry_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = match level {
            Some(level) => EnvFilter::new(level.to_string()),
            None if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
            None => return,
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
