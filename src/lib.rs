//! Gantry - workspace generation from declarative manifests
//!
//! Gantry turns a `gantry.toml` manifest describing targets, dependencies,
//! and build settings into an IDE-consumable workspace. It supports focused
//! generation (only a requested subset of targets and their transitive
//! dependencies) and substitutes prebuilt artifacts from a fingerprint-keyed
//! cache for targets outside the focus, so large projects open and build
//! fast.
//!
//! # Architecture Overview
//!
//! A generation run flows through a fixed pipeline:
//! - `gantry.toml` is parsed and validated into a [`manifest::Manifest`]
//! - the [`resolver`] turns the manifest into a directed acyclic
//!   [`graph::Graph`] of buildable targets and resolves the cache profile
//! - the [`focus`] engine prunes the graph to the requested targets plus
//!   their transitive dependencies and, per candidate, asks the [`cache`]
//!   for an artifact matching the target's [`graph::Fingerprint`]
//! - the [`generator`] hands the focused graph to a project writer that
//!   materializes the workspace on disk
//!
//! ## Key Properties
//!
//! - **Deterministic**: identical manifests produce identical graphs,
//!   fingerprints, and workspace documents, independent of declaration order
//! - **Fail-fast**: unknown dependencies, cycles, and unknown targets abort
//!   before anything is written
//! - **Cache-soft**: a broken or unreachable cache entry downgrades to a
//!   source build, never a failed generation
//! - **Cross-platform**: path handling and process spawning work on
//!   Windows, macOS, and Linux
//!
//! # Core Modules
//!
//! ## Generation Pipeline
//! - [`manifest`] - Manifest parsing and validation (gantry.toml)
//! - [`resolver`] - Graph construction, dependency checking, profile
//!   resolution
//! - [`graph`] - Graph model, fingerprint engine, and wire format
//! - [`focus`] - Focused-subgraph computation and cache substitution
//! - [`generator`] - Generation orchestration and the workspace writer
//!
//! ## Cache
//! - [`cache`] - Artifact store keyed by fingerprint and cache profile
//!
//! ## Integration
//! - [`automation`] - Client for the graph-export CLI contract
//! - [`runner`] - External command execution with timeouts
//! - [`cli`] - Command-line interface (`generate`, `graph`)
//!
//! ## Supporting Modules
//! - [`config`] - Configuration file and cache profiles
//! - [`core`] - Error types and user-facing error contexts
//! - [`utils`] - Cross-platform utilities, file operations, progress bars
//!
//! # Manifest Format (gantry.toml)
//!
//! ```toml
//! [workspace]
//! name = "Shop"
//!
//! [targets.App]
//! kind = "application"
//! platform = "ios"
//! sources = ["App/Sources/**/*.swift"]
//! resources = ["App/Assets/**"]
//! dependencies = ["UI", "Net"]
//!
//! [targets.UI]
//! kind = "framework"
//! sources = ["UI/Sources/**/*.swift"]
//! dependencies = ["Core"]
//!
//! [targets.Net]
//! kind = "framework"
//! sources = ["Net/Sources/**/*.swift"]
//! dependencies = ["Core"]
//!
//! [targets.Core]
//! kind = "static-library"
//! sources = ["Core/Sources/**/*.swift"]
//!
//! [external.Analytics]
//! dependencies = []
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Generate the full workspace
//! gantry generate
//!
//! # Focused generation: App plus its dependencies, cached where possible
//! gantry generate App
//!
//! # Force source builds everywhere
//! gantry generate App --ignore-cache
//!
//! # Export the dependency graph for tooling
//! gantry graph --format json --output-path ./exports
//! ```

// Generation pipeline
pub mod focus;
pub mod generator;
pub mod graph;
pub mod manifest;
pub mod resolver;

// Cache
pub mod cache;

// Integration
pub mod automation;
pub mod cli;
pub mod runner;

// Supporting modules
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
