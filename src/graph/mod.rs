//! Dependency graph model, node fingerprinting, and export formats.
//!
//! Everything downstream of manifest parsing works against this module: the
//! resolver produces a [`Graph`], the fingerprint engine derives cache keys
//! from it, and the wire module serializes it for the `graph` command and
//! the automation client.

pub mod fingerprint;
pub mod model;
pub mod wire;

pub use fingerprint::{Fingerprint, FingerprintEngine};
pub use model::{Graph, NodeKind, Platform, TargetNode};
pub use wire::WireGraph;
