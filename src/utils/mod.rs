//! Shared helpers behind the generator: filesystem writes, platform
//! differences, and terminal progress.
//!
//! # Modules
//!
//! - [`fs`] - Atomic writes for workspace documents and graph exports
//! - [`platform`] - Path expansion, normalization, and the desktop opener
//! - [`progress`] - Progress spinners for long-running operations
//! - [`text`] - Name-similarity scoring for "closest declared name" hints
//!
//! The most commonly used items are re-exported here so call sites can write
//! `utils::atomic_write` instead of spelling out the submodule.

pub mod fs;
pub mod platform;
pub mod progress;
pub mod text;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use platform::{
    get_home_dir, is_windows, normalize_path_for_storage, opener_command, resolve_path,
};
pub use progress::ProgressBar;
pub use text::similar_names;
