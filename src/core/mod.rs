//! Core types and functionality for Gantry
//!
//! This module forms the foundation of Gantry's type system. It currently hosts
//! the error handling stack shared by every other module: [`GantryError`] for
//! typed failures, [`ErrorContext`] for the suggestion-carrying form the CLI
//! prints, and [`user_friendly_error`] to get from one to the other.
//!
//! Hard failures (bad manifest, unknown target, dependency cycle) surface as
//! [`GantryError`] values and abort the run. Cache storage problems never do;
//! they are modeled separately in [`crate::cache`] and downgraded to misses.
//!
//! # Examples
//!
//! ```rust
//! use gantry_cli::core::{GantryError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(GantryError::ManifestNotFound.into())
//! }
//!
//! match example_operation() {
//!     Ok(result) => println!("Success: {}", result),
//!     Err(e) => {
//!         let friendly = user_friendly_error(e);
//!         friendly.display(); // Shows colored error with suggestions
//!     }
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, GantryError, user_friendly_error};
