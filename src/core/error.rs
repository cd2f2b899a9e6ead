//! Error types and terminal error reporting.
//!
//! Gantry keeps two layers of errors. [`GantryError`] enumerates everything that can
//! fail while loading a manifest, building the dependency graph, focusing it against
//! the cache, or driving a subprocess; modules return it (plain or wrapped in
//! [`anyhow::Error`] with context) up to the binary. At the top, [`user_friendly_error`]
//! turns whatever arrived into an [`ErrorContext`] that pairs the message with a
//! suggestion the user can act on and prints it in color via [`ErrorContext::display`].
//!
//! Cache storage failures are absent from this enum: a corrupt or unreadable cache
//! entry must degrade to a miss rather than fail the run, so the cache layer carries
//! its own soft error type (see [`crate::cache::CacheError`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use gantry_cli::core::{GantryError, user_friendly_error};
//!
//! fn focus() -> Result<(), GantryError> {
//!     Err(GantryError::UnknownTarget {
//!         name: "App".to_string(),
//!     })
//! }
//!
//! if let Err(e) = focus() {
//!     user_friendly_error(anyhow::Error::from(e)).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Everything that can fail during a Gantry run.
///
/// Variants carry the names and paths a user needs to locate the problem. The
/// Display strings are the exact text the CLI prints on stderr, so they stay
/// stable across releases.
#[derive(Error, Debug)]
pub enum GantryError {
    /// A target or external name is declared more than once
    ///
    /// Target and external names share a single namespace; the dependency graph
    /// cannot hold two nodes with the same name.
    #[error("Target '{name}' is declared more than once in the manifest")]
    DuplicateTarget {
        /// The name that was declared twice
        name: String,
    },

    /// A graph operation referenced a node that does not exist
    ///
    /// This is an internal consistency error: graph edges and traversals may
    /// only name nodes that were previously added.
    #[error("Unknown node '{name}' in dependency graph")]
    UnknownNode {
        /// The node name that could not be found
        name: String,
    },

    /// A declared dependency does not match any target or external
    #[error("Unknown dependency '{name}' required by '{required_by}'")]
    UnknownDependency {
        /// Name of the dependency that could not be resolved
        name: String,
        /// Name of the node that declared the dependency
        required_by: String,
    },

    /// Circular dependency detected in the dependency graph
    ///
    /// Targets that depend on each other in a cycle can be neither
    /// fingerprinted nor generated.
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CycleDetected {
        /// The node names forming the cycle, entry node repeated at the end
        /// (e.g. `["A", "B", "A"]`)
        cycle: Vec<String>,
    },

    /// A focus request named a target that is not declared in the manifest
    #[error("Target '{name}' is not declared in the manifest")]
    UnknownTarget {
        /// The requested target name
        name: String,
    },

    /// The requested cache profile is not defined in the configuration
    #[error("Cache profile '{name}' is not defined in the configuration")]
    UnknownProfile {
        /// The profile name that could not be found
        name: String,
    },

    /// No cache profile was selected and the configuration has no default
    #[error("No cache profile selected and the configuration does not set a default")]
    NoDefaultProfile,

    /// Manifest file (gantry.toml) not found
    ///
    /// The search starts in the working directory and walks up the directory
    /// tree, the same way git locates .git.
    #[error("Manifest file gantry.toml not found in current directory or any parent directory")]
    ManifestNotFound,

    /// The manifest exists but is not valid TOML
    #[error("Invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// The file that failed to parse
        file: String,
        /// Parser message describing the failure
        reason: String,
    },

    /// The manifest parsed but its contents are inconsistent
    #[error("Manifest validation failed: {reason}")]
    ManifestValidationError {
        /// What the validation pass rejected
        reason: String,
    },

    /// The configuration file is malformed or self-contradictory
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// An explicitly requested configuration file is missing
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was requested
        path: String,
    },

    /// A subprocess executable could not be located
    #[error("Command '{command}' is not installed or not found in PATH")]
    CommandNotFound {
        /// The executable that could not be located
        command: String,
    },

    /// A subprocess exited with a non-zero status code
    #[error("Command '{command}' exited with code {code}: {stderr}")]
    CommandExited {
        /// The executable that was run
        command: String,
        /// The non-zero exit code
        code: i32,
        /// Captured standard error output
        stderr: String,
    },

    /// A subprocess was terminated by a signal before it could exit
    #[error("Command '{command}' was terminated by signal {signal}: {stderr}")]
    CommandSignalled {
        /// The executable that was run
        command: String,
        /// The signal number that terminated the process
        signal: i32,
        /// Captured standard error output
        stderr: String,
    },

    /// A subprocess did not finish within its timeout
    #[error("Command '{command}' timed out after {seconds} seconds")]
    CommandTimedOut {
        /// The executable that was run
        command: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// A graph export finished but the expected output file is missing
    #[error("Graph export did not produce {path}")]
    GraphExportMissing {
        /// The file the export was expected to write
        path: String,
    },

    /// Passthrough for raw IO failures
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Passthrough for JSON encode and decode failures
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A failure with no dedicated variant
    #[error("{message}")]
    Other {
        /// Preformatted message shown verbatim
        message: String,
    },
}

/// A [`GantryError`] plus the advice the CLI prints alongside it.
///
/// The binary never shows a bare error. [`user_friendly_error`] wraps each one
/// in an `ErrorContext`, attaching an optional suggestion (what to do next) and
/// optional details (why it happened), and [`display`](Self::display) renders
/// all three to stderr with color.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Gantry error
    pub error: GantryError,
    /// Next step the user can take, when one is known
    pub suggestion: Option<String>,
    /// Background on the failure, when it helps
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion or details attached yet.
    #[must_use]
    pub const fn new(error: GantryError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a next step the user can take.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach background on why the error occurred.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr.
    ///
    /// The error line is red and bold, details yellow, and the suggestion
    /// green. Details and suggestion lines are skipped when absent.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {details}", "details".yellow());
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {suggestion}", "suggestion".green());
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] ready for terminal display.
///
/// Typed [`GantryError`]s get a suggestion matched to the variant. Raw IO and
/// TOML errors that escaped without a typed wrapper get filesystem and syntax
/// hints respectively. Everything else passes through with its context chain
/// flattened into the message so nested failures stay visible.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Downcasting by value hands the variant back owned, context layers and all.
    let error = match error.downcast::<GantryError>() {
        Ok(gantry) => return annotate(gantry),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let reported = format!("The operating system reported: {io_error}");
        let ctx = ErrorContext::new(GantryError::Other {
            message: error.to_string(),
        });
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => ctx
                .with_suggestion(
                    "Check the permissions on the project directory and the cache root",
                )
                .with_details(reported),
            std::io::ErrorKind::NotFound => ctx
                .with_suggestion(
                    "Verify the path exists, or pass --path to run against a different project directory",
                )
                .with_details(reported),
            _ => ctx.with_details(reported),
        };
    }

    if let Some(parse_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(GantryError::ManifestParseError {
            file: crate::constants::MANIFEST_FILE.to_string(),
            reason: parse_error.to_string(),
        })
        .with_suggestion("Fix the TOML syntax; the parser message points at the offending line");
    }

    let mut message = error.to_string();
    for (depth, cause) in error.chain().skip(1).enumerate() {
        if depth == 0 {
            message.push_str("\n\nCaused by:");
        }
        message.push_str(&format!("\n  {}: {cause}", depth + 1));
    }

    ErrorContext::new(GantryError::Other {
        message,
    })
}

/// Attach the suggestion and details that belong to a typed error.
///
/// The advice lives in one table so the CLI gives the same guidance no matter
/// which module surfaced the error. Variants without an entry are shown as-is.
fn annotate(error: GantryError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        GantryError::ManifestNotFound => (
            Some("Create a gantry.toml manifest in your project root, or pass --path to point at a project that has one".into()),
            Some("Gantry looks for gantry.toml in the current directory and parent directories up to the filesystem root".into()),
        ),

        GantryError::ManifestParseError { file, .. } => (
            Some(format!(
                "Check {file} for TOML mistakes such as unquoted strings or an unclosed bracket"
            )),
            None,
        ),

        GantryError::DuplicateTarget { name } => (
            Some(format!(
                "Remove or rename one of the '{name}' declarations in gantry.toml"
            )),
            Some("Target and external names share a single namespace in the dependency graph".into()),
        ),

        GantryError::UnknownDependency { name, required_by } => (
            Some(format!(
                "Declare '{name}' as a target or external in gantry.toml, or remove it from the dependencies of '{required_by}'"
            )),
            Some("Every entry in a dependencies list must name another declared target or external".into()),
        ),

        GantryError::UnknownTarget { name } => (
            Some(format!(
                "Run 'gantry graph' to list the declared targets and check the spelling of '{name}'"
            )),
            Some("Focused generation only accepts targets that are declared in the manifest".into()),
        ),

        GantryError::CycleDetected { cycle } => (
            Some("Review the dependency graph and break the cycle".into()),
            Some(format!(
                "Dependency cycle: {}. Targets cannot depend on themselves directly or indirectly",
                cycle.join(" -> ")
            )),
        ),

        GantryError::UnknownProfile { name } => (
            Some(format!(
                "Define [cache.profiles.{name}] in your configuration, or pass --profile with a profile that exists"
            )),
            Some("Cache profiles map a name to a build configuration; artifacts are cached per profile".into()),
        ),

        GantryError::NoDefaultProfile => (
            Some("Pass --profile <name> or set cache.default_profile in your configuration".into()),
            Some("Generation needs a cache profile to know which artifact namespace to consult".into()),
        ),

        GantryError::CommandNotFound { command } => (
            Some(format!(
                "Install '{command}' or make sure it is available in your PATH"
            )),
            Some("Gantry spawns external commands for workspace opening and graph exports".into()),
        ),

        GantryError::CommandExited { command, .. } => (
            Some(format!(
                "Run '{command}' manually to reproduce the failure, or re-run gantry with --verbose"
            )),
            Some("The captured stderr above usually names the underlying problem".into()),
        ),

        GantryError::ConfigNotFound { path } => (
            Some("Check the path passed via --config or the GANTRY_CONFIG environment variable".into()),
            Some(format!("No configuration file exists at {path}")),
        ),

        _ => (None, None),
    };

    ErrorContext {
        error,
        suggestion,
        details,
    }
}
