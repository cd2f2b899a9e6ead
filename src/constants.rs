//! Global constants used throughout the Gantry codebase.
//!
//! File names, environment variable names, timeouts, and tuning knobs that
//! more than one module reads.

use std::time::Duration;

/// Name of the project manifest file that declares targets and externals.
pub const MANIFEST_FILE: &str = "gantry.toml";

/// Extension of the generated workspace bundle directory.
pub const WORKSPACE_EXTENSION: &str = "gworkspace";

/// Name of the workspace document written inside the bundle.
pub const WORKSPACE_DOCUMENT: &str = "workspace.json";

/// File name used when exporting the dependency graph as JSON.
pub const GRAPH_EXPORT_FILE: &str = "graph.json";

/// File name used when exporting the dependency graph in DOT format.
pub const DOT_EXPORT_FILE: &str = "graph.dot";

/// Environment variable that overrides the user configuration path.
pub const CONFIG_ENV_VAR: &str = "GANTRY_CONFIG";

/// Environment variable that suppresses progress indicators when set.
pub const NO_PROGRESS_ENV_VAR: &str = "GANTRY_NO_PROGRESS";

/// Environment variable that points automation clients at a specific
/// `gantry` executable instead of resolving one from `PATH`.
pub const BINARY_PATH_ENV_VAR: &str = "GANTRY_BINARY_PATH";

/// Name of the cache profile bootstrapped when no configuration file exists.
pub const BOOTSTRAP_PROFILE_NAME: &str = "development";

/// Build configuration recorded for the bootstrapped cache profile.
pub const BOOTSTRAP_PROFILE_CONFIGURATION: &str = "debug";

/// Default timeout applied to subprocesses spawned by the runner (5 minutes).
///
/// Applies unless a caller overrides it. Long enough for a slow opener or
/// export on a loaded machine, short enough that a hung child does not block
/// a session indefinitely.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for a `gantry graph` export spawned by an automation client
/// (2 minutes).
pub const GRAPH_EXPORT_TIMEOUT: Duration = Duration::from_secs(120);

/// Cap on the delay between cache read retries (500ms).
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Delay before the first cache read retry (10ms); doubles per attempt up
/// to [`MAX_BACKOFF_DELAY_MS`].
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// Number of times a transient cache read error is retried before it is
/// reported to the caller.
pub const CACHE_READ_RETRIES: u32 = 2;

/// Minimum number of parallel fingerprint and lookup operations
/// regardless of CPU count.
pub const MIN_PARALLELISM: usize = 4;

/// Core count assumed when `std::thread::available_parallelism()` fails.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Default parallelism for fingerprint hashing and cache lookups.
///
/// Fingerprint hashing is CPU-bound, so the default tracks the core count
/// rather than multiplying it, with [`MIN_PARALLELISM`] as the floor.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(FALLBACK_CORE_COUNT)
        .max(MIN_PARALLELISM)
}
