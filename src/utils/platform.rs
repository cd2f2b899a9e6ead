//! Platform differences, collected in one place.
//!
//! Configuration values may point at the cache root with `~/` or `$VAR`
//! references; [`resolve_path`] expands both. Fingerprints must not vary by
//! platform, so [`normalize_path_for_storage`] rewrites paths to one canonical
//! string form before they are hashed or serialized. The remaining helpers
//! cover home directory lookup, the desktop opener binary, and Windows path
//! length limits.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Compile-time check for Windows targets.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// The current user's home directory.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Home directory not found; set {} and try again",
            if is_windows() { "USERPROFILE" } else { "HOME" }
        )
    })
}

/// Returns the command used to open a generated workspace in the desktop
/// environment's associated application.
///
/// # Returns
///
/// - `"open"` on macOS
/// - `"explorer"` on Windows
/// - `"xdg-open"` on other Unix-like systems
#[must_use]
pub const fn opener_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Expand `$VAR` references and a leading `~/` in a configured path.
///
/// A reference to an environment variable that is not set is an error rather
/// than a literal; a cache root that silently lands in a directory named
/// `$GANTRY_CACHE` is much harder to debug than a message. Only `~/` and a
/// bare `~` are supported, not `~user`.
///
/// # Examples
///
/// ```rust,no_run
/// use gantry_cli::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let cache_root = resolve_path("~/.gantry/cache")?;
/// let config = resolve_path("$HOME/.gantry/config.toml")?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::env(path).map_err(|lookup| {
        anyhow::anyhow!(
            "Undefined environment variable ${} in path: {path}",
            lookup.var_name
        )
    })?;

    if expanded == "~" {
        return get_home_dir();
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        return Ok(get_home_dir()?.join(rest));
    }
    if expanded.starts_with('~') {
        anyhow::bail!(
            "Cannot expand '{expanded}': per-user tilde paths are not supported, use '~/' or an absolute path"
        );
    }

    Ok(PathBuf::from(expanded.into_owned()))
}

/// Normalizes a path to a stable string form for hashing and storage.
///
/// Windows extended-length prefixes are stripped and all separators become
/// forward slashes so the same tree produces the same strings on every
/// platform.
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let raw = path.as_ref().to_string_lossy();

    let cleaned = match (raw.strip_prefix(r"\\?\UNC\"), raw.strip_prefix(r"\\?\")) {
        (Some(unc), _) => format!(r"\\{unc}"),
        (None, Some(local)) => local.to_string(),
        (None, None) => raw.into_owned(),
    };

    cleaned.replace('\\', "/")
}

/// Converts long paths to Windows extended-length form when necessary.
///
/// Paths over 260 characters get the `\\?\` prefix so standard file APIs
/// can operate on them.
#[cfg(windows)]
#[must_use]
pub fn windows_long_path(path: &Path) -> PathBuf {
    const MAX_PATH: usize = 260;

    let raw = path.to_string_lossy();
    if raw.len() <= MAX_PATH || raw.starts_with(r"\\?\") {
        return path.to_path_buf();
    }

    // The extended-length prefix requires an absolute path.
    let absolute = if path.is_relative() {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    } else {
        path.to_path_buf()
    };

    let text = absolute.to_string_lossy();
    match text.strip_prefix(r"\\") {
        Some(unc) => PathBuf::from(format!(r"\\?\UNC\{unc}")),
        None => PathBuf::from(format!(r"\\?\{text}")),
    }
}

/// On non-Windows platforms paths pass through untouched.
#[cfg(not(windows))]
#[must_use]
pub fn windows_long_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
