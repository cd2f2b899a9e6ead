//! Opens a generated workspace with the platform's default handler

use std::path::Path;

use crate::runner::ProcessCommand;
use crate::utils::platform::opener_command;

/// Opens `path` with the platform opener (`open`, `xdg-open`, or `explorer`).
///
/// By the time this runs the workspace on disk is complete; a missing or
/// failing opener is logged as a warning and otherwise ignored.
pub async fn open_workspace(path: &Path) {
    open_with(opener_command(), path).await;
}

async fn open_with(opener: &str, path: &Path) {
    if which::which(opener).is_err() {
        tracing::warn!("Opener '{opener}' not found in PATH, leaving the workspace closed");
        return;
    }

    let result = ProcessCommand::new(opener)
        .arg(path.display().to_string())
        .with_context("opening workspace")
        .execute_success()
        .await;
    if let Err(err) = result {
        tracing::warn!("Could not open workspace {}: {}", path.display(), err);
    }
}
