//! Terminal spinners for long-running steps.
//!
//! Resolution and generation have no meaningful item count, so the CLI shows a
//! spinner rather than a bar. Setting `GANTRY_NO_PROGRESS` swaps in a hidden
//! spinner that accepts every call and draws nothing, which keeps captured
//! output stable in scripts and tests.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use std::time::Duration;

use crate::constants::NO_PROGRESS_ENV_VAR;

/// Animation interval for visible spinners.
const TICK_EVERY: Duration = Duration::from_millis(100);

fn progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV_VAR).is_ok()
}

/// A spinner shown while a generation step runs.
///
/// Wraps `indicatif` with the crate's one style and the `GANTRY_NO_PROGRESS`
/// switch. A spinner left unfinished stays on screen, so callers pair each
/// constructor with [`finish_and_clear`](Self::finish_and_clear).
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Starts a spinner, or a hidden one when progress is disabled.
    ///
    /// Visible spinners animate on their own every 100ms until finished.
    pub fn new_spinner() -> Self {
        let inner = if progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap(),
            );
            bar.enable_steady_tick(TICK_EVERY);
            bar
        };
        Self {
            inner,
        }
    }

    /// Sets the message displayed next to the spinner.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Stops the spinner and erases its line.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

/// Creates a spinner with an initial message already set.
pub fn spinner_with_message(msg: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(msg);
    spinner
}
