//! Progress display for reconciliation runs
//!
//! Shows one spinner per phase using indicatif. Disabled in quiet mode and
//! when running in CI, where log lines are the only useful output.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the discover, mutate and converge phases
pub struct Progress {
    /// Whether progress display is enabled
    enabled: bool,
    /// Spinner of the current phase
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Returns true if running under a CI system
    pub fn in_ci() -> bool {
        std::env::var_os("CI").is_some() || std::env::var_os("GITHUB_ACTIONS").is_some()
    }

    /// Show a spinner for a phase, replacing the previous one
    pub fn phase(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        self.finish_and_clear();

        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Update the message of the current spinner
    pub fn set_message(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Finish and clear the current spinner
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish_and_clear();
    }
}
