//! Spinner for remote calls
//!
//! Gives feedback while an upload, download, or listing is in flight.

use std::time::Duration;

use super::OutputConfig;

/// Progress indicator wrapper
///
/// Suppressed when progress output is disabled.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a spinner for indeterminate progress
    pub fn spinner(config: OutputConfig, message: &str) -> Self {
        if config.no_progress {
            return Self { bar: None };
        }

        let bar = indicatif::ProgressBar::new_spinner().with_message(message.to_string());
        if let Ok(style) =
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar: Some(bar) }
    }

    /// Finish and clear the spinner
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if the spinner is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        self.finish_and_clear();
    }
}
