//! Output formatting utilities
//!
//! This module provides the formatter used by every handler for
//! human-readable output, plus the spinner shown during remote calls.

mod formatter;
mod progress;

pub use formatter::{Formatter, Recorder};
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags and settings
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Disable colored output
    pub no_color: bool,
    /// Disable spinners
    pub no_progress: bool,
}
