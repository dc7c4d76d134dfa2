//! Output formatter for human-readable output
//!
//! Ensures consistent status markers across all handlers. Errors and
//! warnings go to stderr, everything else to stdout.

use std::io::Write;
use std::sync::{Arc, Mutex};

use console::{Color, style};
use sdiag_core::Hint;

use super::{OutputConfig, ProgressBar};

/// Formatter for CLI output
///
/// A recording formatter captures lines in memory instead of printing them;
/// handler tests assert against what was recorded.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    sink: Option<Arc<Mutex<Vec<String>>>>,
}

/// Shared view of the lines captured by a recording formatter
#[derive(Debug, Clone)]
pub struct Recorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// All recorded lines in order
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Recorded output joined with newlines
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

enum Stream {
    Stdout,
    Stderr,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config, sink: None }
    }

    /// Create a formatter that records plain lines instead of printing
    pub fn recording() -> (Self, Recorder) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let formatter = Self {
            config: OutputConfig {
                no_color: true,
                no_progress: true,
            },
            sink: Some(Arc::clone(&lines)),
        };
        (formatter, Recorder { lines })
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color
    }

    fn emit(&self, stream: Stream, line: String) {
        if let Some(sink) = &self.sink {
            sink.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(line);
            return;
        }
        match stream {
            Stream::Stdout => println!("{line}"),
            Stream::Stderr => eprintln!("{line}"),
        }
    }

    fn marked(&self, marker: &str, color: Color, message: &str) -> String {
        if self.colors_enabled() {
            format!("{} {message}", style(marker).fg(color))
        } else {
            format!("{marker} {message}")
        }
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        let line = self.marked("✓", Color::Green, message);
        self.emit(Stream::Stdout, line);
    }

    /// Output an error message
    pub fn error(&self, message: &str) {
        let line = self.marked("✗", Color::Red, message);
        self.emit(Stream::Stderr, line);
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        let line = self.marked("⚠", Color::Yellow, message);
        self.emit(Stream::Stderr, line);
    }

    /// Output a remediation hint
    pub fn hint(&self, hint: &Hint) {
        let line = self.marked("💡", Color::Cyan, &hint.to_string());
        self.emit(Stream::Stderr, line);
    }

    /// Output an informational message
    pub fn info(&self, message: &str) {
        let line = self.marked("ℹ", Color::Blue, message);
        self.emit(Stream::Stdout, line);
    }

    /// Output a top-level heading
    pub fn header(&self, title: &str) {
        let title = format!("=== {title} ===");
        let line = if self.colors_enabled() {
            style(title).bold().to_string()
        } else {
            title
        };
        self.emit(Stream::Stdout, String::new());
        self.emit(Stream::Stdout, line);
    }

    /// Output a sub-heading
    pub fn section(&self, title: &str) {
        let title = format!("--- {title} ---");
        let line = if self.colors_enabled() {
            style(title).bold().to_string()
        } else {
            title
        };
        self.emit(Stream::Stdout, line);
    }

    /// Output an indented label/value pair
    pub fn field(&self, label: &str, value: &str) {
        let label = format!("{label}:");
        let line = if self.colors_enabled() {
            format!("  {} {value}", style(format!("{label:<16}")).dim())
        } else {
            format!("  {label:<16} {value}")
        };
        self.emit(Stream::Stdout, line);
    }

    /// Print a line of text
    pub fn println(&self, message: &str) {
        self.emit(Stream::Stdout, message.to_string());
    }

    /// Print an input prompt without a trailing newline
    pub fn prompt(&self, prompt: &str) {
        if let Some(sink) = &self.sink {
            sink.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(format!("{prompt}: "));
            return;
        }
        print!("{prompt}: ");
        let _ = std::io::stdout().flush();
    }

    /// Start a spinner, unless progress output is disabled
    pub fn spinner(&self, message: &str) -> ProgressBar {
        ProgressBar::spinner(self.config.clone(), message)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
