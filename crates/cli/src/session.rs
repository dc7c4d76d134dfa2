//! Diagnostic session context
//!
//! Built once at startup and handed to every handler. Holds the validated
//! configuration, the remote handles, the input source, and the output
//! formatter, so handlers never reach for global state.

use sdiag_core::{ConfigCheck, ReachabilityProbe, SessionConfig, Settings, StorageApi};

use crate::input::Input;
use crate::output::Formatter;
use crate::workspace::TempWorkspace;

/// Everything a handler needs
pub struct Session {
    /// Validated connection settings
    pub config: SessionConfig,
    /// Check lines produced at startup, repeated by full diagnostics
    pub checks: Vec<ConfigCheck>,
    /// Effective tool settings
    pub settings: Settings,
    pub store: Box<dyn StorageApi>,
    pub prober: Box<dyn ReachabilityProbe>,
    pub input: Box<dyn Input>,
    pub out: Formatter,
    pub workspace: TempWorkspace,
}

impl Session {
    /// Prompt and read one raw line; `None` at end of input
    pub async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        if !self.input.draws_prompt() {
            self.out.prompt(prompt);
        }
        self.input.read_line(&format!("{prompt}: ")).await
    }

    /// Prompt and read one trimmed answer; end of input reads as empty
    pub async fn ask(&mut self, prompt: &str) -> anyhow::Result<String> {
        let line = self.read_line(prompt).await?.unwrap_or_default();
        Ok(line.trim().to_string())
    }

    /// Prompt with a default used for blank answers
    pub async fn ask_or(&mut self, prompt: &str, default: &str) -> anyhow::Result<String> {
        let answer = self.ask(&format!("{prompt} [{default}]")).await?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Prompt for a value that must not be blank
    ///
    /// Prints an error and returns `None` when the answer is blank.
    pub async fn ask_required(&mut self, prompt: &str, what: &str) -> anyhow::Result<Option<String>> {
        let answer = self.ask(prompt).await?;
        if answer.is_empty() {
            self.out.error(&format!("{what} is required"));
            return Ok(None);
        }
        Ok(Some(answer))
    }
}
