//! Line input for the interactive menu
//!
//! A terminal gets a line editor; piped input is read line by line.

use std::borrow::Cow;
use std::io::IsTerminal;

use async_trait::async_trait;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Source of user input lines
#[async_trait]
pub trait Input: Send {
    /// Read one line without its terminator; `None` at end of input
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Whether `read_line` draws the prompt itself
    fn draws_prompt(&self) -> bool {
        false
    }
}

/// Reads answers from standard input
pub enum StdinInput {
    Editor(Box<Reedline>),
    Piped(Lines<BufReader<Stdin>>),
}

impl StdinInput {
    /// Line editor on a terminal, plain lines otherwise
    pub fn new() -> Self {
        if std::io::stdin().is_terminal() {
            Self::Editor(Box::new(Reedline::create()))
        } else {
            Self::Piped(BufReader::new(tokio::io::stdin()).lines())
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Input for StdinInput {
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        match self {
            Self::Piped(lines) => lines.next_line().await,
            Self::Editor(editor) => {
                let prompt = MenuPrompt(prompt);
                let signal = tokio::task::block_in_place(|| editor.read_line(&prompt))?;
                Ok(match signal {
                    Signal::Success(buffer) => Some(buffer),
                    // Ctrl-C and Ctrl-D end the session like end of input
                    _ => None,
                })
            }
        }
    }

    fn draws_prompt(&self) -> bool {
        matches!(self, Self::Editor(_))
    }
}

/// Bare prompt text with no indicator or right-hand segment
struct MenuPrompt<'a>(&'a str);

impl Prompt for MenuPrompt<'_> {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.0)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("::: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({prefix}search: {}) ", history_search.term))
    }
}

/// Replays a fixed list of answers, then reports end of input
#[cfg(test)]
pub struct ScriptedInput {
    answers: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Input for ScriptedInput {
    async fn read_line(&mut self, _prompt: &str) -> std::io::Result<Option<String>> {
        Ok(self.answers.pop_front())
    }
}
