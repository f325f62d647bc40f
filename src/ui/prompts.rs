//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! All operator input goes through the [`Prompter`] trait so the mutation
//! loop can be driven by a script in tests. [`StdioPrompter`] reads from
//! the terminal; [`ScriptedPrompter`] replays canned answers.
//!
//! End of input is an error ([`PromptError::EndOfInput`]); the mutation loop
//! treats it as a quit.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("end of input")]
    EndOfInput,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Source of operator input.
pub trait Prompter {
    /// Show `message` and read one line, without its line terminator.
    fn read_line(&mut self, message: &str) -> Result<String, PromptError>;

    /// Ask a yes/no question. `y` and `yes` (any case) confirm.
    fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        let answer = self.read_line(&format!("{} (y/n)", message))?;
        Ok(is_yes(&answer))
    }
}

/// Check an answer for `y` / `yes`.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompter reading from stdin and writing to stdout.
#[derive(Debug, Default)]
pub struct StdioPrompter;

impl StdioPrompter {
    /// Create a terminal prompter.
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for StdioPrompter {
    fn read_line(&mut self, message: &str) -> Result<String, PromptError> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", message)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(PromptError::EndOfInput);
        }
        Ok(strip_line_ending(line))
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Prompter that replays a fixed list of answers.
///
/// Every prompt message is kept so tests can check what the operator saw.
///
/// ```
/// use modelctl::ui::prompts::{Prompter, ScriptedPrompter};
///
/// let mut prompter = ScriptedPrompter::new(["2", "d"]);
/// assert_eq!(prompter.read_line("choose").unwrap(), "2");
/// assert_eq!(prompter.read_line("choose").unwrap(), "d");
/// assert!(prompter.read_line("choose").is_err());
/// assert_eq!(prompter.prompts().len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter with the given answers.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Messages shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, message: &str) -> Result<String, PromptError> {
        self.prompts.push(message.to_string());
        self.answers.pop_front().ok_or(PromptError::EndOfInput)
    }
}
