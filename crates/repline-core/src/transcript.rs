//! Session transcript and expression extraction
//!
//! The transcript is everything the user sees: the preamble, each prompt,
//! the echoed input and the result or error lines that followed it.
//!
//! ```text
//! Calculator
//! Type 'help' for a list of commands.
//! >> 1 + 2
//! => 3
//! >> 1 / 0
//! x> division by zero
//! >> _
//! ```
//!
//! Input is located textually: the UI hands back the whole rendered text and
//! the newest expression is whatever follows the last prompt.

use crate::{CoreError, Result};
use regex::Regex;

/// Second line of every preamble
pub const HELP_HINT: &str = "Type 'help' for a list of commands.";

/// Marker in front of a successful result
pub const RESULT_MARKER: &str = "=>";

/// Marker in front of an evaluation error
pub const ERROR_MARKER: &str = "x>";

/// Append-only text log with a trailing prompt
#[derive(Debug, Clone)]
pub struct Transcript {
    text: String,
    title: String,
    prompt: String,
    /// Matches a last line holding only the prompt and whitespace
    idle_prompt: Regex,
    /// Character offset where new input may begin
    offset: usize,
}

impl Transcript {
    /// Create a transcript showing the preamble for `title`
    pub fn new(title: impl Into<String>, prompt: impl Into<String>) -> Result<Self> {
        let title = title.into();
        let prompt = prompt.into();

        if prompt.trim().is_empty() {
            return Err(CoreError::Config("prompt must not be blank".to_string()));
        }

        let pattern = format!(r"{}\s+$", regex::escape(&prompt));
        let idle_prompt = Regex::new(&pattern).map_err(|source| CoreError::Prompt {
            prompt: prompt.clone(),
            source,
        })?;

        let mut transcript = Self {
            text: String::new(),
            title,
            prompt,
            idle_prompt,
            offset: 0,
        };
        transcript.reset();
        Ok(transcript)
    }

    /// The text a fresh session starts with
    pub fn preamble(&self) -> String {
        format!("{}\n{}\n{} ", self.title, HELP_HINT, self.prompt)
    }

    /// Find the newest expression in `full_text`
    ///
    /// A last line with nothing but the prompt yields the empty expression,
    /// as does text without any prompt at all.
    pub fn extract_expression(&self, full_text: &str) -> String {
        let last_line = full_text.rsplit('\n').next().unwrap_or_default();
        if self.idle_prompt.is_match(last_line) {
            return String::new();
        }

        full_text
            .rsplit_once(self.prompt.as_str())
            .map(|(_, segment)| segment.trim().to_string())
            .unwrap_or_default()
    }

    /// Take over the text as the user last saw and edited it
    pub fn replace(&mut self, full_text: impl Into<String>) {
        self.text = full_text.into();
        self.recompute_offset();
    }

    /// Append a successful result followed by a fresh prompt
    pub fn push_result(&mut self, result: &str) {
        self.push_block(&format!("{} {}", RESULT_MARKER, result));
    }

    /// Append a formatted evaluation error followed by a fresh prompt
    pub fn push_error(&mut self, message: &str) {
        self.push_block(&format!("{} {}", ERROR_MARKER, message));
    }

    /// Append free-form output followed by a fresh prompt
    pub fn push_block(&mut self, block: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(block);
        self.text.push('\n');
        self.push_prompt();
    }

    /// Drop everything, leaving only the prompt
    pub fn clear(&mut self) {
        self.text.clear();
        self.push_prompt();
    }

    /// Go back to the preamble
    pub fn reset(&mut self) {
        self.text = self.preamble();
        self.recompute_offset();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the transcript ends ready for the next expression
    pub fn is_at_rest(&self) -> bool {
        self.text.ends_with(&format!("{} ", self.prompt))
            && self.offset == self.text.chars().count()
    }

    fn push_prompt(&mut self) {
        self.text.push_str(&self.prompt);
        self.text.push(' ');
        self.recompute_offset();
    }

    fn recompute_offset(&mut self) {
        self.offset = self.text.chars().count();
    }
}
