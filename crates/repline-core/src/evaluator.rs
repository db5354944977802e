//! The evaluator boundary and per-flavor settings
//!
//! A REPL flavor is two things: static settings (title, prompt, grammar)
//! and an [`Evaluator`] that turns an expression into text. The engine only
//! sequences calls; it never looks inside either.

use serde::{Deserialize, Serialize};

/// Prompt used when a flavor doesn't pick one
pub const DEFAULT_PROMPT: &str = ">>";

/// Evaluates expressions for one REPL flavor
pub trait Evaluator: Send {
    /// Failure type of [`Evaluator::execute`]
    type Error: std::error::Error;

    /// Evaluate an expression and render its result
    ///
    /// Called with whatever the user entered, including the empty string.
    fn execute(&mut self, expression: &str) -> Result<String, Self::Error>;

    /// Render an evaluation failure for the transcript
    fn format_error(&self, error: &Self::Error) -> String {
        error.to_string()
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    type Error = E::Error;

    fn execute(&mut self, expression: &str) -> Result<String, Self::Error> {
        (**self).execute(expression)
    }

    fn format_error(&self, error: &Self::Error) -> String {
        (**self).format_error(error)
    }
}

/// Static settings a REPL flavor supplies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorConfig {
    /// Session title, also the key of the persisted history
    pub title: String,
    /// Prompt marker
    pub prompt: String,
    /// Syntax-highlight grammar for the host editor
    pub grammar: String,
}

impl FlavorConfig {
    pub fn new(title: impl Into<String>, grammar: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            prompt: DEFAULT_PROMPT.to_string(),
            grammar: grammar.into(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}
