//! Error types for Repline Core

use thiserror::Error;

/// Result type for Repline Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reading or writing persisted command history failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The prompt could not be turned into a matching pattern
    #[error("Invalid prompt {prompt:?}: {source}")]
    Prompt {
        prompt: String,
        #[source]
        source: regex::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
