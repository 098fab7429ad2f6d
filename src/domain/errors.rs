//! Domain error types
//!
//! This module defines the error hierarchy for deid. Consolidation-stage errors
//! are raised immediately and abort processing of the document they belong to.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main deid error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum DeidError {
    /// Configuration references an annotator that does not exist
    #[error("Unknown annotator: {0}")]
    UnknownAnnotator(String),

    /// Annotation offsets are out of document bounds or empty
    #[error("Malformed span [{start_char}, {end_char}) for text of length {text_len}")]
    MalformedSpan {
        start_char: usize,
        end_char: usize,
        text_len: usize,
    },

    /// Input handed to a stage breaks that stage's contract (caller error)
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid regular expression in a pattern or slack definition
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A worker task panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeidError {
    /// Whether the error was caused by the caller's input rather than by
    /// configuration or the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DeidError::MalformedSpan { .. } | DeidError::PreconditionViolation(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DeidError {
    fn from(err: std::io::Error) -> Self {
        DeidError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DeidError {
    fn from(err: serde_json::Error) -> Self {
        DeidError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DeidError {
    fn from(err: toml::de::Error) -> Self {
        DeidError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<regex::Error> for DeidError {
    fn from(err: regex::Error) -> Self {
        DeidError::Pattern(err.to_string())
    }
}
