//! Error types for pattern compilation

use thiserror::Error;

/// Pattern compilation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid regular expression '{source_text}': {message}")]
    InvalidRegex {
        source_text: String,
        message: String,
    },

    #[error("empty pattern")]
    Empty,
}

/// Result type for pattern operations
pub type Result<T> = std::result::Result<T, PatternError>;
