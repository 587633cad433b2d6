//! Error types for the access-control engine

use thiserror::Error;

use crate::pattern::PatternError;

/// Access-control engine errors
///
/// Only loaders see these. Evaluation (`Role::has_access` and friends)
/// recovers from every malformed rule locally and never returns an error.
#[derive(Debug, Error)]
pub enum RbacError {
    /// Structurally invalid access rule
    #[error("Invalid rule {index} in role '{role}': {reason}")]
    InvalidRule {
        /// Owning role identifier
        role: String,
        /// Position of the rule within the role
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Structurally invalid role record
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Two roles share the same identifier
    #[error("Duplicate role: {0}")]
    DuplicateRole(String),

    /// Pattern compilation error
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Role data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, RbacError>;
