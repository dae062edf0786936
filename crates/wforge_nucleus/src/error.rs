//! Error types for the nucleus.

use thiserror::Error;

/// Result type alias for nucleus operations.
pub type NucleusResult<T> = Result<T, NucleusError>;

/// Errors that can occur while mutating or persisting the nucleus.
#[derive(Error, Debug)]
pub enum NucleusError {
    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Pattern already exists: {0}")]
    PatternAlreadyExists(String),

    #[error("Widget template not found: {0}")]
    TemplateNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
