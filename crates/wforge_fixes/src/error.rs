//! Error types for fix application.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for fix operations.
pub type FixResult<T> = Result<T, FixError>;

/// Errors raised while applying a fix. Strategies catch these and report
/// the fix as not applied.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("Package manifest not found: {0}")]
    MissingManifest(PathBuf),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Edit outside the widget directory: {0}")]
    OutsideWidget(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Nucleus error: {0}")]
    Nucleus(#[from] wforge_nucleus::NucleusError),

    #[error("Runner error: {0}")]
    Runner(#[from] wforge_runner::RunnerError),

    #[error("Assist error: {0}")]
    Assist(#[from] wforge_assist::AssistError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
