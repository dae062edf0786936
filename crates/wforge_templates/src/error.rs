//! Error types for widget generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while generating a widget package.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Output path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Template rendering failed: {0}")]
    RenderingFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spec error: {0}")]
    Spec(#[from] wforge_spec::SpecError),
}
