//! Error types for the build loop.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building a widget.
///
/// Only [`CoreError::InvalidConfig`] escapes `BuildLoop::execute`; the other
/// variants are raised by executors and become an attempt's diagnostic.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid widget configuration: {0}")]
    InvalidConfig(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] wforge_templates::TemplateError),

    #[error("Package runner failed: {0}")]
    Runner(#[from] wforge_runner::RunnerError),

    #[error("Deployment failed: {0}")]
    Deploy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
