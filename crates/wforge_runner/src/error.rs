//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while driving the package manager.
///
/// A command that runs and exits non-zero is not an error; it is reported
/// through [`ExecutionResult::exit_code`](crate::ExecutionResult).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Package manager not available: {0}")]
    ManagerNotAvailable(String),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Command timeout after {0} seconds")]
    Timeout(u64),

    #[error("Project directory not found: {0}")]
    ProjectNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
