//! Errors that map to specific exit codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Build {0}")]
    BuildFailed(String),

    #[error("Build cancelled")]
    Cancelled,
}
