//! Error types for the spec module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while reading or checking widget configurations.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Widget config not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported config format for {0} (expected .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Widget config validation failed: {0}")]
    ValidationFailed(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
