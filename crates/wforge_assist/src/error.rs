//! Error types for the assistant.

use thiserror::Error;

/// Result type alias for assistant operations.
pub type AssistResult<T> = Result<T, AssistError>;

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("No language model configured (set OPENAI_API_KEY or ANTHROPIC_API_KEY)")]
    NotConfigured,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Invalid edit plan: {0}")]
    InvalidPlan(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
