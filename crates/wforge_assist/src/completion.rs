//! Text-completion seam.

use async_trait::async_trait;

use crate::error::AssistResult;

/// Anything that can turn a system prompt and a user prompt into text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> AssistResult<String>;

    /// Model identifier, for logs.
    fn model(&self) -> &str {
        "unknown"
    }
}
