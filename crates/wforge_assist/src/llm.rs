//! LLM adapter for text completion.
//!
//! Supports OpenAI and Anthropic APIs, selected via settings or environment
//! variables.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::TextCompletion;
use crate::error::{AssistError, AssistResult};

/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "WFORGE_LLM_MODEL";
const MAX_RETRIES: u32 = 3;
const MAX_TOKENS: u32 = 4096;

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[serde(alias = "open-ai")]
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open-ai" => Some(Self::OpenAI),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-5-mini",
            Self::Anthropic => "claude-sonnet-4.5",
        }
    }

    fn key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Adapter that calls a hosted model over HTTP.
pub struct LlmAdapter {
    provider: LlmProvider,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl LlmAdapter {
    pub fn new(provider: LlmProvider, api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| provider.default_model().to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Create an adapter from environment variables.
    ///
    /// Checks `OPENAI_API_KEY`, then `ANTHROPIC_API_KEY`; the model can be
    /// overridden with `WFORGE_LLM_MODEL`.
    pub fn from_env() -> AssistResult<Self> {
        let model = env_nonempty(MODEL_ENV);
        for provider in [LlmProvider::OpenAI, LlmProvider::Anthropic] {
            if let Some(key) = env_nonempty(provider.key_env()) {
                return Ok(Self::new(provider, key, model));
            }
        }
        Err(AssistError::NotConfigured)
    }

    /// Create an adapter for an explicitly chosen provider.
    ///
    /// The API key still comes from the provider's environment variable; an
    /// explicit model wins over `WFORGE_LLM_MODEL`.
    pub fn from_settings(provider: LlmProvider, model: Option<String>) -> AssistResult<Self> {
        let key = env_nonempty(provider.key_env()).ok_or(AssistError::NotConfigured)?;
        Ok(Self::new(provider, key, model.or_else(|| env_nonempty(MODEL_ENV))))
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    async fn complete_openai(&self, system: &str, prompt: &str) -> AssistResult<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_completion_tokens: Some(MAX_TOKENS),
        };

        let body = self
            .send_with_retry(|| {
                self.client
                    .post("https://api.openai.com/v1/chat/completions")
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&request)
            })
            .await?;

        let result: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| AssistError::Llm(format!("Failed to parse response: {}", e)))?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AssistError::Llm("No response from OpenAI".to_string()))
    }

    async fn complete_anthropic(&self, system: &str, prompt: &str) -> AssistResult<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: Some(system.to_string()).filter(|s| !s.is_empty()),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let body = self
            .send_with_retry(|| {
                self.client
                    .post("https://api.anthropic.com/v1/messages")
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&request)
            })
            .await?;

        let result: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| AssistError::Llm(format!("Failed to parse response: {}", e)))?;
        result
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AssistError::Llm("No response from Anthropic".to_string()))
    }

    /// Send a request, retrying network errors, 5xx and 429 with exponential
    /// backoff (1s, 2s). Returns the response body.
    async fn send_with_retry<F>(&self, build: F) -> AssistResult<String>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1));
                tokio::time::sleep(delay).await;
            }

            let response = match build().send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(AssistError::Llm(format!("Network error: {}", e)));
                    continue;
                }
            };

            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.is_server_error() || status.as_u16() == 429 {
                warn!(
                    "{} API error {} (attempt {}/{})",
                    self.provider,
                    status,
                    attempt + 1,
                    MAX_RETRIES
                );
                last_error = Some(AssistError::Llm(format!("{} API error {}: {}", self.provider, status, body)));
                continue;
            }

            if !status.is_success() {
                return Err(AssistError::Llm(format!(
                    "{} API error {}: {}",
                    self.provider, status, body
                )));
            }

            debug!("{} responded with {} bytes", self.provider, body.len());
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| AssistError::Llm("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl TextCompletion for LlmAdapter {
    async fn complete(&self, system: &str, prompt: &str) -> AssistResult<String> {
        match self.provider {
            LlmProvider::OpenAI => self.complete_openai(system, prompt).await,
            LlmProvider::Anthropic => self.complete_anthropic(system, prompt).await,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: String,
}
