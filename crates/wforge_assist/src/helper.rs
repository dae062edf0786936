//! Diagnosis helper: explanations and edit plans for failed builds.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::canned::{canned_explanation, FALLBACK_EXPLANATION};
use crate::completion::TextCompletion;
use crate::error::AssistResult;
use crate::llm::LlmAdapter;
use crate::plan::EditPlan;

const EXPLAIN_SYSTEM: &str = "You are an expert in Mendix pluggable widgets, React and TypeScript. \
Explain build failures briefly and concretely: the cause, then the fix.";

const PLAN_SYSTEM: &str = "You are an expert in Mendix pluggable widgets, React and TypeScript. \
You repair widget sources so that they compile. Reply with a single JSON object and nothing else.";

/// Where an explanation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationSource {
    Model,
    Canned,
}

#[derive(Debug, Clone)]
pub struct Explanation {
    pub summary: String,
    pub source: ExplanationSource,
}

/// Input for an edit-plan request.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub diagnostic: String,
    /// Widget configuration serialized as JSON.
    pub config_json: String,
    /// Relative path and (possibly truncated) content of relevant files.
    pub files: Vec<(String, String)>,
}

impl PlanRequest {
    pub fn new(diagnostic: impl Into<String>, config_json: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
            config_json: config_json.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    fn prompt(&self) -> String {
        let mut prompt = format!(
            "The widget build failed with:\n```\n{}\n```\n\nWidget configuration:\n```json\n{}\n```\n",
            self.diagnostic.trim(),
            self.config_json
        );
        for (path, content) in &self.files {
            prompt.push_str(&format!("\nFile `{}`:\n```\n{}\n```\n", path, content));
        }
        prompt.push_str(
            "\nRespond with JSON of the form {\"analysis\": string, \"fixes\": [{\"file\": string, \
             \"action\": \"replace\"|\"prepend\"|\"append\"|\"create\", \"search\"?: string, \
             \"replace\"?: string, \"content\"?: string}], \"description\": string}. \
             File paths are relative to the widget root.",
        );
        prompt
    }
}

/// Wraps an optional completion backend; works offline without one.
#[derive(Clone, Default)]
pub struct DiagnosisHelper {
    completion: Option<Arc<dyn TextCompletion>>,
}

impl DiagnosisHelper {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self {
            completion: Some(completion),
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }

    /// Use an [`LlmAdapter`] from the environment when a key is set.
    pub fn from_env() -> Self {
        match LlmAdapter::from_env() {
            Ok(adapter) => {
                info!("Using language model {}", adapter.model());
                Self::new(Arc::new(adapter))
            }
            Err(e) => {
                debug!("Diagnosis helper offline: {}", e);
                Self::offline()
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.completion.is_some()
    }

    /// Explain a diagnostic, falling back to the canned table when the model
    /// is missing or fails.
    pub async fn explain(&self, diagnostic: &str) -> Explanation {
        if let Some(completion) = &self.completion {
            let prompt = format!("Explain this widget build failure:\n```\n{}\n```", diagnostic.trim());
            match completion.complete(EXPLAIN_SYSTEM, &prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    return Explanation {
                        summary: text.trim().to_string(),
                        source: ExplanationSource::Model,
                    };
                }
                Ok(_) => warn!("Model returned an empty explanation"),
                Err(e) => warn!("Model explanation failed: {}", e),
            }
        }

        Explanation {
            summary: canned_explanation(diagnostic)
                .unwrap_or(FALLBACK_EXPLANATION)
                .to_string(),
            source: ExplanationSource::Canned,
        }
    }

    /// Ask the model for an edit plan. `Ok(None)` when offline.
    pub async fn edit_plan(&self, request: &PlanRequest) -> AssistResult<Option<EditPlan>> {
        let Some(completion) = &self.completion else {
            return Ok(None);
        };
        debug!(
            "Requesting edit plan from {} ({} files)",
            completion.model(),
            request.files.len()
        );
        let response = completion.complete(PLAN_SYSTEM, &request.prompt()).await?;
        EditPlan::parse(&response).map(Some)
    }
}

impl std::fmt::Debug for DiagnosisHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisHelper")
            .field("online", &self.is_online())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_files() {
        let prompt = PlanRequest::new("TS2304", "{\"name\":\"Badge\"}")
            .with_file("src/Badge.tsx", "export function Badge() {}")
            .prompt();
        assert!(prompt.contains("TS2304"));
        assert!(prompt.contains("File `src/Badge.tsx`"));
        assert!(prompt.contains("\"name\":\"Badge\""));
    }

    #[tokio::test]
    async fn test_offline_helper() {
        let helper = DiagnosisHelper::offline();
        assert!(!helper.is_online());

        let explanation = helper.explain("npm ERR! Missing script: \"build\"").await;
        assert_eq!(explanation.source, ExplanationSource::Canned);
        assert!(explanation.summary.contains("pluggable-widgets-tools"));

        let plan = helper.edit_plan(&PlanRequest::default()).await.unwrap();
        assert!(plan.is_none());
    }
}
