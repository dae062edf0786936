//! Core fix-strategy trait and types.
//!
//! A strategy inspects a failed build's diagnostic and may edit the widget
//! in place. Strategies never fail the caller: any error raised while
//! applying a fix is logged and reported as "not applied".

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use wforge_nucleus::FixAction;
use wforge_spec::WidgetConfig;

/// Input to a fix strategy.
#[derive(Debug, Clone)]
pub struct FixContext {
    /// Combined build output of the failed attempt
    pub diagnostic: String,
    /// Root of the generated widget package
    pub widget_path: PathBuf,
    /// Configuration the widget was generated from
    pub config: WidgetConfig,
}

impl FixContext {
    pub fn new(
        diagnostic: impl Into<String>,
        widget_path: impl Into<PathBuf>,
        config: WidgetConfig,
    ) -> Self {
        Self {
            diagnostic: diagnostic.into(),
            widget_path: widget_path.into(),
            config,
        }
    }

    pub fn widget_path(&self) -> &Path {
        &self.widget_path
    }
}

/// A fix worth remembering once the build it repaired succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnCandidate {
    pub error_text: String,
    pub description: String,
    pub fix: FixAction,
}

/// Result of asking a strategy for a fix.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Whether files or config were changed
    pub applied: bool,
    /// Human-readable description of what was done (or suggested)
    pub description: String,
    /// Name of the strategy that produced this outcome
    pub strategy: String,
    /// Nucleus pattern that was applied, if any
    pub pattern_id: Option<String>,
    /// Fix to promote into the nucleus if a later attempt succeeds
    pub learn_candidate: Option<LearnCandidate>,
}

impl FixOutcome {
    /// Create an applied outcome.
    pub fn applied(strategy: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            applied: true,
            description: description.into(),
            strategy: strategy.into(),
            pattern_id: None,
            learn_candidate: None,
        }
    }

    /// Create a not-applied outcome. The description may carry a suggestion
    /// for the user (e.g. an install command).
    pub fn not_applied(strategy: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            applied: false,
            ..Self::applied(strategy, description)
        }
    }

    pub fn with_pattern(mut self, id: impl Into<String>) -> Self {
        self.pattern_id = Some(id.into());
        self
    }

    pub fn with_learn_candidate(mut self, candidate: LearnCandidate) -> Self {
        self.learn_candidate = Some(candidate);
        self
    }
}

/// A source of automatic repairs.
#[async_trait]
pub trait FixStrategy: Send + Sync {
    /// Short identifier used in logs and fix history.
    fn name(&self) -> &str;

    /// Try to repair the failure described by `context`.
    async fn try_fix(&self, context: &FixContext) -> FixOutcome;
}
