//! Ordered chain of fix strategies.

use std::sync::Arc;

use tracing::{debug, info};
use wforge_assist::DiagnosisHelper;
use wforge_nucleus::{KnowledgeCache, SharedNucleus};
use wforge_runner::{PackageRunner, RunConfig};

use crate::generative::GenerativeStrategy;
use crate::heuristic::HeuristicStrategy;
use crate::knowledge::KnowledgeStrategy;
use crate::nucleus::NucleusStrategy;
use crate::strategy::{FixContext, FixOutcome, FixStrategy};

/// Consults strategies in priority order and stops at the first that applies
/// a fix.
#[derive(Clone, Default)]
pub struct FixChain {
    strategies: Vec<Arc<dyn FixStrategy>>,
}

impl FixChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nucleus, knowledge cache, heuristics, then the generative fallback.
    pub fn standard(
        nucleus: SharedNucleus,
        knowledge: Arc<KnowledgeCache>,
        runner: Option<Arc<dyn PackageRunner>>,
        run_config: RunConfig,
        assistant: DiagnosisHelper,
    ) -> Self {
        let mut heuristic = HeuristicStrategy::new(nucleus.clone());
        if let Some(runner) = runner {
            heuristic = heuristic.with_runner(runner, run_config);
        }

        Self::new()
            .with(NucleusStrategy::new(nucleus.clone()))
            .with(KnowledgeStrategy::new(knowledge, nucleus))
            .with(heuristic)
            .with(GenerativeStrategy::new(assistant))
    }

    /// Append a strategy with the lowest priority so far.
    pub fn with(mut self, strategy: impl FixStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    pub fn with_shared(mut self, strategy: Arc<dyn FixStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// First applied outcome, or a not-applied outcome collecting every
    /// strategy's suggestion.
    pub async fn try_fix(&self, context: &FixContext) -> FixOutcome {
        let mut notes = Vec::new();

        for strategy in &self.strategies {
            let outcome = strategy.try_fix(context).await;
            if outcome.applied {
                info!("Fix applied by {}: {}", outcome.strategy, outcome.description);
                return outcome;
            }
            debug!("{} did not apply a fix: {}", strategy.name(), outcome.description);
            if !outcome.description.is_empty() {
                notes.push(format!("{}: {}", outcome.strategy, outcome.description));
            }
        }

        FixOutcome::not_applied("chain", notes.join("\n"))
    }
}

impl std::fmt::Debug for FixChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixChain")
            .field("strategies", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let chain = FixChain::standard(
            SharedNucleus::in_memory(),
            Arc::new(KnowledgeCache::in_memory()),
            None,
            RunConfig::default(),
            DiagnosisHelper::offline(),
        );
        assert_eq!(chain.names(), vec!["nucleus", "knowledge", "heuristic", "generative"]);
    }

    #[tokio::test]
    async fn test_empty_chain_not_applied() {
        let context = FixContext::new("boom", "/nonexistent", wforge_spec::WidgetConfig::new("A"));
        let outcome = FixChain::new().try_fix(&context).await;
        assert!(!outcome.applied);
        assert_eq!(outcome.strategy, "chain");
    }
}
