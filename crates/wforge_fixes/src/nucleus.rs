//! Strategy backed by the pattern store.

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wforge_nucleus::{SharedNucleus, AUTO_APPLY_THRESHOLD};

use crate::apply::apply_fix_action;
use crate::strategy::{FixContext, FixOutcome, FixStrategy};

/// Applies the best-ranked confident pattern from the nucleus.
pub struct NucleusStrategy {
    nucleus: SharedNucleus,
}

impl NucleusStrategy {
    pub fn new(nucleus: SharedNucleus) -> Self {
        Self { nucleus }
    }
}

#[async_trait]
impl FixStrategy for NucleusStrategy {
    fn name(&self) -> &str {
        "nucleus"
    }

    async fn try_fix(&self, context: &FixContext) -> FixOutcome {
        let candidates: Vec<_> = self
            .nucleus
            .match_fixes(&context.diagnostic)
            .into_iter()
            .filter(|p| p.auto_applicable())
            .collect();

        if candidates.is_empty() {
            return FixOutcome::not_applied(
                self.name(),
                format!("no pattern with confidence >= {}", AUTO_APPLY_THRESHOLD),
            );
        }

        let mut suggestions = Vec::new();
        for pattern in candidates {
            let applied = match apply_fix_action(context.widget_path(), &pattern.fix) {
                Ok(report) => {
                    debug!("Pattern {}: {}", pattern.id, report.detail);
                    if !report.applied {
                        suggestions.push(format!("{}: {}", pattern.description, report.detail));
                    }
                    report.applied
                }
                Err(e) => {
                    warn!("Pattern {} could not be applied: {}", pattern.id, e);
                    false
                }
            };

            if let Err(e) = self.nucleus.record_outcome(&pattern.id, applied) {
                warn!("Failed to record outcome for {}: {}", pattern.id, e);
            }

            if applied {
                info!("Applied nucleus pattern {} ({})", pattern.id, pattern.description);
                return FixOutcome::applied(self.name(), pattern.description.clone())
                    .with_pattern(pattern.id);
            }
        }

        FixOutcome::not_applied(self.name(), suggestions.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use wforge_nucleus::{FixAction, FixPattern, PatternStore};
    use wforge_spec::WidgetConfig;

    #[tokio::test]
    async fn test_low_confidence_patterns_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tsx"), "x").unwrap();

        let mut store = PatternStore::empty();
        store
            .add_pattern(
                FixPattern::new("shaky", "boom", FixAction::prepend("*.tsx", "// fixed"))
                    .confidence(0.5),
            )
            .unwrap();
        let strategy = NucleusStrategy::new(SharedNucleus::new(store));

        let outcome = strategy
            .try_fix(&FixContext::new("boom", dir.path(), WidgetConfig::new("A")))
            .await;
        assert!(!outcome.applied);
        assert_eq!(fs::read_to_string(dir.path().join("a.tsx")).unwrap(), "x");
    }

    #[tokio::test]
    async fn test_not_applied_records_failure() {
        let dir = tempdir().unwrap();
        let nucleus = SharedNucleus::in_memory();
        let strategy = NucleusStrategy::new(nucleus.clone());

        let outcome = strategy
            .try_fix(&FixContext::new(
                "error TS2307: Cannot find module 'classnames'",
                dir.path(),
                WidgetConfig::new("A"),
            ))
            .await;

        assert!(!outcome.applied);
        assert!(outcome.description.contains("npm install classnames"));
        let pattern = nucleus.get("builtin-classnames-module").unwrap();
        assert_eq!(pattern.failure_count, 1);
        assert!((pattern.confidence - 0.75).abs() < 1e-9);
    }
}
