//! Strategy backed by the knowledge cache.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wforge_nucleus::{FixAction, KnowledgeCache, SharedNucleus};

use crate::apply::apply_fix_action;
use crate::strategy::{FixContext, FixOutcome, FixStrategy};

const SEARCH_LIMIT: usize = 5;

/// Applies file edits recorded in knowledge entries and promotes the ones
/// that work into the nucleus.
pub struct KnowledgeStrategy {
    cache: Arc<KnowledgeCache>,
    nucleus: SharedNucleus,
}

impl KnowledgeStrategy {
    pub fn new(cache: Arc<KnowledgeCache>, nucleus: SharedNucleus) -> Self {
        Self { cache, nucleus }
    }
}

/// Knowledge content that is a file-edit fix in JSON form.
fn parse_file_edit(content: &str) -> Option<FixAction> {
    match serde_json::from_str::<FixAction>(content.trim()) {
        Ok(action @ FixAction::FileEdit { .. }) => Some(action),
        _ => None,
    }
}

#[async_trait]
impl FixStrategy for KnowledgeStrategy {
    fn name(&self) -> &str {
        "knowledge"
    }

    async fn try_fix(&self, context: &FixContext) -> FixOutcome {
        // Prose entries are skipped before the limit applies so they never
        // crowd out an applicable edit.
        let candidates: Vec<_> = self
            .cache
            .search(&context.diagnostic, self.cache.len())
            .into_iter()
            .filter_map(|found| parse_file_edit(&found.entry.content).map(|action| (found, action)))
            .take(SEARCH_LIMIT)
            .collect();
        debug!("{} knowledge file edits match the diagnostic", candidates.len());

        for (found, action) in candidates {
            match apply_fix_action(context.widget_path(), &action) {
                Ok(report) if report.applied => {
                    info!("Applied knowledge entry '{}'", found.entry.title);
                    if let Err(e) =
                        self.nucleus
                            .learn(&context.diagnostic, found.entry.title.clone(), action, true)
                    {
                        warn!("Failed to promote knowledge entry: {}", e);
                    }
                    return FixOutcome::applied(self.name(), found.entry.title);
                }
                Ok(report) => debug!("Knowledge entry '{}': {}", found.entry.title, report.detail),
                Err(e) => warn!("Knowledge entry '{}' could not be applied: {}", found.entry.title, e),
            }
        }

        FixOutcome::not_applied(self.name(), "no applicable knowledge entry")
    }
}
