//! Last-resort strategy: ask the diagnosis helper for an edit plan.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wforge_assist::{DiagnosisHelper, EditAction, EditPlan, PlanRequest, PlannedEdit};
use wforge_nucleus::FixAction;
use wforge_templates::MANIFEST_FILE;

use crate::apply::{apply_planned_edit, matching_files};
use crate::strategy::{FixContext, FixOutcome, FixStrategy, LearnCandidate};

/// Characters of each file sent to the model.
pub const MAX_FILE_CHARS: usize = 4000;
/// Files sent to the model per request.
pub const MAX_FILES: usize = 8;

const SOURCE_GLOBS: [&str; 3] = ["**/*.tsx", "**/*.ts", "**/*.xml"];

pub struct GenerativeStrategy {
    helper: DiagnosisHelper,
}

impl GenerativeStrategy {
    pub fn new(helper: DiagnosisHelper) -> Self {
        Self { helper }
    }

    fn build_request(context: &FixContext) -> PlanRequest {
        let config_json = serde_json::to_string_pretty(&context.config).unwrap_or_default();
        let mut request = PlanRequest::new(context.diagnostic.clone(), config_json);

        let root = context.widget_path();
        let mut files = vec![root.join(MANIFEST_FILE)];
        for pattern in SOURCE_GLOBS {
            match matching_files(root, pattern) {
                Ok(found) => files.extend(found),
                Err(e) => debug!("Skipping {}: {}", pattern, e),
            }
        }

        for path in files.into_iter().filter(|p| p.is_file()).take(MAX_FILES) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let relative = path.strip_prefix(root).unwrap_or(&path);
            request = request.with_file(
                relative.to_string_lossy().replace('\\', "/"),
                truncate(&content, MAX_FILE_CHARS),
            );
        }
        request
    }
}

/// First `max` characters of `text`.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}\n...[truncated]", &text[..end]),
        None => text.to_string(),
    }
}

/// Nucleus form of a planned edit. Only replace and prepend edits have one;
/// the path becomes relative to the widget's `src/` directory.
fn as_fix_action(widget_path: &Path, edit: &PlannedEdit) -> Option<FixAction> {
    let file = if widget_path.join("src").is_dir() {
        edit.file.strip_prefix("src/").unwrap_or(&edit.file)
    } else {
        edit.file.as_str()
    };
    let payload = edit.payload()?;
    match edit.action {
        EditAction::Replace => Some(FixAction::file_edit(file, edit.search.clone()?, payload)),
        EditAction::Prepend => Some(FixAction::prepend(file, payload)),
        EditAction::Append | EditAction::Create => None,
    }
}

fn apply_plan(widget_path: &Path, plan: &EditPlan) -> Vec<PlannedEdit> {
    plan.fixes
        .iter()
        .filter(|edit| match apply_planned_edit(widget_path, edit) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("Skipping planned edit of {}: {}", edit.file, e);
                false
            }
        })
        .cloned()
        .collect()
}

#[async_trait]
impl FixStrategy for GenerativeStrategy {
    fn name(&self) -> &str {
        "generative"
    }

    async fn try_fix(&self, context: &FixContext) -> FixOutcome {
        if !self.helper.is_online() {
            return FixOutcome::not_applied(self.name(), "no language model configured");
        }

        let request = Self::build_request(context);
        let plan = match self.helper.edit_plan(&request).await {
            Ok(Some(plan)) => plan,
            Ok(None) => return FixOutcome::not_applied(self.name(), "no edit plan produced"),
            Err(e) => {
                warn!("Edit plan request failed: {}", e);
                return FixOutcome::not_applied(self.name(), format!("edit plan unavailable: {}", e));
            }
        };

        let applied = apply_plan(context.widget_path(), &plan);
        if applied.is_empty() {
            return FixOutcome::not_applied(self.name(), "no planned edit could be applied");
        }

        let description = match plan.summary() {
            "" => format!("Applied {} generated edit(s)", applied.len()),
            summary => summary.to_string(),
        };
        info!("Applied {}/{} planned edits: {}", applied.len(), plan.fixes.len(), description);

        let mut outcome = FixOutcome::applied(self.name(), description.clone());
        if let Some(fix) = applied
            .iter()
            .find_map(|edit| as_fix_action(context.widget_path(), edit))
        {
            outcome = outcome.with_learn_candidate(LearnCandidate {
                error_text: context.diagnostic.clone(),
                description,
                fix,
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wforge_spec::WidgetConfig;

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("short", 10), "short");
        let cut = truncate("ééééé", 2);
        assert!(cut.starts_with("éé\n"));
    }

    #[test]
    fn test_request_limits_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        for i in 0..12 {
            fs::write(dir.path().join(format!("src/C{}.tsx", i)), "x".repeat(5000)).unwrap();
        }

        let context = FixContext::new("boom", dir.path(), WidgetConfig::new("Badge"));
        let request = GenerativeStrategy::build_request(&context);
        assert_eq!(request.files.len(), MAX_FILES);
        assert_eq!(request.files[0].0, "package.json");
        assert!(request.files[1].1.chars().count() < 4100);
        assert!(request.config_json.contains("Badge"));
    }

    #[test]
    fn test_fix_action_from_edit() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let edit = PlannedEdit {
            file: "src/Badge.tsx".to_string(),
            action: EditAction::Prepend,
            search: None,
            replace: None,
            content: Some("import x from 'x';".to_string()),
        };
        assert_eq!(
            as_fix_action(dir.path(), &edit),
            Some(FixAction::prepend("Badge.tsx", "import x from 'x';"))
        );
    }
}
