//! The persisted pattern store.
//!
//! The whole nucleus is a single pretty-printed JSON document:
//!
//! ```text
//! {
//!   "version": "1.0.0",
//!   "lastUpdated": "...",
//!   "errorFixes": [...],
//!   "widgetTemplates": [...],
//!   "sdkApis": [...],
//!   "bestPractices": [...]
//! }
//! ```
//!
//! Every mutation is flushed immediately when the store has a backing path.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::builtin::{builtin_best_practices, builtin_patterns, builtin_sdk_apis, builtin_templates};
use crate::error::{NucleusError, NucleusResult};
use crate::pattern::{FixAction, FixPattern, Provenance, LEARNED_CONFIDENCE};
use crate::records::{BestPractice, SdkApiNote, WidgetTemplate};
use crate::signature::{
    derive_signature, error_summary, extract_keywords, keyword_similarity, SIMILARITY_THRESHOLD,
};

/// Current document format version.
pub const STORE_VERSION: &str = "1.0.0";

/// On-disk representation of the nucleus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NucleusDocument {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub error_fixes: Vec<FixPattern>,
    #[serde(default)]
    pub widget_templates: Vec<WidgetTemplate>,
    #[serde(default)]
    pub sdk_apis: Vec<SdkApiNote>,
    #[serde(default)]
    pub best_practices: Vec<BestPractice>,
}

impl NucleusDocument {
    /// A document seeded with the builtin data set.
    pub fn builtin() -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            last_updated: Utc::now(),
            error_fixes: builtin_patterns(),
            widget_templates: builtin_templates(),
            sdk_apis: builtin_sdk_apis(),
            best_practices: builtin_best_practices(),
        }
    }

    pub fn empty() -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            last_updated: Utc::now(),
            error_fixes: Vec::new(),
            widget_templates: Vec::new(),
            sdk_apis: Vec::new(),
            best_practices: Vec::new(),
        }
    }
}

/// Result of feeding an observed fix into [`PatternStore::learn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnOutcome {
    /// An existing similar pattern was re-weighted.
    Reinforced(String),
    /// A new learned pattern was appended.
    Created(String),
    /// Novel error and failed fix: nothing was stored.
    Discarded,
}

impl LearnOutcome {
    pub fn pattern_id(&self) -> Option<&str> {
        match self {
            Self::Reinforced(id) | Self::Created(id) => Some(id),
            Self::Discarded => None,
        }
    }
}

/// A pattern together with its ranking score for one diagnostic.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub pattern: FixPattern,
    pub score: f64,
}

/// Aggregate numbers about the store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_patterns: usize,
    pub by_provenance: HashMap<Provenance, usize>,
    pub mean_confidence: f64,
    pub total_successes: u64,
    pub total_failures: u64,
    pub most_used: Option<String>,
    pub widget_templates: usize,
    pub sdk_apis: usize,
    pub best_practices: usize,
}

impl StoreStats {
    pub fn count(&self, provenance: Provenance) -> usize {
        self.by_provenance.get(&provenance).copied().unwrap_or(0)
    }
}

/// Confidence-weighted store of fix patterns and auxiliary records.
#[derive(Debug)]
pub struct PatternStore {
    path: Option<PathBuf>,
    doc: NucleusDocument,
    dirty: bool,
}

impl PatternStore {
    /// Load the store from `path`.
    ///
    /// A missing or unreadable file yields the builtin set; the path is kept
    /// so the first mutation creates the file. Builtin patterns added since the
    /// file was written are appended.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let doc = if !path.exists() {
            debug!("No nucleus at {:?}, starting from builtins", path);
            NucleusDocument::builtin()
        } else {
            match fs::read_to_string(&path)
                .map_err(NucleusError::from)
                .and_then(|content| serde_json::from_str::<NucleusDocument>(&content).map_err(Into::into))
            {
                Ok(mut doc) => {
                    let added = top_up_builtins(&mut doc);
                    if added > 0 {
                        debug!("Added {} new builtin patterns to loaded nucleus", added);
                    }
                    info!("Loaded nucleus with {} patterns from {:?}", doc.error_fixes.len(), path);
                    doc
                }
                Err(e) => {
                    warn!("Nucleus at {:?} is unreadable ({}), falling back to builtins", path, e);
                    NucleusDocument::builtin()
                }
            }
        };

        Self {
            path: Some(path),
            doc,
            dirty: false,
        }
    }

    /// Builtin data set without persistence.
    pub fn in_memory() -> Self {
        Self::from_document(NucleusDocument::builtin(), None)
    }

    /// A store with no patterns at all, without persistence.
    pub fn empty() -> Self {
        Self::from_document(NucleusDocument::empty(), None)
    }

    pub fn from_document(doc: NucleusDocument, path: Option<PathBuf>) -> Self {
        Self {
            path,
            doc,
            dirty: false,
        }
    }

    /// Attach a backing file; later mutations are written there.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self) -> &NucleusDocument {
        &self.doc
    }

    pub fn patterns(&self) -> &[FixPattern] {
        &self.doc.error_fixes
    }

    pub fn get(&self, id: &str) -> Option<&FixPattern> {
        self.doc.error_fixes.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.doc.error_fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.error_fixes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Patterns relevant to `diagnostic`, best first.
    pub fn match_fixes(&self, diagnostic: &str) -> Vec<FixPattern> {
        self.ranked_matches(diagnostic)
            .into_iter()
            .map(|m| m.pattern)
            .collect()
    }

    /// Like [`match_fixes`](Self::match_fixes) but keeps the scores.
    ///
    /// Equal scores keep store order.
    pub fn ranked_matches(&self, diagnostic: &str) -> Vec<PatternMatch> {
        let lowered = diagnostic.to_lowercase();
        let mut matches: Vec<PatternMatch> = self
            .doc
            .error_fixes
            .iter()
            .filter_map(|pattern| {
                let score = pattern.score(diagnostic, &lowered);
                (score > 0.0).then(|| PatternMatch {
                    pattern: pattern.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        debug!("{} nucleus patterns match diagnostic", matches.len());
        matches
    }

    /// Record the outcome of applying a pattern and flush.
    ///
    /// Returns the pattern's new confidence.
    pub fn record_outcome(&mut self, id: &str, success: bool) -> NucleusResult<f64> {
        let pattern = self
            .doc
            .error_fixes
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| NucleusError::PatternNotFound(id.to_string()))?;

        pattern.apply_outcome(success);
        let confidence = pattern.confidence;
        debug!(
            "Pattern {} {} -> confidence {:.2}",
            id,
            if success { "succeeded" } else { "failed" },
            confidence
        );

        self.touch();
        self.save()?;
        Ok(confidence)
    }

    /// Feed an observed fix back into the store.
    ///
    /// A pattern with the same signature, or with sufficiently overlapping
    /// keywords, is reinforced. Otherwise a new pattern is created only when
    /// the fix succeeded.
    pub fn learn(
        &mut self,
        error_text: &str,
        description: impl Into<String>,
        fix: FixAction,
        success: bool,
    ) -> NucleusResult<LearnOutcome> {
        let signature = derive_signature(error_text);
        if signature.is_empty() {
            return Ok(LearnOutcome::Discarded);
        }
        let keywords = extract_keywords(error_summary(error_text));

        let existing = self
            .doc
            .error_fixes
            .iter()
            .find(|p| {
                p.error_pattern == signature
                    || keyword_similarity(&p.keywords, &keywords) > SIMILARITY_THRESHOLD
            })
            .map(|p| p.id.clone());

        if let Some(id) = existing {
            self.record_outcome(&id, success)?;
            return Ok(LearnOutcome::Reinforced(id));
        }

        if !success {
            debug!("Discarding failed fix for novel error: {}", signature);
            return Ok(LearnOutcome::Discarded);
        }

        let id = format!("learned-{}", Uuid::new_v4());
        let mut pattern = FixPattern::new(id.clone(), signature, fix)
            .keywords(keywords)
            .description(description)
            .confidence(LEARNED_CONFIDENCE)
            .provenance(Provenance::Learned);
        pattern.success_count = 1;
        pattern.last_used = Some(Utc::now());

        info!("Learned new fix pattern {}", id);
        self.doc.error_fixes.push(pattern);
        self.touch();
        self.save()?;
        Ok(LearnOutcome::Created(id))
    }

    /// Add a user-authored pattern.
    pub fn add_pattern(&mut self, pattern: FixPattern) -> NucleusResult<()> {
        if self.get(&pattern.id).is_some() {
            return Err(NucleusError::PatternAlreadyExists(pattern.id));
        }
        self.doc.error_fixes.push(pattern);
        self.touch();
        self.save()?;
        Ok(())
    }

    /// Widget templates relevant to `query`, best first.
    pub fn find_widget_templates(&self, query: &str) -> Vec<&WidgetTemplate> {
        let terms = extract_keywords(query);
        let mut scored: Vec<(&WidgetTemplate, f64)> = self
            .doc
            .widget_templates
            .iter()
            .map(|t| (t, t.relevance(&terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.into_iter().map(|(t, _)| t).collect()
    }

    pub fn record_template_outcome(&mut self, id: &str, success: bool) -> NucleusResult<()> {
        let template = self
            .doc
            .widget_templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| NucleusError::TemplateNotFound(id.to_string()))?;
        template.apply_outcome(success);
        self.touch();
        self.save()?;
        Ok(())
    }

    /// Case-insensitive SDK API lookup.
    pub fn lookup_api(&self, name: &str) -> Option<&SdkApiNote> {
        self.doc
            .sdk_apis
            .iter()
            .find(|api| api.name.eq_ignore_ascii_case(name))
    }

    pub fn best_practices(&self, category: Option<&str>) -> Vec<&BestPractice> {
        self.doc
            .best_practices
            .iter()
            .filter(|bp| category.map_or(true, |c| bp.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        let patterns = &self.doc.error_fixes;
        let mut stats = StoreStats {
            total_patterns: patterns.len(),
            widget_templates: self.doc.widget_templates.len(),
            sdk_apis: self.doc.sdk_apis.len(),
            best_practices: self.doc.best_practices.len(),
            ..Default::default()
        };

        for pattern in patterns {
            *stats.by_provenance.entry(pattern.provenance).or_insert(0) += 1;
            stats.total_successes += pattern.success_count as u64;
            stats.total_failures += pattern.failure_count as u64;
        }

        if !patterns.is_empty() {
            stats.mean_confidence =
                patterns.iter().map(|p| p.confidence).sum::<f64>() / patterns.len() as f64;
        }

        stats.most_used = patterns
            .iter()
            .filter(|p| p.success_count + p.failure_count > 0)
            .max_by_key(|p| p.success_count + p.failure_count)
            .map(|p| p.id.clone());

        stats
    }

    /// Write the document if it changed since the last save.
    ///
    /// Returns whether anything was written.
    pub fn save(&mut self) -> NucleusResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(path) = self.path.clone() else {
            self.dirty = false;
            return Ok(false);
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.doc)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        self.dirty = false;
        debug!("Saved nucleus to {:?}", path);
        Ok(true)
    }

    fn touch(&mut self) {
        self.doc.last_updated = Utc::now();
        self.dirty = true;
    }
}

fn top_up_builtins(doc: &mut NucleusDocument) -> usize {
    let missing: Vec<FixPattern> = builtin_patterns()
        .into_iter()
        .filter(|b| !doc.error_fixes.iter().any(|p| p.id == b.id))
        .collect();
    let added = missing.len();
    doc.error_fixes.extend(missing);
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manual(text: &str) -> FixAction {
        FixAction::Manual {
            instructions: text.to_string(),
        }
    }

    #[test]
    fn test_load_missing_file_uses_builtins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("nucleus.json");
        let store = PatternStore::load(&path);
        assert_eq!(store.len(), builtin_patterns().len());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_corrupt_file_uses_builtins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nucleus.json");
        fs::write(&path, "{ not json").unwrap();
        let store = PatternStore::load(&path);
        assert_eq!(store.len(), builtin_patterns().len());
    }

    #[test]
    fn test_write_through_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".wforge").join("nucleus.json");

        let mut store = PatternStore::load(&path);
        store.record_outcome("builtin-react-import", true).unwrap();
        assert!(path.exists());
        assert!(!store.is_dirty());

        let reloaded = PatternStore::load(&path);
        let pattern = reloaded.get("builtin-react-import").unwrap();
        assert_eq!(pattern.success_count, 1);
        assert!((pattern.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_outcome_unknown_id() {
        let mut store = PatternStore::in_memory();
        assert!(matches!(
            store.record_outcome("nope", true),
            Err(NucleusError::PatternNotFound(_))
        ));
    }

    #[test]
    fn test_save_skips_clean_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nucleus.json");
        let mut store = PatternStore::load(&path);
        assert!(!store.save().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_learn_reinforces_similar() {
        let mut store = PatternStore::empty();
        let first = store
            .learn("Cannot find module 'classnames' from Badge.tsx", "install", manual("x"), true)
            .unwrap();
        let id = first.pattern_id().unwrap().to_string();

        let second = store
            .learn("Cannot find module 'classnames' from Rating.tsx", "install", manual("x"), true)
            .unwrap();
        assert_eq!(second, LearnOutcome::Reinforced(id.clone()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().success_count, 2);
    }

    #[test]
    fn test_learn_blank_text_discarded() {
        let mut store = PatternStore::empty();
        assert_eq!(
            store.learn("  \n ", "nothing", manual("x"), true).unwrap(),
            LearnOutcome::Discarded
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut store = PatternStore::in_memory();
        store.record_outcome("builtin-missing-build-script", true).unwrap();
        store.record_outcome("builtin-missing-build-script", false).unwrap();
        store
            .learn("Unexpected token in Badge.editorConfig.ts", "fix", manual("x"), true)
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_patterns, builtin_patterns().len() + 1);
        assert_eq!(stats.count(Provenance::Learned), 1);
        assert_eq!(stats.most_used.as_deref(), Some("builtin-missing-build-script"));
        assert!(stats.mean_confidence > 0.0);
    }

    #[test]
    fn test_auxiliary_records() {
        let mut store = PatternStore::in_memory();
        let templates = store.find_widget_templates("list of items from a datasource");
        assert_eq!(templates[0].id, "list-datasource");

        store.record_template_outcome("list-datasource", true).unwrap();
        assert!(store.record_template_outcome("missing", true).is_err());

        assert!(store.lookup_api("editablevalue").is_some());
        assert_eq!(store.best_practices(Some("TypeScript")).len(), 2);
        assert_eq!(store.best_practices(None).len(), builtin_best_practices().len());
    }
}
