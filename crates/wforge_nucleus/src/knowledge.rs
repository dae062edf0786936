//! Append-only knowledge cache.
//!
//! Research notes and fixes that were not (yet) turned into patterns live in a
//! JSONL file, one [`KnowledgeEntry`] per line. Entries are never re-weighted.

use std::cmp::Ordering;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::NucleusResult;
use crate::signature::extract_keywords;

/// How much an entry's source is trusted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    #[default]
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn weight(&self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.7,
            Self::Low => 0.4,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub provenance: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub confidence: ConfidenceTier,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl KnowledgeEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: String::new(),
            content: content.into(),
            provenance: "user".to_string(),
            timestamp: Utc::now(),
            confidence: ConfidenceTier::Medium,
            tags: Vec::new(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    pub fn confidence(mut self, tier: ConfidenceTier) -> Self {
        self.confidence = tier;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }

    /// Overlap score against query keywords, weighted by tier.
    pub fn score(&self, keywords: &[String]) -> f64 {
        let title = self.title.to_lowercase();
        let content = self.content.to_lowercase();

        let tag_hits = keywords
            .iter()
            .filter(|k| self.tags.iter().any(|t| t == *k))
            .count();
        let text_hits = keywords
            .iter()
            .filter(|k| title.contains(k.as_str()) || content.contains(k.as_str()))
            .count();

        (2 * tag_hits + text_hits) as f64 * self.confidence.weight()
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeMatch {
    pub entry: KnowledgeEntry,
    pub score: f64,
}

/// Knowledge entries loaded from (and appended to) a JSONL file.
#[derive(Debug, Default)]
pub struct KnowledgeCache {
    path: Option<PathBuf>,
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeCache {
    /// Load entries from `path`. Unparseable lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> NucleusResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = Vec::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<KnowledgeEntry>(&line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!("Skipping knowledge line {} in {:?}: {}", index + 1, path, e),
                }
            }
            debug!("Loaded {} knowledge entries from {:?}", entries.len(), path);
        }

        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, writing it through to the backing file.
    pub fn append(&mut self, entry: KnowledgeEntry) -> NucleusResult<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            let json = serde_json::to_string(&entry)?;
            writeln!(file, "{}", json)?;
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Entries relevant to `query`, best first, at most `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<KnowledgeMatch> {
        let keywords = extract_keywords(query);
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<KnowledgeMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = entry.score(&keywords);
                (score > 0.0).then(|| KnowledgeMatch {
                    entry: entry.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(limit);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".wforge").join("knowledge.jsonl");

        let mut cache = KnowledgeCache::load(&path).unwrap();
        assert!(cache.is_empty());
        cache
            .append(KnowledgeEntry::new("React import", "Add import * as React").tags(["react"]))
            .unwrap();
        cache
            .append(KnowledgeEntry::new("Scripts", "Add a build script").tags(["build"]))
            .unwrap();

        let reloaded = KnowledgeCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[1].title, "Scripts");
    }

    #[test]
    fn test_bad_lines_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("knowledge.jsonl");
        let good = serde_json::to_string(&KnowledgeEntry::new("ok", "fine")).unwrap();
        fs::write(&path, format!("garbage\n{}\n\n", good)).unwrap();

        let cache = KnowledgeCache::load(&path).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_search_weights_tags_and_tiers() {
        let mut cache = KnowledgeCache::in_memory();
        cache
            .append(
                KnowledgeEntry::new("Datasource loading", "ListValue items are undefined while loading")
                    .tags(["datasource"])
                    .confidence(ConfidenceTier::Low),
            )
            .unwrap();
        cache
            .append(
                KnowledgeEntry::new("Datasource items", "Check status before reading items")
                    .tags(["datasource", "items"])
                    .confidence(ConfidenceTier::High),
            )
            .unwrap();
        cache
            .append(KnowledgeEntry::new("Styling", "Prefix classes").tags(["css"]))
            .unwrap();

        let results = cache.search("datasource items undefined", 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.title, "Datasource items");
        assert!(cache.search("datasource", 1).len() == 1);
        assert!(cache.search("", 5).is_empty());
    }
}
