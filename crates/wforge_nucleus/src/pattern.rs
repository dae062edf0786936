//! Fix patterns: the unit of learned repair knowledge.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest confidence a pattern can decay to. Patterns are never deleted.
pub const MIN_CONFIDENCE: f64 = 0.1;
/// Highest confidence a pattern can reach.
pub const MAX_CONFIDENCE: f64 = 1.0;
/// Confidence gained per observed success.
pub const SUCCESS_BOOST: f64 = 0.05;
/// Confidence lost per observed failure.
pub const FAILURE_PENALTY: f64 = 0.10;
/// Starting confidence of a pattern learned from a single success.
pub const LEARNED_CONFIDENCE: f64 = 0.7;
/// Patterns below this confidence are never applied automatically.
pub const AUTO_APPLY_THRESHOLD: f64 = 0.7;

/// Score contributed by an exact error-signature match.
pub const SIGNATURE_WEIGHT: f64 = 10.0;
/// Score contributed by each keyword found in the diagnostic.
pub const KEYWORD_WEIGHT: f64 = 2.0;

/// Where a pattern came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Builtin,
    Learned,
    User,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Builtin => "builtin",
            Self::Learned => "learned",
            Self::User => "user",
        };
        write!(f, "{}", s)
    }
}

/// Typed repair action carried by a pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FixAction {
    /// Edit files matching `file` (a glob relative to the widget source dir).
    /// An empty `search` prepends `replace` unless it is already present.
    FileEdit {
        file: String,
        #[serde(default)]
        search: String,
        #[serde(default)]
        replace: String,
    },
    /// Ensure the given script entries exist in the package manifest.
    ConfigChange { scripts: BTreeMap<String, String> },
    /// Packages that must be installed. Never executed automatically.
    DependencyAdd {
        packages: Vec<String>,
        #[serde(default)]
        dev: bool,
    },
    /// Requires human judgment.
    Manual { instructions: String },
}

impl FixAction {
    pub fn file_edit(
        file: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self::FileEdit {
            file: file.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }

    pub fn prepend(file: impl Into<String>, content: impl Into<String>) -> Self {
        Self::file_edit(file, "", content)
    }

    pub fn scripts<I, K, V>(scripts: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::ConfigChange {
            scripts: scripts
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileEdit { .. } => "file-edit",
            Self::ConfigChange { .. } => "config-change",
            Self::DependencyAdd { .. } => "dependency-add",
            Self::Manual { .. } => "manual",
        }
    }

    /// Shell command a human would run for a `dependency-add` fix.
    pub fn install_command(&self) -> Option<String> {
        match self {
            Self::DependencyAdd { packages, dev } if !packages.is_empty() => Some(format!(
                "npm install {}{}",
                if *dev { "--save-dev " } else { "" },
                packages.join(" ")
            )),
            _ => None,
        }
    }
}

/// A learned or builtin repair strategy keyed by an error signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FixPattern {
    pub id: String,
    /// Substring that identifies the error in diagnostic output.
    pub error_pattern: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub fix: FixAction,
    #[serde(default)]
    pub description: String,
    pub confidence: f64,
    #[serde(default)]
    pub success_count: u32,
    #[serde(default)]
    pub failure_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    pub provenance: Provenance,
}

impl FixPattern {
    pub fn new(id: impl Into<String>, error_pattern: impl Into<String>, fix: FixAction) -> Self {
        Self {
            id: id.into(),
            error_pattern: error_pattern.into(),
            keywords: Vec::new(),
            fix,
            description: String::new(),
            confidence: LEARNED_CONFIDENCE,
            success_count: 0,
            failure_count: 0,
            last_used: None,
            provenance: Provenance::User,
        }
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(|k| k.into().to_lowercase()).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
        self
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Nudge confidence by an observed outcome and bump the matching counter.
    pub fn apply_outcome(&mut self, success: bool) {
        if success {
            self.success_count += 1;
            self.confidence = (self.confidence + SUCCESS_BOOST).min(MAX_CONFIDENCE);
        } else {
            self.failure_count += 1;
            self.confidence = (self.confidence - FAILURE_PENALTY).max(MIN_CONFIDENCE);
        }
        self.last_used = Some(Utc::now());
    }

    /// Lexical score before confidence weighting.
    ///
    /// `lowered` must be the lowercase form of `diagnostic`.
    pub fn raw_score(&self, diagnostic: &str, lowered: &str) -> f64 {
        let mut score = 0.0;
        if !self.error_pattern.is_empty() && diagnostic.contains(&self.error_pattern) {
            score += SIGNATURE_WEIGHT;
        }
        let hits = self
            .keywords
            .iter()
            .filter(|k| !k.is_empty() && lowered.contains(k.to_lowercase().as_str()))
            .count();
        score + hits as f64 * KEYWORD_WEIGHT
    }

    /// Final ranking score: raw score weighted by confidence and track record.
    pub fn score(&self, diagnostic: &str, lowered: &str) -> f64 {
        let raw = self.raw_score(diagnostic, lowered);
        raw * self.confidence * (1.0 + self.success_count as f64 / 10.0)
    }

    /// Whether the pattern is trusted enough to be applied without review.
    pub fn auto_applicable(&self) -> bool {
        self.confidence >= AUTO_APPLY_THRESHOLD
    }

    /// Observed success ratio, if the pattern has been used at all.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            None
        } else {
            Some(self.success_count as f64 / total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_bounds() {
        let mut pattern = FixPattern::new("p", "boom", FixAction::Manual {
            instructions: "look".into(),
        })
        .confidence(0.98);

        pattern.apply_outcome(true);
        assert_eq!(pattern.confidence, MAX_CONFIDENCE);
        assert_eq!(pattern.success_count, 1);

        let mut low = pattern.clone().confidence(0.15);
        low.apply_outcome(false);
        assert_eq!(low.confidence, MIN_CONFIDENCE);
        assert_eq!(low.failure_count, 1);
        assert!(low.last_used.is_some());
    }

    #[test]
    fn test_scoring() {
        let pattern = FixPattern::new(
            "react",
            "Cannot find name 'React'",
            FixAction::prepend("**/*.tsx", "import * as React from 'react';"),
        )
        .keywords(["react", "jsx"])
        .confidence(1.0);

        let text = "src/Badge.tsx(3,5): error TS2304: Cannot find name 'React'.";
        let score = pattern.score(text, &text.to_lowercase());
        assert_eq!(score, SIGNATURE_WEIGHT + KEYWORD_WEIGHT);

        let unrelated = "Module parse failed";
        assert_eq!(pattern.score(unrelated, &unrelated.to_lowercase()), 0.0);
    }

    #[test]
    fn test_action_serialization() {
        let action = FixAction::scripts([("build", "pluggable-widgets-tools build:web")]);
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""type":"config-change""#));

        let parsed: FixAction =
            serde_json::from_str(r#"{"type":"file-edit","file":"src/*.tsx","replace":"x"}"#)
                .unwrap();
        assert_eq!(parsed, FixAction::prepend("src/*.tsx", "x"));
    }

    #[test]
    fn test_install_command() {
        let action = FixAction::DependencyAdd {
            packages: vec!["classnames".into()],
            dev: false,
        };
        assert_eq!(action.install_command().as_deref(), Some("npm install classnames"));
    }
}
