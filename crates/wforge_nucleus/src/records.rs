//! Auxiliary nucleus records: widget templates, SDK notes, best practices.

use serde::{Deserialize, Serialize};

use crate::pattern::{FAILURE_PENALTY, MAX_CONFIDENCE, MIN_CONFIDENCE, SUCCESS_BOOST};

/// A known-good widget shape with a tracked outcome history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Property types the template is known to handle well.
    #[serde(default)]
    pub property_types: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub success_count: u32,
    #[serde(default)]
    pub failure_count: u32,
}

impl WidgetTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            description: String::new(),
            property_types: Vec::new(),
            keywords: Vec::new(),
            confidence: 0.8,
            success_count: 0,
            failure_count: 0,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(|k| k.into().to_lowercase()).collect();
        self
    }

    pub fn property_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn apply_outcome(&mut self, success: bool) {
        if success {
            self.success_count += 1;
            self.confidence = (self.confidence + SUCCESS_BOOST).min(MAX_CONFIDENCE);
        } else {
            self.failure_count += 1;
            self.confidence = (self.confidence - FAILURE_PENALTY).max(MIN_CONFIDENCE);
        }
    }

    /// Keyword overlap with the query terms, weighted by confidence.
    pub fn relevance(&self, terms: &[String]) -> f64 {
        let hits = terms
            .iter()
            .filter(|term| {
                self.keywords.iter().any(|k| k == *term)
                    || self.category.eq_ignore_ascii_case(term)
                    || self.property_types.iter().any(|t| t.eq_ignore_ascii_case(term))
            })
            .count();
        hits as f64 * self.confidence
    }
}

/// Usage notes for a pluggable-widget SDK API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SdkApiNote {
    pub name: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl SdkApiNote {
    pub fn new(name: impl Into<String>, module: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            usage: usage.into(),
            notes: Vec::new(),
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BestPractice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
}

impl BestPractice {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_relevance() {
        let template = WidgetTemplate::new("list", "List")
            .category("Data")
            .keywords(["list", "items"])
            .property_types(["datasource"]);
        let terms = vec!["items".to_string(), "datasource".to_string(), "chart".to_string()];
        assert!((template.relevance(&terms) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_template_outcome() {
        let mut template = WidgetTemplate::new("t", "T");
        template.apply_outcome(false);
        assert!((template.confidence - 0.7).abs() < 1e-9);
        assert_eq!(template.failure_count, 1);
    }
}
