//! Structured edit plans returned by the model.

use serde::{Deserialize, Serialize};

use crate::error::{AssistError, AssistResult};

/// Kind of edit a plan asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Replace,
    Prepend,
    Append,
    Create,
}

/// One file edit from a plan. Paths are relative to the widget root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedEdit {
    pub file: String,
    pub action: EditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl PlannedEdit {
    /// Text inserted by the edit: `content` for prepend/append/create,
    /// `replace` for replace (either field is accepted for both).
    pub fn payload(&self) -> Option<&str> {
        match self.action {
            EditAction::Replace => self.replace.as_deref().or(self.content.as_deref()),
            _ => self.content.as_deref().or(self.replace.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub fixes: Vec<PlannedEdit>,
    #[serde(default)]
    pub description: String,
}

impl EditPlan {
    /// Parse the first JSON object found in a model response.
    pub fn parse(response: &str) -> AssistResult<Self> {
        let json = extract_json_object(response)
            .ok_or_else(|| AssistError::InvalidPlan("no JSON object in response".to_string()))?;
        let plan: EditPlan = serde_json::from_str(json)?;
        if plan.fixes.is_empty() {
            return Err(AssistError::InvalidPlan("plan contains no fixes".to_string()));
        }
        Ok(plan)
    }

    /// Description for logs and fix history, falling back to the analysis.
    pub fn summary(&self) -> &str {
        if self.description.trim().is_empty() {
            self.analysis.trim()
        } else {
            self.description.trim()
        }
    }
}

/// Slice of `text` holding the first balanced `{...}` object.
///
/// Braces inside JSON strings are ignored, so code snippets in `replace`
/// values do not end the object early.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_fenced_response() {
        let text = "Here is the fix:\n```json\n{\"a\": {\"b\": \"}\"}}\n```\nDone.";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": \"}\"}}"));
    }

    #[test]
    fn test_extract_unbalanced() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_parse_plan() {
        let response = r#"Analysis follows.
{
  "analysis": "React is not imported",
  "fixes": [
    {"file": "src/Badge.tsx", "action": "prepend", "content": "import * as React from 'react';\n"},
    {"file": "src/Badge.tsx", "action": "replace", "search": "props.x", "replace": "props.x ?? ''"}
  ],
  "description": "Import React and guard x"
}"#;
        let plan = EditPlan::parse(response).unwrap();
        assert_eq!(plan.fixes.len(), 2);
        assert_eq!(plan.fixes[0].action, EditAction::Prepend);
        assert_eq!(plan.fixes[1].payload(), Some("props.x ?? ''"));
        assert_eq!(plan.summary(), "Import React and guard x");
    }

    #[test]
    fn test_parse_rejects_empty_plan() {
        assert!(matches!(
            EditPlan::parse(r#"{"analysis": "unsure", "fixes": []}"#),
            Err(AssistError::InvalidPlan(_))
        ));
        assert!(EditPlan::parse(r#"{"fixes": [{"file": "a", "action": "delete"}]}"#).is_err());
    }
}
