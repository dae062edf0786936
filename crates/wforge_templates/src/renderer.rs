//! `{{variable}}` substitution.

use std::collections::HashMap;

use regex::Regex;

/// Renders text templates by replacing `{{name}}` placeholders.
pub struct TemplateRenderer {
    variable_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            variable_pattern: Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}")
                .expect("variable pattern is a valid regex"),
        }
    }

    /// Replace known variables; unknown placeholders are left untouched.
    pub fn render_content(&self, content: &str, variables: &HashMap<String, String>) -> String {
        self.variable_pattern
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                variables
                    .get(var_name)
                    .cloned()
                    .unwrap_or_else(|| format!("{{{{{}}}}}", var_name))
            })
            .to_string()
    }

    /// Placeholders in `content` that have no value in `variables`.
    pub fn unresolved(&self, content: &str, variables: &HashMap<String, String>) -> Vec<String> {
        self.variable_pattern
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .filter(|name| !variables.contains_key(name))
            .collect()
    }
}
