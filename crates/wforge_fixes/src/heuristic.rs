//! Rule-based fixes for the most common widget build failures.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};
use wforge_nucleus::{FixAction, SharedNucleus};
use wforge_runner::{PackageRunner, RunConfig};
use wforge_templates::STANDARD_SCRIPTS;

use crate::apply::apply_fix_action;
use crate::error::FixResult;
use crate::strategy::{FixContext, FixOutcome, FixStrategy};

const REACT_IMPORT: &str = "import * as React from 'react';";
const CREATE_ELEMENT_IMPORT: &str = "import { createElement } from 'react';";
const NULL_SAFETY_MARKERS: [&str; 5] = [
    "possibly 'undefined'",
    "possibly 'null'",
    "TS2531",
    "TS2532",
    "TS18048",
];

/// A fix chosen by the rule table, before it is applied.
#[derive(Debug, Clone, PartialEq)]
enum Rule {
    InstallPackage(String),
    ReactImport(&'static str),
    StandardScripts,
    ManualReview,
}

/// Fixed rule table over the diagnostic text.
pub struct HeuristicStrategy {
    nucleus: SharedNucleus,
    runner: Option<Arc<dyn PackageRunner>>,
    run_config: RunConfig,
}

impl HeuristicStrategy {
    pub fn new(nucleus: SharedNucleus) -> Self {
        Self {
            nucleus,
            runner: None,
            run_config: RunConfig::default(),
        }
    }

    /// Install missing packages through `runner` instead of only reporting them.
    pub fn with_runner(mut self, runner: Arc<dyn PackageRunner>, run_config: RunConfig) -> Self {
        self.runner = Some(runner);
        self.run_config = run_config;
        self
    }

    fn select_rule(diagnostic: &str) -> Option<Rule> {
        if let Some(package) = missing_package(diagnostic) {
            return Some(Rule::InstallPackage(package));
        }
        if diagnostic.contains("Cannot find name 'React'") {
            return Some(Rule::ReactImport(REACT_IMPORT));
        }
        if diagnostic.contains("refers to a UMD global") {
            return Some(Rule::ReactImport(CREATE_ELEMENT_IMPORT));
        }
        if Regex::new(r#"Missing script:\s*"?(build|dev)\b"#)
            .ok()
            .is_some_and(|re| re.is_match(diagnostic))
        {
            return Some(Rule::StandardScripts);
        }
        if NULL_SAFETY_MARKERS.iter().any(|m| diagnostic.contains(m)) {
            return Some(Rule::ManualReview);
        }
        None
    }

    async fn install(&self, widget_path: &Path, package: &str) -> FixResult<bool> {
        let Some(runner) = &self.runner else {
            return Ok(false);
        };
        let result = runner
            .install(widget_path, &[package.to_string()], false, &self.run_config)
            .await?;
        if !result.success() {
            warn!("Installing {} failed with exit code {}", package, result.exit_code);
        }
        Ok(result.success())
    }

    fn apply_and_learn(&self, context: &FixContext, fix: FixAction, description: String) -> FixOutcome {
        match apply_fix_action(context.widget_path(), &fix) {
            Ok(report) if report.applied => {
                info!("{} ({})", description, report.detail);
                self.learn(context, &description, fix);
                FixOutcome::applied(self.name(), description)
            }
            Ok(report) => FixOutcome::not_applied(self.name(), report.detail),
            Err(e) => {
                warn!("Heuristic fix failed: {}", e);
                FixOutcome::not_applied(self.name(), e.to_string())
            }
        }
    }

    fn learn(&self, context: &FixContext, description: &str, fix: FixAction) {
        if let Err(e) = self.nucleus.learn(&context.diagnostic, description, fix, true) {
            warn!("Failed to learn heuristic fix: {}", e);
        }
    }
}

/// Bare package named by a `Cannot find module 'x'` error, reduced to its
/// package name (`@scope/pkg/sub` becomes `@scope/pkg`). Relative and
/// absolute imports are ignored.
fn missing_package(diagnostic: &str) -> Option<String> {
    let re = Regex::new(r#"Cannot find module ['"]([^'"]+)['"]"#).ok()?;
    let specifier = re.captures(diagnostic)?.get(1)?.as_str();
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }

    let mut segments = specifier.split('/');
    let first = segments.next()?;
    let package = if first.starts_with('@') {
        format!("{}/{}", first, segments.next()?)
    } else {
        first.to_string()
    };
    Some(package)
}

#[async_trait]
impl FixStrategy for HeuristicStrategy {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn try_fix(&self, context: &FixContext) -> FixOutcome {
        let Some(rule) = Self::select_rule(&context.diagnostic) else {
            return FixOutcome::not_applied(self.name(), "no heuristic rule matches");
        };
        debug!("Heuristic rule selected: {:?}", rule);

        match rule {
            Rule::InstallPackage(package) => {
                let fix = FixAction::DependencyAdd {
                    packages: vec![package.clone()],
                    dev: false,
                };
                match self.install(context.widget_path(), &package).await {
                    Ok(true) => {
                        let description = format!("Installed missing package {}", package);
                        info!("{}", description);
                        self.learn(context, &description, fix);
                        FixOutcome::applied(self.name(), description)
                    }
                    Ok(false) => FixOutcome::not_applied(
                        self.name(),
                        format!(
                            "run `{}`",
                            fix.install_command().unwrap_or_else(|| package.clone())
                        ),
                    ),
                    Err(e) => {
                        warn!("Install of {} failed: {}", package, e);
                        FixOutcome::not_applied(self.name(), format!("install {} failed: {}", package, e))
                    }
                }
            }
            Rule::ReactImport(import) => {
                let fix = FixAction::prepend("**/*.tsx", import);
                self.apply_and_learn(context, fix, format!("Added `{}` to component sources", import))
            }
            Rule::StandardScripts => {
                let fix = FixAction::scripts(STANDARD_SCRIPTS);
                self.apply_and_learn(context, fix, "Added the standard build scripts".to_string())
            }
            Rule::ManualReview => FixOutcome::not_applied(
                self.name(),
                "null-safety error flagged for manual review",
            ),
        }
    }
}
