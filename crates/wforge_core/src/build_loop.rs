//! The self-healing build loop.
//!
//! Each iteration generates and compiles the widget. On failure the fix
//! chain is consulted once; an applied fix triggers another attempt, no fix
//! ends the loop early. Fixes that carried a learn candidate are promoted
//! into the nucleus only once an attempt succeeds.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use fs_extra::file::CopyOptions;
use tracing::{debug, info, info_span, warn, Instrument};
use wforge_fixes::{FixChain, FixContext, LearnCandidate};
use wforge_nucleus::SharedNucleus;
use wforge_spec::WidgetConfig;

use crate::attempt::{AppliedFix, AttemptOutcome, BuildAttempt, BuildEvent, ProgressHandler};
use crate::context::{BuildOptions, CancellationFlag};
use crate::error::{CoreError, CoreResult};
use crate::executor::{AttemptExecutor, ExecutionOutput};

const SUMMARY_DIAGNOSTIC_CHARS: usize = 1200;

/// Terminal state of a build loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded {
        output_dir: PathBuf,
        artifact: Option<PathBuf>,
        deployed_to: Option<PathBuf>,
    },
    Cancelled,
    /// Every attempt failed although fixes kept being applied
    Exhausted,
    /// An attempt failed and no strategy could apply a fix
    NoFixAvailable,
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Exhausted => "exhausted",
            Self::NoFixAvailable => "failed (no fix available)",
        };
        write!(f, "{}", s)
    }
}

/// Full history of one build loop invocation.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub widget: String,
    pub outcome: BuildOutcome,
    pub attempts: Vec<BuildAttempt>,
    /// Fixes in the order they were applied
    pub fixes: Vec<AppliedFix>,
    /// Suggestions collected from strategies when nothing could be applied
    pub suggestions: Option<String>,
}

impl BuildReport {
    fn new(widget: impl Into<String>) -> Self {
        Self {
            widget: widget.into(),
            outcome: BuildOutcome::Exhausted,
            attempts: Vec::new(),
            fixes: Vec::new(),
            suggestions: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, BuildOutcome::Succeeded { .. })
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn artifact(&self) -> Option<&Path> {
        match &self.outcome {
            BuildOutcome::Succeeded { artifact, .. } => artifact.as_deref(),
            _ => None,
        }
    }

    /// Diagnostics of all failed attempts, oldest first.
    pub fn diagnostics(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| a.outcome == AttemptOutcome::Failed)
            .map(|a| a.diagnostic_text.as_str())
            .collect()
    }

    pub fn last_diagnostic(&self) -> Option<&str> {
        self.diagnostics().last().copied()
    }

    /// User-facing summary: outcome, truncated last diagnostic and fixes.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Build of {} {} after {} attempt(s).\n",
            self.widget,
            self.outcome,
            self.attempt_count()
        );

        if !self.succeeded() {
            if let Some(diagnostic) = self.last_diagnostic() {
                out.push_str("\nLast error:\n");
                for line in truncate(diagnostic.trim(), SUMMARY_DIAGNOSTIC_CHARS).lines() {
                    out.push_str(&format!("  {}\n", line));
                }
            }
        }

        if !self.fixes.is_empty() {
            out.push_str("\nFixes applied:\n");
            for (i, fix) in self.fixes.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, fix));
            }
        }

        if let Some(suggestions) = self.suggestions.as_deref().filter(|s| !s.is_empty()) {
            out.push_str("\nSuggestions:\n");
            for line in suggestions.lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }
        out
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}\n...", &text[..end]),
        None => text.to_string(),
    }
}

/// Orchestrates attempts, fixes and learning for one widget at a time.
pub struct BuildLoop {
    executor: Arc<dyn AttemptExecutor>,
    chain: FixChain,
    nucleus: SharedNucleus,
    progress: Option<ProgressHandler>,
}

impl BuildLoop {
    pub fn new(executor: Arc<dyn AttemptExecutor>, chain: FixChain, nucleus: SharedNucleus) -> Self {
        Self {
            executor,
            chain,
            nucleus,
            progress: None,
        }
    }

    pub fn with_progress(mut self, handler: ProgressHandler) -> Self {
        self.progress = Some(handler);
        self
    }

    fn emit(&self, event: BuildEvent) {
        debug!("{}", event);
        if let Some(handler) = &self.progress {
            handler(&event);
        }
    }

    /// Build `config` until it succeeds, is cancelled, runs out of fixes or
    /// runs out of attempts. Only an unrunnable config is an error.
    pub async fn execute(
        &self,
        config: WidgetConfig,
        options: &BuildOptions,
        cancel: &CancellationFlag,
    ) -> CoreResult<BuildReport> {
        config
            .ensure_runnable()
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;

        let span = info_span!("build", widget = %config.component_name());
        Ok(self.run(config, options, cancel).instrument(span).await)
    }

    async fn run(
        &self,
        config: WidgetConfig,
        options: &BuildOptions,
        cancel: &CancellationFlag,
    ) -> BuildReport {
        let output_dir = options.widget_dir(&config);
        let max_attempts = options.max_attempts;
        let mut report = BuildReport::new(config.component_name());
        let mut pending: Vec<LearnCandidate> = Vec::new();

        info!(
            "Building {} into {:?} (max {} attempts)",
            config.component_name(),
            output_dir,
            max_attempts
        );

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                info!("Build cancelled before attempt {}", attempt);
                self.emit(BuildEvent::Cancelled { attempt });
                report.outcome = BuildOutcome::Cancelled;
                return report;
            }

            self.emit(BuildEvent::AttemptStarted {
                attempt,
                max_attempts,
            });
            let started_at = Utc::now();
            let timer = Instant::now();

            let output = match fs::create_dir_all(&options.work_folder) {
                Ok(()) => match self.executor.execute(&config, &output_dir, attempt).await {
                    Ok(output) => output,
                    Err(e) => ExecutionOutput::failure(e.to_string()),
                },
                Err(e) => ExecutionOutput::failure(format!(
                    "Cannot create work folder {}: {}",
                    options.work_folder.display(),
                    e
                )),
            };

            let mut record = BuildAttempt {
                attempt_number: attempt,
                config_snapshot: config.clone(),
                outcome: if output.success {
                    AttemptOutcome::Succeeded
                } else {
                    AttemptOutcome::Failed
                },
                diagnostic_text: output.diagnostic.clone(),
                fix_applied: None,
                started_at,
                duration_ms: timer.elapsed().as_millis() as u64,
            };

            if output.success {
                report.attempts.push(record);
                info!("Attempt {} succeeded", attempt);
                self.promote(&pending);
                self.emit(BuildEvent::Succeeded {
                    attempt,
                    artifact: output.artifact.clone(),
                });

                let deployed_to = match (&options.auto_deploy_target, &output.artifact) {
                    (Some(target), Some(artifact)) => self.deploy(artifact, target),
                    (Some(_), None) => {
                        warn!("No packaged artifact found to deploy");
                        None
                    }
                    _ => None,
                };

                report.outcome = BuildOutcome::Succeeded {
                    output_dir,
                    artifact: output.artifact,
                    deployed_to,
                };
                return report;
            }

            warn!("Attempt {}/{} failed", attempt, max_attempts);
            self.emit(BuildEvent::AttemptFailed {
                attempt,
                diagnostic: output.diagnostic.clone(),
            });

            if cancel.is_cancelled() {
                info!("Build cancelled during attempt {}", attempt);
                report.attempts.push(record);
                self.emit(BuildEvent::Cancelled { attempt });
                report.outcome = BuildOutcome::Cancelled;
                return report;
            }

            let context = FixContext::new(output.diagnostic, &output_dir, config.clone());
            let fix = self.chain.try_fix(&context).await;

            if !fix.applied {
                report.attempts.push(record);
                self.emit(BuildEvent::NoFixAvailable { attempt });
                report.suggestions = Some(fix.description);
                report.outcome = BuildOutcome::NoFixAvailable;
                return report;
            }

            let applied = AppliedFix::from_outcome(attempt, &fix);
            if let Some(candidate) = fix.learn_candidate {
                pending.push(candidate);
            }
            self.emit(BuildEvent::FixApplied {
                attempt,
                fix: applied.clone(),
            });
            record.fix_applied = Some(applied.clone());
            report.fixes.push(applied);
            report.attempts.push(record);
        }

        warn!("Giving up after {} attempts", max_attempts);
        self.emit(BuildEvent::Exhausted {
            attempts: max_attempts,
        });
        report.outcome = BuildOutcome::Exhausted;
        report
    }

    /// Feed fixes that led to a successful build back into the nucleus.
    fn promote(&self, pending: &[LearnCandidate]) {
        for candidate in pending {
            match self.nucleus.learn(
                &candidate.error_text,
                candidate.description.clone(),
                candidate.fix.clone(),
                true,
            ) {
                Ok(outcome) => debug!("Promoted fix '{}': {:?}", candidate.description, outcome),
                Err(e) => warn!("Failed to promote fix '{}': {}", candidate.description, e),
            }
        }
    }

    /// Copy the artifact into `target`. Failures are logged, not fatal.
    fn deploy(&self, artifact: &Path, target: &Path) -> Option<PathBuf> {
        let file_name = artifact.file_name()?;
        let destination = target.join(file_name);

        let result = fs::create_dir_all(target)
            .map_err(|e| CoreError::Deploy(e.to_string()))
            .and_then(|_| {
                fs_extra::file::copy(artifact, &destination, &CopyOptions::new().overwrite(true))
                    .map_err(|e| CoreError::Deploy(e.to_string()))
            });

        match result {
            Ok(_) => {
                info!("Deployed {:?} to {:?}", file_name, target);
                self.emit(BuildEvent::Deployed {
                    target: destination.clone(),
                });
                Some(destination)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_attempt(n: u32, diagnostic: &str) -> BuildAttempt {
        BuildAttempt {
            attempt_number: n,
            config_snapshot: WidgetConfig::new("Badge"),
            outcome: AttemptOutcome::Failed,
            diagnostic_text: diagnostic.to_string(),
            fix_applied: None,
            started_at: Utc::now(),
            duration_ms: 5,
        }
    }

    #[test]
    fn test_summary_lists_fixes_and_last_error() {
        let mut report = BuildReport::new("Badge");
        report.attempts.push(failed_attempt(1, "first error"));
        report.attempts.push(failed_attempt(2, &format!("second error\n{}", "x".repeat(5000))));
        report.fixes.push(AppliedFix {
            attempt: 1,
            strategy: "heuristic".to_string(),
            description: "Added the standard build scripts".to_string(),
            pattern_id: None,
        });

        let summary = report.summary();
        assert!(summary.starts_with("Build of Badge exhausted after 2 attempt(s)."));
        assert!(summary.contains("  second error"));
        assert!(!summary.contains("first error"));
        assert!(summary.contains("1. [heuristic] Added the standard build scripts"));
        assert!(summary.len() < 2000);
    }
}
