//! Attempt records and progress events.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use wforge_fixes::FixOutcome;
use wforge_spec::WidgetConfig;

/// Result of one generate/compile attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed,
}

/// A fix applied between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFix {
    pub attempt: u32,
    pub strategy: String,
    pub description: String,
    pub pattern_id: Option<String>,
}

impl AppliedFix {
    pub fn from_outcome(attempt: u32, outcome: &FixOutcome) -> Self {
        Self {
            attempt,
            strategy: outcome.strategy.clone(),
            description: outcome.description.clone(),
            pattern_id: outcome.pattern_id.clone(),
        }
    }
}

impl fmt::Display for AppliedFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.strategy, self.description)
    }
}

/// One iteration of the build loop.
#[derive(Debug, Clone)]
pub struct BuildAttempt {
    pub attempt_number: u32,
    pub config_snapshot: WidgetConfig,
    pub outcome: AttemptOutcome,
    pub diagnostic_text: String,
    pub fix_applied: Option<AppliedFix>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Progress notifications emitted by the build loop.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    AttemptStarted { attempt: u32, max_attempts: u32 },
    AttemptFailed { attempt: u32, diagnostic: String },
    FixApplied { attempt: u32, fix: AppliedFix },
    NoFixAvailable { attempt: u32 },
    Succeeded { attempt: u32, artifact: Option<PathBuf> },
    Deployed { target: PathBuf },
    Cancelled { attempt: u32 },
    Exhausted { attempts: u32 },
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttemptStarted {
                attempt,
                max_attempts,
            } => write!(f, "Attempt {}/{}", attempt, max_attempts),
            Self::AttemptFailed { attempt, diagnostic } => write!(
                f,
                "Attempt {} failed: {}",
                attempt,
                diagnostic.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
            ),
            Self::FixApplied { fix, .. } => write!(f, "Applied fix {}", fix),
            Self::NoFixAvailable { attempt } => write!(f, "No fix available after attempt {}", attempt),
            Self::Succeeded { attempt, artifact } => match artifact {
                Some(path) => write!(f, "Build succeeded on attempt {}: {}", attempt, path.display()),
                None => write!(f, "Build succeeded on attempt {}", attempt),
            },
            Self::Deployed { target } => write!(f, "Deployed to {}", target.display()),
            Self::Cancelled { attempt } => write!(f, "Cancelled during attempt {}", attempt),
            Self::Exhausted { attempts } => write!(f, "Gave up after {} attempts", attempts),
        }
    }
}

/// Callback receiving build events.
pub type ProgressHandler = Arc<dyn Fn(&BuildEvent) + Send + Sync>;
