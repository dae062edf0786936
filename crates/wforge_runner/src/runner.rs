//! Package runner trait and types.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::RunnerResult;

/// Result of one package-manager command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The command line that was run
    pub command: String,
    /// Process exit code (-1 when killed by a signal)
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output (stdout followed by stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Boundary to the JavaScript package manager.
#[async_trait]
pub trait PackageRunner: Send + Sync {
    /// Name of the underlying tool, e.g. "npm".
    fn name(&self) -> &str;

    /// Check if the package manager can be invoked.
    async fn is_available(&self) -> RunnerResult<bool>;

    /// Install dependencies. An empty `packages` list installs everything
    /// declared in the manifest.
    async fn install(
        &self,
        project_dir: &Path,
        packages: &[String],
        dev: bool,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult>;

    /// Run a script declared in the manifest.
    async fn run_script(
        &self,
        project_dir: &Path,
        script: &str,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult>;

    /// Compile and package the widget.
    async fn build(&self, project_dir: &Path, run_config: &RunConfig) -> RunnerResult<ExecutionResult> {
        self.run_script(project_dir, "build", run_config).await
    }
}
