//! Scripted package runner for tests.
//!
//! Installs and script runs each pop from their own response script, and
//! every call is recorded, so build loops run without Node.js installed.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ExecutionResult, PackageRunner};

/// Scripted result of one command.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// Files touched under the project dir when this response is served
    pub creates: Vec<PathBuf>,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::exited(0, stdout.into(), String::new())
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self::exited(exit_code, String::new(), stderr.into())
    }

    fn exited(exit_code: i64, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration_ms: 25,
            creates: Vec::new(),
        }
    }

    pub fn taking(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    /// Leave an empty file behind, e.g. `node_modules/...` or a `.mpk`.
    pub fn creating(mut self, relative: impl Into<PathBuf>) -> Self {
        self.creates.push(relative.into());
        self
    }
}

/// One recorded runner invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    Install {
        project_dir: PathBuf,
        packages: Vec<String>,
        dev: bool,
    },
    Script {
        project_dir: PathBuf,
        script: String,
    },
}

impl RunnerCall {
    pub fn project_dir(&self) -> &Path {
        match self {
            Self::Install { project_dir, .. } | Self::Script { project_dir, .. } => project_dir,
        }
    }
}

/// Responses served in order; once a script is down to its last response
/// that one repeats. An empty script always succeeds.
#[derive(Debug, Default)]
struct Script(VecDeque<MockResponse>);

impl Script {
    fn next(&mut self) -> MockResponse {
        match self.0.len() {
            0 => MockResponse::success(""),
            1 => self.0[0].clone(),
            _ => self.0.pop_front().unwrap_or_else(|| MockResponse::success("")),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    unavailable: bool,
    spawn_error: Option<String>,
    installs: Script,
    scripts: Script,
    calls: Vec<RunnerCall>,
    run_configs: Vec<RunConfig>,
}

/// Package runner that replays scripted responses.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the build loop owns another behind `Arc<dyn PackageRunner>`.
#[derive(Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the package manager as missing.
    pub fn unavailable(self) -> Self {
        self.state.lock().unavailable = true;
        self
    }

    /// Append a response for script runs (`build` included).
    pub fn add_script_response(self, response: MockResponse) -> Self {
        self.state.lock().scripts.0.push_back(response);
        self
    }

    pub fn with_script_responses(self, responses: Vec<MockResponse>) -> Self {
        self.state.lock().scripts = Script(responses.into());
        self
    }

    pub fn add_install_response(self, response: MockResponse) -> Self {
        self.state.lock().installs.0.push_back(response);
        self
    }

    /// Fail every call as if the package manager could not be spawned.
    pub fn failing_with(self, message: impl Into<String>) -> Self {
        self.state.lock().spawn_error = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.state.lock().calls.clone()
    }

    /// Options each call was made with, in call order.
    pub fn run_configs(&self) -> Vec<RunConfig> {
        self.state.lock().run_configs.clone()
    }

    /// Package lists of every install, in call order.
    pub fn installs(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                RunnerCall::Install { packages, .. } => Some(packages.clone()),
                RunnerCall::Script { .. } => None,
            })
            .collect()
    }

    /// Names of every script run, in call order.
    pub fn scripts(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                RunnerCall::Script { script, .. } => Some(script.clone()),
                RunnerCall::Install { .. } => None,
            })
            .collect()
    }

    fn serve(
        &self,
        call: RunnerCall,
        command: String,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let project_dir = call.project_dir().to_path_buf();
        let response = {
            let mut state = self.state.lock();
            let is_install = matches!(call, RunnerCall::Install { .. });
            state.calls.push(call);
            state.run_configs.push(run_config.clone());
            if let Some(message) = state.spawn_error.clone() {
                return Err(RunnerError::ExecutionFailed(message));
            }
            if is_install {
                state.installs.next()
            } else {
                state.scripts.next()
            }
        };

        for relative in &response.creates {
            let path = project_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, b"")?;
        }

        let finished_at = Utc::now();
        Ok(ExecutionResult {
            command,
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at: finished_at - chrono::Duration::milliseconds(response.duration_ms as i64),
            finished_at,
            duration_ms: response.duration_ms,
        })
    }
}

#[async_trait]
impl PackageRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_available(&self) -> RunnerResult<bool> {
        Ok(!self.state.lock().unavailable)
    }

    async fn install(
        &self,
        project_dir: &Path,
        packages: &[String],
        dev: bool,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let command = match packages {
            [] => "mock install".to_string(),
            _ => format!("mock install {}", packages.join(" ")),
        };
        let call = RunnerCall::Install {
            project_dir: project_dir.to_path_buf(),
            packages: packages.to_vec(),
            dev,
        };
        self.serve(call, command, run_config)
    }

    async fn run_script(
        &self,
        project_dir: &Path,
        script: &str,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let call = RunnerCall::Script {
            project_dir: project_dir.to_path_buf(),
            script: script.to_string(),
        };
        self.serve(call, format!("mock run {}", script), run_config)
    }
}
