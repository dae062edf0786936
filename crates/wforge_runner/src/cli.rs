//! CLI-based package runner supporting npm, pnpm and yarn.
//!
//! The package manager is picked from the project's lockfile when present,
//! otherwise from a preference or whatever is installed.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{ExecutionResult, PackageRunner};

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    pub const ALL: [PackageManager; 3] = [Self::Npm, Self::Pnpm, Self::Yarn];

    /// Get the CLI command name.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    /// Lockfile written by this manager.
    pub fn lockfile(&self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Yarn => "yarn.lock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "npm" => Some(Self::Npm),
            "pnpm" => Some(Self::Pnpm),
            "yarn" => Some(Self::Yarn),
            _ => None,
        }
    }

    /// Manager implied by a lockfile in `project_dir`.
    pub fn from_lockfile(project_dir: &Path) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| project_dir.join(m.lockfile()).exists())
    }

    /// Arguments for installing `packages` (or everything when empty).
    pub fn install_args(&self, packages: &[String], dev: bool) -> Vec<String> {
        if packages.is_empty() {
            return vec!["install".to_string()];
        }
        let mut args = match self {
            Self::Npm => vec!["install".to_string()],
            Self::Pnpm | Self::Yarn => vec!["add".to_string()],
        };
        if dev {
            args.push(
                match self {
                    Self::Npm => "--save-dev",
                    Self::Pnpm => "-D",
                    Self::Yarn => "--dev",
                }
                .to_string(),
            );
        }
        args.extend(packages.iter().cloned());
        args
    }

    pub fn script_args(&self, script: &str) -> Vec<String> {
        vec!["run".to_string(), script.to_string()]
    }

    fn program(&self) -> String {
        if cfg!(windows) {
            format!("{}.cmd", self.command())
        } else {
            self.command().to_string()
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Output line from a running command.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: chrono::DateTime<Utc>,
    pub stream: LogStream,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Log handler callback type.
pub type LogHandler = Arc<dyn Fn(LogLine) + Send + Sync>;

/// CLI runner options.
#[derive(Debug, Clone)]
pub struct CliRunnerOptions {
    /// Preferred manager when the project has no lockfile
    pub preferred: Option<PackageManager>,
    /// Print commands without executing them
    pub dry_run: bool,
    /// Prefix streamed lines with timestamps
    pub ci_mode: bool,
}

impl Default for CliRunnerOptions {
    fn default() -> Self {
        Self {
            preferred: None,
            dry_run: false,
            ci_mode: std::env::var("CI").is_ok(),
        }
    }
}

impl CliRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer(mut self, manager: PackageManager) -> Self {
        self.preferred = Some(manager);
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn ci_mode(mut self) -> Self {
        self.ci_mode = true;
        self
    }
}

/// Whether `program --version` runs and exits cleanly.
async fn program_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Package runner that shells out to the package-manager CLI.
pub struct CliRunner {
    manager: PackageManager,
    options: CliRunnerOptions,
    log_handler: Option<LogHandler>,
}

impl CliRunner {
    /// Create a runner, detecting an installed package manager.
    pub async fn new(options: CliRunnerOptions) -> RunnerResult<Self> {
        let manager = Self::detect_manager(&options).await?;
        info!("Using package manager: {}", manager);
        Ok(Self {
            manager,
            options,
            log_handler: None,
        })
    }

    /// Create a runner for a specific manager without checking it is installed.
    pub fn with_manager(manager: PackageManager, options: CliRunnerOptions) -> Self {
        Self {
            manager,
            options,
            log_handler: None,
        }
    }

    pub fn with_log_handler(mut self, handler: LogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }

    pub fn manager(&self) -> PackageManager {
        self.manager
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// Detect an available package manager, preferred one first.
    pub async fn detect_manager(options: &CliRunnerOptions) -> RunnerResult<PackageManager> {
        if let Some(preferred) = options.preferred {
            if Self::is_manager_available(preferred).await {
                return Ok(preferred);
            }
            warn!("Preferred package manager {} not available, trying alternatives", preferred);
        }

        for manager in PackageManager::ALL {
            if Self::is_manager_available(manager).await {
                return Ok(manager);
            }
        }
        Err(RunnerError::ManagerNotAvailable(
            "None of npm, pnpm or yarn is available".to_string(),
        ))
    }

    async fn is_manager_available(manager: PackageManager) -> bool {
        program_available(&manager.program()).await
    }

    /// Manager to use for a given project: lockfile wins over the default.
    async fn manager_for(&self, project_dir: &Path) -> PackageManager {
        match PackageManager::from_lockfile(project_dir) {
            Some(m) if m != self.manager && Self::is_manager_available(m).await => {
                debug!("Lockfile selects {} for {:?}", m, project_dir);
                m
            }
            _ => self.manager,
        }
    }

    fn format_command(manager: PackageManager, args: &[String]) -> String {
        let mut cmd = manager.command().to_string();
        for arg in args {
            if arg.contains(' ') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }

    async fn execute(
        &self,
        project_dir: &Path,
        args: Vec<String>,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        if !project_dir.is_dir() {
            return Err(RunnerError::ProjectNotFound(project_dir.display().to_string()));
        }

        let manager = self.manager_for(project_dir).await;
        let cmd_str = Self::format_command(manager, &args);

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute in {:?}: {}", project_dir, cmd_str);
            let now = Utc::now();
            return Ok(ExecutionResult {
                command: cmd_str.clone(),
                exit_code: 0,
                stdout: format!("[DRY-RUN] Command: {}", cmd_str),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        debug!("Executing in {:?}: {}", project_dir, cmd_str);

        let mut child = Command::new(manager.program())
            .args(&args)
            .current_dir(project_dir)
            .envs(&run_config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::ExecutionFailed(format!("Failed to spawn {}: {}", manager, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr not captured".to_string()))?;

        let stdout_task = self.collect(stdout, LogStream::Stdout, run_config.stream_logs);
        let stderr_task = self.collect(stderr, LogStream::Stderr, run_config.stream_logs);

        let started_at = Utc::now();
        let status = if run_config.timeout_seconds > 0 {
            let limit = Duration::from_secs(run_config.timeout_seconds);
            match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    let _ = child.kill().await;
                    warn!("{} timed out after {}s", cmd_str, run_config.timeout_seconds);
                    return Err(RunnerError::Timeout(run_config.timeout_seconds));
                }
            }
        } else {
            child.wait().await?
        };
        let finished_at = Utc::now();

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();
        let exit_code = status.code().unwrap_or(-1) as i64;
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        if exit_code == 0 {
            info!("{} completed in {}ms", cmd_str, duration_ms);
        } else {
            warn!("{} failed with exit code {} after {}ms", cmd_str, exit_code, duration_ms);
        }

        Ok(ExecutionResult {
            command: cmd_str,
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
        })
    }

    fn collect<R>(&self, reader: R, stream: LogStream, echo: bool) -> JoinHandle<String>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let ci_mode = self.options.ci_mode;
        let handler = self.log_handler.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            let mut output = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                output.push_str(&line);
                output.push('\n');
                if echo {
                    let log_line = LogLine {
                        timestamp: Utc::now(),
                        stream,
                        message: line,
                    };
                    if ci_mode {
                        println!(
                            "[{}] [{}] {}",
                            log_line.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                            stream,
                            log_line.message
                        );
                    } else {
                        match stream {
                            LogStream::Stdout => println!("{}", log_line.message),
                            LogStream::Stderr => eprintln!("{}", log_line.message),
                        }
                    }
                    if let Some(handler) = &handler {
                        handler(log_line);
                    }
                }
            }
            output
        })
    }
}

#[async_trait]
impl PackageRunner for CliRunner {
    fn name(&self) -> &str {
        self.manager.command()
    }

    async fn is_available(&self) -> RunnerResult<bool> {
        Ok(Self::is_manager_available(self.manager).await)
    }

    async fn install(
        &self,
        project_dir: &Path,
        packages: &[String],
        dev: bool,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        if packages.is_empty() {
            info!("Installing dependencies in {:?}", project_dir);
        } else {
            info!("Installing {} in {:?}", packages.join(" "), project_dir);
        }
        let args = self.manager_for(project_dir).await.install_args(packages, dev);
        self.execute(project_dir, args, run_config).await
    }

    async fn run_script(
        &self,
        project_dir: &Path,
        script: &str,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        info!("Running script '{}' in {:?}", script, project_dir);
        let args = self.manager_for(project_dir).await.script_args(script);
        self.execute(project_dir, args, run_config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_install_args() {
        let packages = vec!["classnames".to_string()];
        assert_eq!(PackageManager::Npm.install_args(&[], false), vec!["install"]);
        assert_eq!(
            PackageManager::Npm.install_args(&packages, true),
            vec!["install", "--save-dev", "classnames"]
        );
        assert_eq!(
            PackageManager::Yarn.install_args(&packages, true),
            vec!["add", "--dev", "classnames"]
        );
        assert_eq!(PackageManager::Pnpm.install_args(&packages, false), vec!["add", "classnames"]);
    }

    #[test]
    fn test_lockfile_detection() {
        let dir = tempdir().unwrap();
        assert_eq!(PackageManager::from_lockfile(dir.path()), None);
        std::fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(PackageManager::from_lockfile(dir.path()), Some(PackageManager::Yarn));
    }

    #[test]
    fn test_parse() {
        assert_eq!(PackageManager::parse(" PNPM "), Some(PackageManager::Pnpm));
        assert_eq!(PackageManager::parse("bun"), None);
    }

    #[tokio::test]
    async fn test_dry_run_mode() {
        let dir = tempdir().unwrap();
        let runner = CliRunner::with_manager(PackageManager::Npm, CliRunnerOptions::new().dry_run());
        assert!(runner.is_dry_run());

        let result = runner.build(dir.path(), &RunConfig::default()).await.unwrap();
        assert!(result.success());
        assert_eq!(result.command, "npm run build");
    }

    #[tokio::test]
    async fn test_missing_program_unavailable() {
        assert!(!program_available("wforge-no-such-package-manager").await);
    }

    #[tokio::test]
    async fn test_lockfile_for_same_manager_kept() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package-lock.json"), "{}").unwrap();
        let runner = CliRunner::with_manager(PackageManager::Npm, CliRunnerOptions::new().dry_run());
        assert_eq!(runner.manager_for(dir.path()).await, PackageManager::Npm);
    }

    #[tokio::test]
    async fn test_missing_project_dir() {
        let dir = tempdir().unwrap();
        let runner = CliRunner::with_manager(PackageManager::Npm, CliRunnerOptions::new().dry_run());
        let result = runner
            .build(&dir.path().join("absent"), &RunConfig::default())
            .await;
        assert!(matches!(result, Err(RunnerError::ProjectNotFound(_))));
    }
}
