//! Generate-and-compile step of a build attempt.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;
use wforge_runner::{PackageRunner, RunConfig};
use wforge_spec::WidgetConfig;
use wforge_templates::{GenerateMode, WidgetGenerator, MANIFEST_FILE};

use crate::error::CoreResult;

/// Extension of a packaged widget.
pub const ARTIFACT_EXTENSION: &str = "mpk";

/// What one generate/compile step produced.
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    pub success: bool,
    /// Build output used to diagnose failures
    pub diagnostic: String,
    pub artifact: Option<PathBuf>,
}

impl ExecutionOutput {
    pub fn success(artifact: Option<PathBuf>) -> Self {
        Self {
            success: true,
            diagnostic: String::new(),
            artifact,
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostic: diagnostic.into(),
            artifact: None,
        }
    }
}

/// Produces and compiles a widget package in `output_dir`.
#[async_trait]
pub trait AttemptExecutor: Send + Sync {
    /// Run attempt number `attempt` (1-based). An `Err` is treated as a
    /// failed attempt whose diagnostic is the error message.
    async fn execute(
        &self,
        config: &WidgetConfig,
        output_dir: &Path,
        attempt: u32,
    ) -> CoreResult<ExecutionOutput>;
}

/// Generates the package with [`WidgetGenerator`] and builds it with a
/// [`PackageRunner`].
pub struct WidgetExecutor {
    generator: WidgetGenerator,
    runner: Arc<dyn PackageRunner>,
    run_config: RunConfig,
}

impl WidgetExecutor {
    pub fn new(runner: Arc<dyn PackageRunner>) -> Self {
        Self {
            generator: WidgetGenerator::new(),
            runner,
            run_config: RunConfig::default(),
        }
    }

    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    fn generate_mode(output_dir: &Path, attempt: u32) -> GenerateMode {
        if attempt <= 1 || !output_dir.join(MANIFEST_FILE).exists() {
            GenerateMode::Fresh
        } else {
            GenerateMode::PreserveExisting
        }
    }
}

#[async_trait]
impl AttemptExecutor for WidgetExecutor {
    async fn execute(
        &self,
        config: &WidgetConfig,
        output_dir: &Path,
        attempt: u32,
    ) -> CoreResult<ExecutionOutput> {
        let mode = Self::generate_mode(output_dir, attempt);
        let generated = self.generator.generate(config, output_dir, mode)?;
        debug!(
            "Generated {} file(s), preserved {}",
            generated.written.len(),
            generated.preserved.len()
        );

        if !output_dir.join("node_modules").exists() {
            info!("Installing dependencies with {}", self.runner.name());
            let install = self.runner.install(output_dir, &[], false, &self.run_config).await?;
            if !install.success() {
                return Ok(ExecutionOutput::failure(install.combined_output()));
            }
        }

        info!("Building {} with {}", config.component_name(), self.runner.name());
        let build = self.runner.build(output_dir, &self.run_config).await?;
        if !build.success() {
            return Ok(ExecutionOutput::failure(build.combined_output()));
        }

        Ok(ExecutionOutput::success(find_artifact(output_dir)))
    }
}

/// First packaged widget under `dist/`, in path order.
pub fn find_artifact(output_dir: &Path) -> Option<PathBuf> {
    WalkDir::new(output_dir.join("dist"))
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .find(|p| p.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION))
}
