//! Build options and cooperative cancellation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wforge_spec::WidgetConfig;

/// Attempts per build unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Options for one build loop invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Folder that receives one sub-directory per widget package
    pub work_folder: PathBuf,
    /// Generate/compile attempts before giving up
    pub max_attempts: u32,
    /// Directory the packaged artifact is copied to on success
    pub auto_deploy_target: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            work_folder: PathBuf::from("widgets"),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            auto_deploy_target: None,
        }
    }
}

impl BuildOptions {
    pub fn new(work_folder: impl Into<PathBuf>) -> Self {
        Self {
            work_folder: work_folder.into(),
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_deploy_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.auto_deploy_target = Some(target.into());
        self
    }

    /// Where the package for `config` is generated.
    pub fn widget_dir(&self, config: &WidgetConfig) -> PathBuf {
        self.work_folder.join(config.package_name())
    }

    pub fn work_folder(&self) -> &Path {
        &self.work_folder
    }
}

/// Shared flag checked between build steps. Setting it never interrupts a
/// step that is already running.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_dir_uses_package_name() {
        let options = BuildOptions::new("/tmp/widgets");
        let config = WidgetConfig::new("Task List");
        assert_eq!(options.widget_dir(&config), PathBuf::from("/tmp/widgets/tasklist"));
        assert_eq!(options.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_cancellation_is_shared() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!flag.is_cancelled());
        other.cancel();
        assert!(flag.is_cancelled());
        flag.reset();
        assert!(!other.is_cancelled());
    }
}
