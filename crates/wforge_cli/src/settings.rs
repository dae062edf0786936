//! `wforge.toml` settings with environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wforge_assist::{DiagnosisHelper, LlmAdapter, LlmProvider};
use wforge_core::DEFAULT_MAX_ATTEMPTS;
use wforge_nucleus::{knowledge_path_for, locate_store, KnowledgeCache, SharedNucleus};
use wforge_runner::{PackageManager, DEFAULT_TIMEOUT_SECONDS};

use crate::error::CliError;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "wforge.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub work_folder: PathBuf,
    pub max_attempts: u32,
    pub auto_deploy_target: Option<PathBuf>,
    pub nucleus_path: Option<PathBuf>,
    pub knowledge_path: Option<PathBuf>,
    pub package_manager: Option<String>,
    pub command_timeout_secs: u64,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_folder: PathBuf::from("./widgets"),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            auto_deploy_target: None,
            nucleus_path: None,
            knowledge_path: None,
            package_manager: None,
            command_timeout_secs: DEFAULT_TIMEOUT_SECONDS,
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    /// Load from `explicit`, else `./wforge.toml` when present, else defaults;
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(SETTINGS_FILE).is_file() => Self::from_file(Path::new(SETTINGS_FILE))?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = toml::from_str(&content).map_err(|e| {
            CliError::InvalidInput(format!("{}: {}", path.display(), e))
        })?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Apply `WFORGE_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(folder) = lookup("WFORGE_WORK_FOLDER") {
            self.work_folder = PathBuf::from(folder);
        }
        if let Some(attempts) = lookup("WFORGE_MAX_ATTEMPTS") {
            self.max_attempts = attempts.trim().parse().map_err(|_| {
                CliError::InvalidInput(format!("WFORGE_MAX_ATTEMPTS must be a number, got '{}'", attempts))
            })?;
        }
        if let Some(nucleus) = lookup("WFORGE_NUCLEUS") {
            self.nucleus_path = Some(PathBuf::from(nucleus));
        }
        if let Some(model) = lookup("WFORGE_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        Ok(())
    }

    pub fn package_manager(&self) -> Result<Option<PackageManager>> {
        match &self.package_manager {
            None => Ok(None),
            Some(name) => PackageManager::parse(name).map(Some).ok_or_else(|| {
                CliError::InvalidInput(format!("unknown package manager '{}'", name)).into()
            }),
        }
    }

    pub fn nucleus_path(&self) -> PathBuf {
        self.nucleus_path.clone().unwrap_or_else(locate_store)
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.knowledge_path
            .clone()
            .unwrap_or_else(|| knowledge_path_for(&self.nucleus_path()))
    }

    pub fn open_nucleus(&self) -> SharedNucleus {
        let path = self.nucleus_path();
        debug!("Opening nucleus at {:?}", path);
        SharedNucleus::load(path)
    }

    pub fn open_knowledge(&self) -> Result<KnowledgeCache> {
        let path = self.knowledge_path();
        KnowledgeCache::load(&path)
            .with_context(|| format!("Failed to read knowledge cache {}", path.display()))
    }

    /// Diagnosis helper for the configured provider; offline when requested
    /// or when no API key is available.
    pub fn assistant(&self, offline: bool) -> DiagnosisHelper {
        if offline {
            return DiagnosisHelper::offline();
        }

        let adapter = match self.llm.provider.as_deref() {
            Some(name) => match LlmProvider::parse(name) {
                Some(provider) => LlmAdapter::from_settings(provider, self.llm.model.clone()),
                None => {
                    warn!("Unknown LLM provider '{}', running offline", name);
                    return DiagnosisHelper::offline();
                }
            },
            None => LlmAdapter::from_env(),
        };

        match adapter {
            Ok(adapter) => DiagnosisHelper::new(Arc::new(adapter)),
            Err(e) => {
                debug!("Running offline: {}", e);
                DiagnosisHelper::offline()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.command_timeout_secs, 600);
        assert_eq!(settings.work_folder, PathBuf::from("./widgets"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wforge.toml");
        fs::write(
            &path,
            r#"
work_folder = "./out"
max_attempts = 5
auto_deploy_target = "../MyApp/widgets"
package_manager = "pnpm"

[llm]
provider = "anthropic"
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.work_folder, PathBuf::from("./out"));
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.auto_deploy_target, Some(PathBuf::from("../MyApp/widgets")));
        assert_eq!(settings.package_manager().unwrap(), Some(PackageManager::Pnpm));
        assert_eq!(settings.llm.provider.as_deref(), Some("anthropic"));
        assert_eq!(settings.command_timeout_secs, 600);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WFORGE_WORK_FOLDER", "/tmp/w"),
            ("WFORGE_MAX_ATTEMPTS", "7"),
            ("WFORGE_NUCLEUS", "/tmp/n.json"),
            ("WFORGE_LLM_MODEL", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.work_folder, PathBuf::from("/tmp/w"));
        assert_eq!(settings.max_attempts, 7);
        assert_eq!(settings.knowledge_path(), PathBuf::from("/tmp/knowledge.jsonl"));
        assert_eq!(settings.llm.model, None);
    }

    #[test]
    fn test_invalid_values() {
        let mut settings = Settings::default();
        assert!(settings
            .apply_overrides(|k| (k == "WFORGE_MAX_ATTEMPTS").then(|| "many".to_string()))
            .is_err());

        settings.package_manager = Some("bun".to_string());
        assert!(settings.package_manager().is_err());
    }
}
