//! Discovery of the nucleus and knowledge files.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable pointing at an explicit nucleus file.
pub const NUCLEUS_ENV: &str = "WFORGE_NUCLEUS";
/// Project-local data directory.
pub const DATA_DIR: &str = ".wforge";
pub const NUCLEUS_FILE: &str = "nucleus.json";
pub const KNOWLEDGE_FILE: &str = "knowledge.jsonl";

/// Candidate nucleus locations in priority order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(explicit) = env::var_os(NUCLEUS_ENV).filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(explicit));
    }

    candidates.push(Path::new(DATA_DIR).join(NUCLEUS_FILE));

    if let Some(config) = config_dir() {
        candidates.push(config.join("wforge").join(NUCLEUS_FILE));
    }

    if let Some(dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        candidates.push(dir.join(NUCLEUS_FILE));
    }

    candidates
}

/// Pick the nucleus file: the first existing candidate, else the first
/// candidate whose directory can be created.
pub fn locate_store() -> PathBuf {
    select(&candidate_paths()).unwrap_or_else(|| Path::new(DATA_DIR).join(NUCLEUS_FILE))
}

/// Knowledge cache file that sits next to a nucleus file.
pub fn knowledge_path_for(nucleus: &Path) -> PathBuf {
    nucleus
        .parent()
        .map(|dir| dir.join(KNOWLEDGE_FILE))
        .unwrap_or_else(|| PathBuf::from(KNOWLEDGE_FILE))
}

fn select(candidates: &[PathBuf]) -> Option<PathBuf> {
    if let Some(existing) = candidates.iter().find(|p| p.is_file()) {
        debug!("Using existing nucleus at {:?}", existing);
        return Some(existing.clone());
    }
    candidates
        .iter()
        .find(|p| match p.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).is_ok(),
            _ => true,
        })
        .cloned()
}

fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    if let Some(appdata) = env::var_os("APPDATA").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(appdata));
    }
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_select_prefers_existing() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a").join(NUCLEUS_FILE);
        let second = dir.path().join("b").join(NUCLEUS_FILE);
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&second, "{}").unwrap();

        assert_eq!(select(&[first.clone(), second.clone()]), Some(second));
    }

    #[test]
    fn test_select_falls_back_to_creatable() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("fresh").join(NUCLEUS_FILE);
        assert_eq!(select(&[first.clone()]), Some(first.clone()));
        assert!(first.parent().unwrap().is_dir());
    }

    #[test]
    fn test_knowledge_path_for() {
        assert_eq!(
            knowledge_path_for(Path::new(".wforge/nucleus.json")),
            Path::new(".wforge").join(KNOWLEDGE_FILE)
        );
    }
}
