//! Edit primitives shared by all strategies.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;
use wforge_assist::{EditAction, PlannedEdit};
use wforge_nucleus::FixAction;
use wforge_templates::MANIFEST_FILE;

use crate::error::{FixError, FixResult};

/// What applying one [`FixAction`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub applied: bool,
    pub detail: String,
}

impl ActionReport {
    fn applied(detail: impl Into<String>) -> Self {
        Self {
            applied: true,
            detail: detail.into(),
        }
    }

    fn skipped(detail: impl Into<String>) -> Self {
        Self {
            applied: false,
            detail: detail.into(),
        }
    }
}

/// Directory file-edit globs are resolved against: `src/` when present,
/// otherwise the widget root.
pub fn edit_root(widget_path: &Path) -> PathBuf {
    let src = widget_path.join("src");
    if src.is_dir() {
        src
    } else {
        widget_path.to_path_buf()
    }
}

/// Files matching `pattern` under the edit root, excluding `node_modules`.
pub fn matching_files(widget_path: &Path, pattern: &str) -> FixResult<Vec<PathBuf>> {
    let root = edit_root(widget_path);
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern.trim_start_matches("./")
    );

    let mut files: Vec<PathBuf> = glob::glob(&full)?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .filter(|p| !p.components().any(|c| c.as_os_str() == "node_modules"))
        .collect();
    files.sort();
    Ok(files)
}

/// Apply a search/replace edit to every file matching `pattern`.
///
/// An empty `search` prepends `replace` to files that do not already contain
/// it; otherwise every occurrence of `search` is replaced. Returns the files
/// that changed.
pub fn apply_file_edit(
    widget_path: &Path,
    pattern: &str,
    search: &str,
    replace: &str,
) -> FixResult<Vec<PathBuf>> {
    let mut changed = Vec::new();

    for file in matching_files(widget_path, pattern)? {
        let content = fs::read_to_string(&file)?;
        let updated = if search.is_empty() {
            prepend_if_absent(&content, replace)
        } else if content.contains(search) {
            Some(content.replace(search, replace))
        } else {
            None
        };

        if let Some(updated) = updated.filter(|u| *u != content) {
            fs::write(&file, updated)?;
            debug!("Edited {:?}", file);
            changed.push(file);
        }
    }

    Ok(changed)
}

/// Ensure `scripts` exist in the widget's package manifest, keeping existing
/// entries. Returns the names of the scripts that were added.
pub fn ensure_scripts(
    widget_path: &Path,
    scripts: &BTreeMap<String, String>,
) -> FixResult<Vec<String>> {
    let manifest_path = widget_path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Err(FixError::MissingManifest(manifest_path));
    }

    let mut manifest: Value = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
    let root = manifest
        .as_object_mut()
        .ok_or_else(|| FixError::InvalidEdit("package.json is not an object".to_string()))?;
    let entry = root
        .entry("scripts")
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    let Some(existing) = entry.as_object_mut() else {
        return Ok(Vec::new());
    };

    let mut added = Vec::new();
    for (name, command) in scripts {
        if !existing.contains_key(name) {
            existing.insert(name.clone(), Value::String(command.clone()));
            added.push(name.clone());
        }
    }

    if !added.is_empty() {
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)? + "\n")?;
        debug!("Added scripts {:?} to {:?}", added, manifest_path);
    }
    Ok(added)
}

/// Apply a nucleus fix action to the widget.
///
/// `dependency-add` and `manual` actions are never executed; their report
/// carries what a human should do instead.
pub fn apply_fix_action(widget_path: &Path, action: &FixAction) -> FixResult<ActionReport> {
    match action {
        FixAction::FileEdit {
            file,
            search,
            replace,
        } => {
            let changed = apply_file_edit(widget_path, file, search, replace)?;
            Ok(if changed.is_empty() {
                ActionReport::skipped(format!("no file matching {} needed changes", file))
            } else {
                ActionReport::applied(format!("edited {} file(s) matching {}", changed.len(), file))
            })
        }
        FixAction::ConfigChange { scripts } => {
            let added = ensure_scripts(widget_path, scripts)?;
            Ok(if added.is_empty() {
                ActionReport::skipped("all scripts already present")
            } else {
                ActionReport::applied(format!("added scripts: {}", added.join(", ")))
            })
        }
        FixAction::DependencyAdd { .. } => Ok(ActionReport::skipped(
            action
                .install_command()
                .map(|cmd| format!("run `{}`", cmd))
                .unwrap_or_else(|| "install the missing dependency".to_string()),
        )),
        FixAction::Manual { instructions } => {
            Ok(ActionReport::skipped(format!("manual: {}", instructions)))
        }
    }
}

/// Apply one edit from a model-produced plan. Returns whether the file changed.
pub fn apply_planned_edit(widget_path: &Path, edit: &PlannedEdit) -> FixResult<bool> {
    let target = resolve_inside(widget_path, &edit.file)?;
    let payload = edit
        .payload()
        .ok_or_else(|| FixError::InvalidEdit(format!("{}: no content", edit.file)))?;

    if edit.action == EditAction::Create {
        if fs::read_to_string(&target).ok().as_deref() == Some(payload) {
            return Ok(false);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, payload)?;
        debug!("Created {:?}", target);
        return Ok(true);
    }

    if !target.is_file() {
        return Ok(false);
    }
    let content = fs::read_to_string(&target)?;
    let updated = match edit.action {
        EditAction::Replace => {
            let search = edit
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| FixError::InvalidEdit(format!("{}: replace without search", edit.file)))?;
            content
                .contains(search)
                .then(|| content.replace(search, payload))
        }
        EditAction::Prepend => prepend_if_absent(&content, payload),
        EditAction::Append => (!content.contains(payload.trim())).then(|| {
            let mut updated = content.clone();
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(payload);
            updated
        }),
        EditAction::Create => None,
    };

    match updated.filter(|u| *u != content) {
        Some(updated) => {
            fs::write(&target, updated)?;
            debug!("Edited {:?} ({:?})", target, edit.action);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn prepend_if_absent(content: &str, addition: &str) -> Option<String> {
    let needle = addition.trim();
    if needle.is_empty() || content.contains(needle) {
        return None;
    }
    let mut updated = addition.to_string();
    if !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(content);
    Some(updated)
}

/// Join a relative path onto the widget root, rejecting escapes.
fn resolve_inside(widget_path: &Path, relative: &str) -> FixResult<PathBuf> {
    let relative = Path::new(relative);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.as_os_str().is_empty() || escapes {
        return Err(FixError::OutsideWidget(relative.display().to_string()));
    }
    Ok(widget_path.join(relative))
}
