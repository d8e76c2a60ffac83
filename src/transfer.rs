//! # Managed Workflow File Transfer
//!
//! A workflow file is *managed* when its name is `synced_<name>.yml` or
//! `synced_<name>.yaml`. Managed files are owned by the sync: on every
//! attempt the target's managed files are deleted and the source's managed
//! files are copied in their place. Renames and deletions in the source
//! therefore propagate, while every other file in the target's workflow
//! directory is left untouched.
//!
//! Only the top level of the workflow directory is considered; the hosting
//! platform does not read workflows from subdirectories.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;

fn managed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^synced_.+\.ya?ml$").expect("managed file pattern is valid"))
}

/// Whether `file_name` matches the managed-file pattern (case-sensitive).
pub fn is_managed_file(file_name: &str) -> bool {
    managed_pattern().is_match(file_name)
}

/// What a transfer did to the target directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Managed files removed from the target, by file name.
    pub removed: Vec<String>,
    /// Managed files copied from the source, by file name.
    pub copied: Vec<String>,
}

/// Managed files directly inside `dir`, sorted by name.
///
/// A missing directory has no managed files.
pub fn list_managed_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_managed_file) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Delete every managed file directly inside `dir`.
pub fn delete_managed_files(dir: &Path) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    for path in list_managed_files(dir)? {
        fs::remove_file(&path)?;
        removed.push(file_name(&path));
    }
    Ok(removed)
}

/// Copy every managed file directly inside `source_dir` into `target_dir`.
pub fn copy_managed_files(source_dir: &Path, target_dir: &Path) -> Result<Vec<String>> {
    // A source without a workflow directory is a broken source checkout, not
    // an empty one; surface it instead of wiping every target.
    fs::metadata(source_dir)?;

    let mut copied = Vec::new();
    for path in list_managed_files(source_dir)? {
        let name = file_name(&path);
        fs::copy(&path, target_dir.join(&name))?;
        copied.push(name);
    }
    Ok(copied)
}

/// Replace the managed files of `target_dir` with those of `source_dir`.
///
/// `target_dir` is created if absent. Any I/O error aborts the transfer and
/// may leave the target partially updated.
pub fn sync_managed_files(source_dir: &Path, target_dir: &Path) -> Result<TransferSummary> {
    fs::create_dir_all(target_dir)?;
    let removed = delete_managed_files(target_dir)?;
    let copied = copy_managed_files(source_dir, target_dir)?;
    Ok(TransferSummary { removed, copied })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
