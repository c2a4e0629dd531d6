//! Workbook discovery

use crate::config::{HookConfig, MatchMode};
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A workbook found on disk together with its output namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookFile {
    pub path: PathBuf,
    /// File name without extension, prepended to every generated artifact
    pub prefix: String,
}

impl WorkbookFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefix = file_prefix(&path);
        Self { path, prefix }
    }
}

/// Recursively find workbooks under `root`, sorted by path
pub fn find_workbooks<P: AsRef<Path>>(root: P, config: &HookConfig) -> Result<Vec<WorkbookFile>> {
    let root = root.as_ref();
    let mut workbooks = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, root, config));

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!("skipping non UTF-8 file name: {}", entry.path().display());
            continue;
        };

        if config.skip_lock_files && name.starts_with("~$") {
            tracing::debug!("skipping Office lock file {}", entry.path().display());
            continue;
        }

        if is_excel_file(name, config) {
            workbooks.push(WorkbookFile::new(entry.path()));
        }
    }

    Ok(workbooks)
}

fn is_pruned(entry: &DirEntry, root: &Path, config: &HookConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name();
    if config.exclude_dirs.iter().any(|d| OsStr::new(d) == name) {
        return true;
    }

    // Generated artifacts are never inputs
    let path = entry.path();
    path == root.join(&config.vba_dir) || path == root.join(&config.report_dir)
}

/// Check a file name against the configured extensions
pub fn is_excel_file(file_name: &str, config: &HookConfig) -> bool {
    match config.match_mode {
        MatchMode::Extension => match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => config
                .extensions
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(ext)),
            _ => false,
        },
        MatchMode::Suffix => config
            .extensions
            .iter()
            .any(|candidate| file_name.ends_with(candidate.as_str())),
    }
}

/// File name with its final extension removed (`data.xlsx` -> `data`)
pub fn file_prefix(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
