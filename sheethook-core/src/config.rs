//! Hook configuration

use crate::error::HookError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions picked up when no configuration overrides them
pub const DEFAULT_EXTENSIONS: [&str; 7] = ["xlsb", "xls", "xlsm", "xla", "xlt", "xlam", "xlsx"];

/// Name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sheethook.toml";

/// How file names are matched against `extensions`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Compare the text after the final `.` (case-insensitive)
    #[default]
    Extension,
    /// Raw case-sensitive string suffix, so `fooxls` matches `xls`
    Suffix,
}

/// Main hook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Keep `Attribute VB_Name = ...` lines in extracted modules
    pub keep_vb_name: bool,
    /// Output directory for extracted VBA modules
    pub vba_dir: PathBuf,
    /// Output directory for text reports
    pub report_dir: PathBuf,
    /// Recognized workbook extensions, without the leading dot
    pub extensions: Vec<String>,
    pub match_mode: MatchMode,
    /// Append formula text to the formulas-and-values report
    pub include_formulas: bool,
    /// Ignore Office owner files such as `~$Budget.xlsx`
    pub skip_lock_files: bool,
    /// Directory names that are never descended into
    pub exclude_dirs: Vec<String>,
}

impl HookConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: HookConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `sheethook.toml` from `dir` if present, defaults otherwise
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let candidate = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject configurations that would make a run destructive or useless
    pub fn validate(&self) -> Result<(), HookError> {
        if self.extensions.is_empty() {
            return Err(HookError::Config(
                "at least one workbook extension is required".to_string(),
            ));
        }

        if let Some(ext) = self.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            return Err(HookError::Config(format!(
                "extension '{}' must be non-empty and written without a leading dot",
                ext
            )));
        }

        for dir in [&self.vba_dir, &self.report_dir] {
            if dir.as_os_str().is_empty() || dir == Path::new(".") {
                return Err(HookError::Config(format!(
                    "output directory '{}' would clear the working directory",
                    dir.display()
                )));
            }
        }

        if self.vba_dir == self.report_dir {
            return Err(HookError::Config(format!(
                "vba_dir and report_dir must differ (both are '{}')",
                self.vba_dir.display()
            )));
        }

        Ok(())
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            keep_vb_name: false,
            vba_dir: PathBuf::from("src.vba"),
            report_dir: PathBuf::from("excel_reports"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            match_mode: MatchMode::Extension,
            include_formulas: false,
            skip_lock_files: true,
            exclude_dirs: vec![".git".to_string()],
        }
    }
}
