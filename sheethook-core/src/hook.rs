//! Hook orchestration: clean, discover, extract, report

use crate::config::HookConfig;
use crate::discovery::{self, WorkbookFile};
use crate::reader;
use crate::report::{ReportOptions, ReportSet};
use crate::vba;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Tracks every file written during a run so overwrites can be reported
#[derive(Debug, Default)]
pub struct OutputLedger {
    written: HashMap<PathBuf, String>,
}

impl OutputLedger {
    /// Record that `source` is about to write `path`.
    ///
    /// Returns the previous source when the path was already written in this run.
    pub fn record(&mut self, path: &Path, source: &str) -> Option<String> {
        let previous = self.written.insert(path.to_path_buf(), source.to_string());
        if let Some(previous) = &previous {
            tracing::warn!(
                "{} is overwritten: written by '{}', now by '{}'",
                path.display(),
                previous,
                source
            );
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// Callbacks for progress output; the library itself never prints
pub trait ProgressSink {
    fn on_start(&mut self, _workbook: &WorkbookFile) {}
    fn on_finish(&mut self, _workbook: &WorkbookFile, _report_dir: &Path) {}
}

/// Sink that discards all progress
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub workbooks: usize,
    pub vba_files: usize,
    pub report_files: usize,
}

/// The pre-commit hook
pub struct Hook {
    config: HookConfig,
}

impl Hook {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }

    /// Run over `root` without progress output
    pub fn run<P: AsRef<Path>>(&self, root: P) -> Result<RunSummary> {
        self.run_with_progress(root, &mut NoProgress)
    }

    /// Clean the output directories, then process every workbook under `root`.
    ///
    /// The first failing workbook aborts the run.
    pub fn run_with_progress<P: AsRef<Path>>(
        &self,
        root: P,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunSummary> {
        let root = root.as_ref();
        let vba_dir = root.join(&self.config.vba_dir);
        let report_dir = root.join(&self.config.report_dir);

        clean_outputs(&[&vba_dir, &report_dir])?;

        let workbooks = discovery::find_workbooks(root, &self.config)?;
        tracing::debug!("found {} workbooks under {}", workbooks.len(), root.display());
        warn_stem_collisions(&workbooks);

        let mut ledger = OutputLedger::default();
        let mut summary = RunSummary::default();

        for workbook in &workbooks {
            progress.on_start(workbook);

            summary.vba_files += self
                .extract_vba(workbook, &vba_dir, &mut ledger)
                .with_context(|| {
                    format!("Failed to extract VBA from {}", workbook.path.display())
                })?
                .len();
            summary.report_files += self
                .generate_reports(workbook, &report_dir, &mut ledger)
                .with_context(|| {
                    format!("Failed to generate reports for {}", workbook.path.display())
                })?
                .len();
            summary.workbooks += 1;

            progress.on_finish(workbook, &self.config.report_dir);
        }

        Ok(summary)
    }

    /// Extract the VBA modules of one workbook into `vba_dir`
    pub fn extract_vba(
        &self,
        workbook: &WorkbookFile,
        vba_dir: &Path,
        ledger: &mut OutputLedger,
    ) -> Result<Vec<PathBuf>> {
        let modules = vba::extract_modules(&workbook.path)?;
        vba::write_modules(
            &modules,
            &workbook.prefix,
            vba_dir,
            self.config.keep_vb_name,
            ledger,
        )
    }

    /// Write the seven reports of one workbook into `report_dir`
    pub fn generate_reports(
        &self,
        workbook: &WorkbookFile,
        report_dir: &Path,
        ledger: &mut OutputLedger,
    ) -> Result<Vec<PathBuf>> {
        let report_options = ReportOptions {
            include_formulas: self.config.include_formulas,
        };

        let parsed = reader::read_workbook(&workbook.path)?;
        let reports = ReportSet::build(&parsed, &report_options);
        reports.write(report_dir, &workbook.prefix, ledger)
    }
}

/// Remove output directories left by a previous run
pub fn clean_outputs(dirs: &[&Path]) -> Result<()> {
    for dir in dirs {
        if dir.exists() {
            tracing::debug!("removing {}", dir.display());
            fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn warn_stem_collisions(workbooks: &[WorkbookFile]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for workbook in workbooks {
        if let Some(first) = seen.insert(workbook.prefix.as_str(), workbook.path.as_path()) {
            tracing::warn!(
                "{} and {} share the prefix '{}'; outputs of the later one win",
                first.display(),
                workbook.path.display(),
                workbook.prefix
            );
        }
    }
}
