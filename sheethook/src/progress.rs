use colored::*;
use sheethook_core::{ProgressSink, WorkbookFile};
use std::path::Path;

/// Prints one line before and one after each workbook
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn on_start(&mut self, workbook: &WorkbookFile) {
        println!(
            "{} {}",
            "Processing:".bold(),
            workbook.path.display().to_string().cyan()
        );
    }

    fn on_finish(&mut self, workbook: &WorkbookFile, report_dir: &Path) {
        println!(
            "{}",
            format!(
                "Reports for {} saved in '{}' folder.",
                workbook.prefix,
                report_dir.display()
            )
            .green()
        );
    }
}
