//! Text reports, seven per workbook

mod sections;

use crate::hook::OutputLedger;
use crate::reader::Workbook;
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use sections::{SEPARATOR_WIDTH, section_header};

/// Report categories in the order their buffers are filled and written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportCategory {
    FormulasAndValues,
    Formatting,
    ConditionalFormatting,
    MergedCells,
    DataValidations,
    Hyperlinks,
    NamedRanges,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 7] = [
        ReportCategory::FormulasAndValues,
        ReportCategory::Formatting,
        ReportCategory::ConditionalFormatting,
        ReportCategory::MergedCells,
        ReportCategory::DataValidations,
        ReportCategory::Hyperlinks,
        ReportCategory::NamedRanges,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportCategory::FormulasAndValues => "formulas_and_values",
            ReportCategory::Formatting => "formatting",
            ReportCategory::ConditionalFormatting => "conditional_formatting",
            ReportCategory::MergedCells => "merged_cells",
            ReportCategory::DataValidations => "data_validations",
            ReportCategory::Hyperlinks => "hyperlinks",
            ReportCategory::NamedRanges => "named_ranges",
        }
    }

    /// `{prefix}_{slug}.txt`
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}_{}.txt", prefix, self.slug())
    }

    /// Whether the category gets a section per sheet
    pub fn is_sheet_scoped(&self) -> bool {
        !matches!(self, ReportCategory::NamedRanges)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Append `Formula='=...'` to cells that hold a formula
    pub include_formulas: bool,
}

/// The seven line buffers of one workbook
#[derive(Debug, Clone, Default)]
pub struct ReportSet {
    buffers: [Vec<String>; 7],
}

impl ReportSet {
    /// Render every category for a workbook
    pub fn build(workbook: &Workbook, options: &ReportOptions) -> Self {
        let mut reports = Self::default();

        reports
            .buffer_mut(ReportCategory::NamedRanges)
            .extend(sections::named_ranges(&workbook.defined_names));

        for sheet in &workbook.sheets {
            for category in ReportCategory::ALL.iter().filter(|c| c.is_sheet_scoped()) {
                reports
                    .buffer_mut(*category)
                    .push(section_header(&format!("Sheet: {}", sheet.name)));
            }

            reports
                .buffer_mut(ReportCategory::FormulasAndValues)
                .extend(sections::formulas_and_values(sheet, options));
            reports
                .buffer_mut(ReportCategory::Formatting)
                .extend(sections::formatting(sheet));
            reports
                .buffer_mut(ReportCategory::ConditionalFormatting)
                .extend(sections::conditional_formatting(sheet));
            reports
                .buffer_mut(ReportCategory::MergedCells)
                .extend(sections::merged_cells(sheet));
            reports
                .buffer_mut(ReportCategory::DataValidations)
                .extend(sections::data_validations(sheet));
            reports
                .buffer_mut(ReportCategory::Hyperlinks)
                .extend(sections::hyperlinks(sheet));
        }

        reports
    }

    pub fn lines(&self, category: ReportCategory) -> &[String] {
        &self.buffers[category.index()]
    }

    fn buffer_mut(&mut self, category: ReportCategory) -> &mut Vec<String> {
        &mut self.buffers[category.index()]
    }

    /// File content: lines joined by newlines plus a trailing newline
    pub fn render(&self, category: ReportCategory) -> String {
        let mut content = self.lines(category).join("\n");
        content.push('\n');
        content
    }

    /// Write all seven files into `report_dir`, returning their paths
    pub fn write(
        &self,
        report_dir: &Path,
        prefix: &str,
        ledger: &mut OutputLedger,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(report_dir)
            .with_context(|| format!("Failed to create directory: {}", report_dir.display()))?;

        let mut written = Vec::with_capacity(ReportCategory::ALL.len());
        for category in ReportCategory::ALL {
            let target = report_dir.join(category.file_name(prefix));
            ledger.record(&target, prefix);
            fs::write(&target, self.render(category))
                .with_context(|| format!("Failed to write report: {}", target.display()))?;
            written.push(target);
        }

        Ok(written)
    }
}
