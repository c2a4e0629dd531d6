//! VBA module extraction

use crate::hook::OutputLedger;
use crate::reader;
use anyhow::{Context, Result};
use calamine::Reader;
use std::fs;
use std::path::{Path, PathBuf};

/// A named unit of macro source extracted from a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VbaModule {
    pub name: String,
    pub source: String,
}

impl VbaModule {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Read every VBA module of a workbook, sorted by module name.
///
/// Workbooks without a VBA project yield an empty list.
pub fn extract_modules<P: AsRef<Path>>(path: P) -> Result<Vec<VbaModule>> {
    let path = path.as_ref();
    let mut excel = reader::open_sheets(path)?;

    let project = match excel.vba_project() {
        None => {
            tracing::debug!("no VBA project in {}", path.display());
            return Ok(Vec::new());
        }
        Some(project) => project
            .with_context(|| format!("Failed to read VBA project: {}", path.display()))?,
    };

    let mut names: Vec<&str> = project.get_module_names();
    names.sort_unstable();

    let mut modules = Vec::with_capacity(names.len());
    for name in names {
        let source = project.get_module(name).with_context(|| {
            format!("Failed to decode VBA module '{}' in {}", name, path.display())
        })?;
        modules.push(VbaModule::new(name, source));
    }

    tracing::debug!("{} VBA modules in {}", modules.len(), path.display());
    Ok(modules)
}

/// Drop generator `Attribute` lines, optionally keeping `Attribute VB_Name`
pub fn filter_attributes(source: &str, keep_vb_name: bool) -> Vec<&str> {
    source
        .lines()
        .filter(|line| !line.starts_with("Attribute") || (keep_vb_name && line.contains("VB_Name")))
        .collect()
}

/// Write modules as `{vba_dir}/{prefix}_{module}` and return the written paths.
///
/// Modules that are empty after filtering produce no file, and `vba_dir` is
/// only created once there is something to write.
pub fn write_modules(
    modules: &[VbaModule],
    prefix: &str,
    vba_dir: &Path,
    keep_vb_name: bool,
    ledger: &mut OutputLedger,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for module in modules {
        let lines = filter_attributes(&module.source, keep_vb_name);
        if lines.is_empty() {
            tracing::debug!("module '{}' is empty after filtering", module.name);
            continue;
        }

        fs::create_dir_all(vba_dir)
            .with_context(|| format!("Failed to create directory: {}", vba_dir.display()))?;

        let target = vba_dir.join(format!("{}_{}", prefix, module.name));
        ledger.record(&target, prefix);
        fs::write(&target, lines.join("\n"))
            .with_context(|| format!("Failed to write VBA module: {}", target.display()))?;
        written.push(target);
    }

    Ok(written)
}
