//! Workbook reader: calamine for values, formulas and VBA, quick-xml for the
//! OOXML parts calamine does not expose (styles, conditional formats, ...)

use crate::error::HookError;
use anyhow::{Context, Result};
use calamine::{Data, ExcelDateTime, Reader, SheetType, Sheets, open_workbook_auto_from_rs};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

pub mod cell_ref;
pub mod styles;
pub mod workbook;
pub mod xml_parser;

pub use cell_ref::CellReference;
pub use workbook::{
    Cell, CellStyle, CellValue, ColorRef, ConditionalFormat, DataValidation, DefinedName,
    FontStyle, Hyperlink, Sheet, Workbook,
};

use self::styles::Stylesheet;
use self::xml_parser::SheetMetadata;

/// calamine handle over an in-memory copy of the file
pub type WorkbookSheets = Sheets<Cursor<Vec<u8>>>;

/// Open a workbook with calamine, detecting the format from its content
pub fn open_sheets<P: AsRef<Path>>(path: P) -> Result<WorkbookSheets> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    open_sheets_from_bytes(path, bytes)
}

fn open_sheets_from_bytes(path: &Path, bytes: Vec<u8>) -> Result<WorkbookSheets> {
    open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(anyhow::Error::new)
        .context(HookError::UnsupportedWorkbook(path.to_path_buf()))
}

/// Open the file as an OOXML package if it is one with XML parts.
///
/// Binary workbooks (xls, and xlsb whose parts are binary records) yield `None`.
fn open_package(bytes: &[u8]) -> Option<ZipArchive<Cursor<&[u8]>>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).ok()?;
    if archive.by_name("xl/workbook.xml").is_err() {
        return None;
    }
    Some(archive)
}

/// What the XML parts of a package add on top of calamine
struct PackageParts {
    stylesheet: Stylesheet,
    defined_names: Vec<DefinedName>,
    /// Keyed by sheet name
    sheets: HashMap<String, SheetMetadata>,
}

fn read_package(path: &Path, bytes: &[u8]) -> Result<Option<PackageParts>> {
    let Some(mut archive) = open_package(bytes) else {
        tracing::debug!("{} is not an XML package, styles unavailable", path.display());
        return Ok(None);
    };

    let stylesheet = styles::parse_styles(&mut archive)?;
    let defined_names = xml_parser::extract_defined_names(&mut archive)?;
    let sheet_paths = xml_parser::resolve_sheet_paths(&mut archive)?;

    let mut sheets = HashMap::with_capacity(sheet_paths.len());
    for (name, part) in sheet_paths {
        let metadata = xml_parser::read_sheet_metadata(&mut archive, &part)
            .with_context(|| format!("Failed to read sheet '{}' of {}", name, path.display()))?;
        sheets.insert(name, metadata);
    }

    Ok(Some(PackageParts {
        stylesheet,
        defined_names,
        sheets,
    }))
}

/// Read a workbook from a file path.
///
/// Cell values are the cached results; formula text is loaded alongside.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut package = read_package(path, &bytes)?;
    let mut excel = open_sheets_from_bytes(path, bytes)?;

    let defined_names = match package.as_mut() {
        Some(parts) => std::mem::take(&mut parts.defined_names),
        None => excel
            .defined_names()
            .iter()
            .map(|(name, refers_to)| DefinedName {
                name: name.clone(),
                refers_to: refers_to.clone(),
            })
            .collect(),
    };

    let worksheet_names: Vec<String> = excel
        .sheets_metadata()
        .iter()
        .filter(|s| matches!(s.typ, SheetType::WorkSheet))
        .map(|s| s.name.clone())
        .collect();

    let mut sheets = Vec::with_capacity(worksheet_names.len());
    for name in worksheet_names {
        let metadata = package
            .as_mut()
            .and_then(|parts| parts.sheets.remove(&name))
            .unwrap_or_default();
        let stylesheet = package.as_ref().map(|parts| &parts.stylesheet);

        let range = excel
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet '{}' of {}", name, path.display()))?;

        let mut sheet = Sheet::new(name.as_str());
        let (row0, col0) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            let Some(value) = convert_value(data) else {
                continue;
            };
            let reference = CellReference::new(row0 + row as u32, col0 + col as u32);
            let style = stylesheet.map(|styles| {
                let xf = metadata.style_indices.get(&reference).copied().unwrap_or(0);
                styles.resolve(xf)
            });
            sheet.cells.push(Cell {
                reference,
                value,
                style,
            });
        }

        match excel.worksheet_formula(&name) {
            Ok(formulas) => {
                let (row0, col0) = formulas.start().unwrap_or((0, 0));
                for (row, col, formula) in formulas.used_cells() {
                    let reference = CellReference::new(row0 + row as u32, col0 + col as u32);
                    sheet.formulas.insert(reference, formula.clone());
                }
            }
            Err(e) => tracing::warn!(
                "formulas of sheet '{}' in {} unavailable: {}",
                name,
                path.display(),
                e
            ),
        }

        sheet.merged_ranges = metadata.merged_ranges;
        sheet.conditional_formats = metadata.conditional_formats;
        sheet.data_validations = metadata.data_validations;
        sheet.hyperlinks = metadata.hyperlinks;
        sheets.push(sheet);
    }

    Ok(Workbook {
        sheets,
        defined_names,
    })
}

fn convert_value(data: &Data) -> Option<CellValue> {
    let value = match data {
        Data::Empty => return None,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => CellValue::DateTime(format_excel_datetime(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
    };
    Some(value)
}

fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(duration) = dt.as_duration() {
            return format_duration(duration);
        }
    } else if let Some(datetime) = dt.as_datetime() {
        return format_datetime(datetime);
    }
    workbook::format_number(dt.as_f64())
}

fn format_datetime(datetime: chrono::NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
