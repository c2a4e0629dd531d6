//! Workbook data structures

use super::cell_ref::CellReference;
use std::collections::HashMap;
use std::fmt;

/// Represents a complete workbook, both values and formulas
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Workbook-scoped defined names, in file order
    pub defined_names: Vec<DefinedName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    pub refers_to: String,
}

/// Represents a worksheet
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    /// Non-empty cells in row-major order, with cached (evaluated) values
    pub cells: Vec<Cell>,
    /// Formula text without the leading `=`
    pub formulas: HashMap<CellReference, String>,
    /// Merged ranges such as `A1:B2`, in file order
    pub merged_ranges: Vec<String>,
    pub conditional_formats: Vec<ConditionalFormat>,
    pub data_validations: Vec<DataValidation>,
    /// One entry per linked cell, sorted row-major
    pub hyperlinks: Vec<Hyperlink>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the formula at the given position
    pub fn formula(&self, reference: CellReference) -> Option<&str> {
        self.formulas.get(&reference).map(String::as_str)
    }
}

/// Represents a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub reference: CellReference,
    pub value: CellValue,
    /// Resolved style; `None` for formats without readable styles (xls, xlsb)
    pub style: Option<CellStyle>,
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Date, time or duration rendered as text
    DateTime(String),
    /// Excel error code such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// Category label used in the formulas-and-values report.
    ///
    /// Booleans are matched before numbers so they never fall into `Number`.
    pub fn type_label(&self) -> &'static str {
        match self {
            CellValue::Boolean(_) => "Boolean",
            CellValue::Number(_) => "Number",
            CellValue::Text(_) | CellValue::Error(_) => "Text",
            CellValue::DateTime(_) => "Other",
        }
    }

    /// Whether the value counts as set for the formatting report
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0,
            CellValue::Boolean(b) => *b,
            CellValue::DateTime(_) | CellValue::Error(_) => true,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::DateTime(s) | CellValue::Error(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Boolean(true) => f.write_str("True"),
            CellValue::Boolean(false) => f.write_str("False"),
        }
    }
}

/// Integral values print without a fraction, everything else in shortest form
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A color as stored in the stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorRef {
    Rgb(String),
    Theme(u32),
    Indexed(u32),
    Auto,
}

impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorRef::Rgb(rgb) => f.write_str(rgb),
            ColorRef::Theme(n) => write!(f, "theme:{}", n),
            ColorRef::Indexed(n) => write!(f, "indexed:{}", n),
            ColorRef::Auto => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStyle {
    pub name: Option<String>,
    /// Point size as written in the file (e.g. `11`)
    pub size: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<ColorRef>,
}

/// Formatting resolved from a cell's `cellXfs` entry
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font: FontStyle,
    /// Pattern fill foreground color
    pub fill_color: Option<ColorRef>,
    pub horizontal_alignment: Option<String>,
    pub number_format: String,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font: FontStyle::default(),
            fill_color: None,
            horizontal_alignment: None,
            number_format: "General".to_string(),
        }
    }
}

/// One `cfRule` and the ranges it covers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalFormat {
    pub sqref: String,
    pub rule_type: Option<String>,
    pub operator: Option<String>,
    pub priority: Option<u32>,
    pub formulas: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataValidation {
    pub sqref: String,
    pub validation_type: Option<String>,
    pub operator: Option<String>,
    pub formula1: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub cell: CellReference,
    /// External URL, or the in-workbook location when there is no target
    pub target: Option<String>,
}
