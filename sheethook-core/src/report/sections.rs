//! Line rendering for each report category

use super::ReportOptions;
use crate::reader::{CellStyle, ColorRef, DefinedName, Sheet};

pub const SEPARATOR_WIDTH: usize = 40;

/// A title followed by a dashed rule on the next line
pub fn section_header(title: &str) -> String {
    format!("{}\n{}", title, "-".repeat(SEPARATOR_WIDTH))
}

pub(super) fn named_ranges(names: &[DefinedName]) -> Vec<String> {
    let mut lines = vec![section_header("Workbook Named Ranges")];
    lines.extend(
        names
            .iter()
            .map(|n| format!("Name: {}, Refers To: {}", n.name, n.refers_to)),
    );
    lines
}

pub(super) fn formulas_and_values(sheet: &Sheet, options: &ReportOptions) -> Vec<String> {
    sheet
        .cells
        .iter()
        .map(|cell| {
            let mut line = format!(
                "Cell {}: Value='{}', Type='{}'",
                cell.reference,
                cell.value,
                cell.value.type_label()
            );
            if options.include_formulas
                && let Some(formula) = sheet.formula(cell.reference)
            {
                line.push_str(&format!(", Formula='={}'", formula));
            }
            line
        })
        .collect()
}

pub(super) fn formatting(sheet: &Sheet) -> Vec<String> {
    sheet
        .cells
        .iter()
        // Formula cells count as set whatever their cached result
        .filter(|cell| cell.value.is_truthy() || sheet.formula(cell.reference).is_some())
        .filter_map(|cell| {
            cell.style
                .as_ref()
                .map(|style| format!("Cell {}: {}", cell.reference, describe_style(style)))
        })
        .collect()
}

fn describe_style(style: &CellStyle) -> String {
    let font = &style.font;
    format!(
        "Font='{}', Size={}, Bold={}, Italic={}, Font Color={}, Fill Color={}, Alignment={}, Number Format='{}'",
        font.name.as_deref().unwrap_or("None"),
        font.size.as_deref().unwrap_or("None"),
        python_bool(font.bold),
        python_bool(font.italic),
        color_or_none(font.color.as_ref()),
        color_or_none(style.fill_color.as_ref()),
        style.horizontal_alignment.as_deref().unwrap_or("None"),
        style.number_format
    )
}

fn python_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn color_or_none(color: Option<&ColorRef>) -> String {
    color.map_or_else(|| "None".to_string(), ColorRef::to_string)
}

pub(super) fn conditional_formatting(sheet: &Sheet) -> Vec<String> {
    sheet
        .conditional_formats
        .iter()
        .map(|rule| {
            format!(
                "Rule: type='{}', operator='{}', priority={}, formula='{}', Applied to: {}",
                rule.rule_type.as_deref().unwrap_or("None"),
                rule.operator.as_deref().unwrap_or("None"),
                rule.priority
                    .map_or_else(|| "None".to_string(), |p| p.to_string()),
                rule.formulas.join("; "),
                rule.sqref
            )
        })
        .collect()
}

pub(super) fn merged_cells(sheet: &Sheet) -> Vec<String> {
    sheet
        .merged_ranges
        .iter()
        .map(|range| format!("Merged Range: {}", range))
        .collect()
}

pub(super) fn data_validations(sheet: &Sheet) -> Vec<String> {
    sheet
        .data_validations
        .iter()
        .map(|dv| {
            format!(
                "Range: {}, Formula: {}, Allow Type: {}, Criteria: {}",
                dv.sqref,
                dv.formula1.as_deref().unwrap_or("None"),
                dv.validation_type.as_deref().unwrap_or("None"),
                dv.operator.as_deref().unwrap_or("None")
            )
        })
        .collect()
}

pub(super) fn hyperlinks(sheet: &Sheet) -> Vec<String> {
    sheet
        .hyperlinks
        .iter()
        .map(|link| {
            format!(
                "Cell {}: Hyperlink='{}'",
                link.cell,
                link.target.as_deref().unwrap_or("None")
            )
        })
        .collect()
}
