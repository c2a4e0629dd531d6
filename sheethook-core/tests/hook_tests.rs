use rust_xlsxwriter::{Color, Format, Formula, Workbook};
use sheethook_core::{Hook, HookConfig, ReportCategory, RunSummary};
use std::fs;
use std::path::Path;

// Helper to build a workbook that touches every report category
fn create_sample_xlsx(path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let highlighted = Format::new().set_background_color(Color::Yellow);

    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;
    sheet.write_number(0, 0, 42)?;
    sheet.write_boolean(1, 1, true)?;
    sheet.write_string_with_format(2, 0, "Total", &bold)?;
    sheet.write_number_with_format(2, 1, 1.5, &highlighted)?;
    sheet.write_url(3, 0, "https://example.com")?;
    sheet.write_formula(4, 0, Formula::new("=6*7").set_result("42"))?;
    sheet.merge_range(6, 0, 7, 1, "Merged", &Format::new())?;

    let other = workbook.add_worksheet();
    other.set_name("Notes")?;
    other.write_string(0, 0, "hello")?;

    workbook.define_name("Answer", "=Sheet1!$A$1")?;
    workbook.save(path)?;
    Ok(())
}

fn report(root: &Path, prefix: &str, category: ReportCategory) -> String {
    fs::read_to_string(root.join("excel_reports").join(category.file_name(prefix))).unwrap()
}

#[test]
fn test_no_workbooks_leaves_no_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("excel_reports")).unwrap();
    fs::write(root.join("excel_reports/old_hyperlinks.txt"), "stale").unwrap();
    fs::write(root.join("notes.txt"), "not a workbook").unwrap();

    let summary = Hook::new(HookConfig::default()).run(root).unwrap();

    assert_eq!(summary, RunSummary::default());
    assert!(!root.join("excel_reports").exists());
    assert!(!root.join("src.vba").exists());
}

#[test]
fn test_workbook_without_macros() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    let summary = Hook::new(HookConfig::default()).run(root).unwrap();

    assert_eq!(summary.workbooks, 1);
    assert_eq!(summary.vba_files, 0);
    assert_eq!(summary.report_files, 7);
    assert!(!root.join("src.vba").exists());
    for category in ReportCategory::ALL {
        assert!(
            root.join("excel_reports").join(category.file_name("data")).is_file(),
            "missing {}",
            category
        );
    }
}

#[test]
fn test_values_report() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    Hook::new(HookConfig::default()).run(root).unwrap();
    let content = report(root, "data", ReportCategory::FormulasAndValues);
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines[0], "Sheet: Sheet1");
    assert_eq!(lines[1], "-".repeat(40));
    assert_eq!(lines[2], "Cell A1: Value='42', Type='Number'");
    assert!(lines.contains(&"Cell B2: Value='True', Type='Boolean'"));
    assert!(lines.contains(&"Cell A3: Value='Total', Type='Text'"));
    assert!(lines.contains(&"Cell B3: Value='1.5', Type='Number'"));
    // Formula cells report their cached value
    assert!(lines.contains(&"Cell A5: Value='42', Type='Number'"));
    assert!(!content.contains("Formula="));

    let notes = lines.iter().position(|l| *l == "Sheet: Notes").unwrap();
    assert_eq!(lines[notes + 2], "Cell A1: Value='hello', Type='Text'");
}

#[test]
fn test_values_report_with_formulas() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    let config = HookConfig {
        include_formulas: true,
        ..HookConfig::default()
    };
    Hook::new(config).run(root).unwrap();
    let content = report(root, "data", ReportCategory::FormulasAndValues);

    assert!(content.contains("Cell A5: Value='42', Type='Number', Formula='=6*7'\n"));
    assert!(content.contains("Cell A1: Value='42', Type='Number'\n"));
}

#[test]
fn test_formatting_report() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    Hook::new(HookConfig::default()).run(root).unwrap();
    let content = report(root, "data", ReportCategory::Formatting);

    let total = content
        .lines()
        .find(|l| l.starts_with("Cell A3: "))
        .unwrap();
    assert!(total.contains("Bold=True"));
    assert!(total.contains("Fill Color=None"));

    let highlighted = content
        .lines()
        .find(|l| l.starts_with("Cell B3: "))
        .unwrap();
    assert!(highlighted.contains("Bold=False"));
    assert!(highlighted.contains("Fill Color=FFFFFF00"));
}

#[test]
fn test_formula_with_zero_result_is_formatted() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.write_number(0, 0, 5).unwrap();
    sheet
        .write_formula_with_format(0, 1, Formula::new("=A1-A1").set_result("0"), &bold)
        .unwrap();
    workbook.save(root.join("calc.xlsx")).unwrap();

    Hook::new(HookConfig::default()).run(root).unwrap();

    let values = report(root, "calc", ReportCategory::FormulasAndValues);
    assert!(values.contains("Cell B1: Value='0', Type='Number'\n"));

    let formatting = report(root, "calc", ReportCategory::Formatting);
    let line = formatting
        .lines()
        .find(|l| l.starts_with("Cell B1: "))
        .unwrap();
    assert!(line.contains("Bold=True"));
}

#[test]
fn test_structure_reports() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    Hook::new(HookConfig::default()).run(root).unwrap();

    let merged = report(root, "data", ReportCategory::MergedCells);
    assert!(merged.contains("Sheet: Sheet1\n"));
    assert!(merged.contains("Merged Range: A7:B8\n"));

    let links = report(root, "data", ReportCategory::Hyperlinks);
    assert!(links.contains("Cell A4: Hyperlink='https://example.com'\n"));

    let names = report(root, "data", ReportCategory::NamedRanges);
    assert!(names.starts_with("Workbook Named Ranges\n"));
    assert!(names.contains("Name: Answer, Refers To: Sheet1!$A$1\n"));

    // Sections without entries still carry one header per sheet
    let validations = report(root, "data", ReportCategory::DataValidations);
    assert_eq!(
        validations,
        format!(
            "Sheet: Sheet1\n{dashes}\nSheet: Notes\n{dashes}\n",
            dashes = "-".repeat(40)
        )
    );
}

#[test]
fn test_runs_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();
    let hook = Hook::new(HookConfig::default());

    hook.run(root).unwrap();
    let first: Vec<Vec<u8>> = ReportCategory::ALL
        .iter()
        .map(|c| fs::read(root.join("excel_reports").join(c.file_name("data"))).unwrap())
        .collect();

    hook.run(root).unwrap();
    let second: Vec<Vec<u8>> = ReportCategory::ALL
        .iter()
        .map(|c| fs::read(root.join("excel_reports").join(c.file_name("data"))).unwrap())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_nested_workbooks_share_output_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("finance/q1")).unwrap();
    create_sample_xlsx(&root.join("finance/q1/Budget.xlsx")).unwrap();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    let summary = Hook::new(HookConfig::default()).run(root).unwrap();

    assert_eq!(summary.workbooks, 2);
    assert_eq!(summary.report_files, 14);
    assert!(root.join("excel_reports/Budget_formulas_and_values.txt").is_file());
    assert!(root.join("excel_reports/data_formulas_and_values.txt").is_file());
    assert!(!root.join("finance/q1/excel_reports").exists());
}

#[test]
fn test_custom_output_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsx(&root.join("data.xlsx")).unwrap();

    let config = HookConfig {
        report_dir: "reports".into(),
        ..HookConfig::default()
    };
    Hook::new(config).run(root).unwrap();

    assert!(root.join("reports/data_hyperlinks.txt").is_file());
    assert!(!root.join("excel_reports").exists());
}
