use rust_xlsxwriter::Workbook;
use sheethook_core::{Hook, HookConfig, ReportCategory, vba};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

const MODULE1: &str = concat!(
    "Attribute VB_Name = \"Module1\"\r\n",
    "Sub Hello()\r\n",
    "    MsgBox \"hi\"\r\n",
    "End Sub\r\n",
);

const THIS_WORKBOOK: &str = concat!(
    "Attribute VB_Name = \"ThisWorkbook\"\r\n",
    "Attribute VB_Base = \"0{00020819-0000-0000-C000-000000000046}\"\r\n",
    "Attribute VB_GlobalNameSpace = False\r\n",
);

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
}

fn utf16le_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

// Single compressed chunk made only of literal tokens
fn compress_container(data: &[u8]) -> Vec<u8> {
    assert!(data.len() < 3600, "fixture source too long for one chunk");
    let mut body = Vec::new();
    for group in data.chunks(8) {
        body.push(0x00);
        body.extend_from_slice(group);
    }
    let header = 0xB000u16 | (body.len() as u16 - 1);

    let mut out = vec![0x01];
    out.extend_from_slice(&header.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

// (name, is_document_module, source)
fn build_vba_project(modules: &[(&str, bool, &str)]) -> Vec<u8> {
    let mut dir = Vec::new();
    push_record(&mut dir, 0x0001, &1u32.to_le_bytes()); // PROJECTSYSKIND
    push_record(&mut dir, 0x0002, &0x0409u32.to_le_bytes()); // PROJECTLCID
    push_record(&mut dir, 0x0014, &0x0409u32.to_le_bytes()); // PROJECTLCIDINVOKE
    push_record(&mut dir, 0x0003, &1252u16.to_le_bytes()); // PROJECTCODEPAGE
    push_record(&mut dir, 0x0004, b"VBAProject"); // PROJECTNAME
    push_record(&mut dir, 0x0005, b""); // PROJECTDOCSTRING
    push_record(&mut dir, 0x0040, b"");
    push_record(&mut dir, 0x0006, b""); // PROJECTHELPFILEPATH
    push_record(&mut dir, 0x003D, b"");
    push_record(&mut dir, 0x0007, &0u32.to_le_bytes()); // PROJECTHELPCONTEXT
    push_record(&mut dir, 0x0008, &0u32.to_le_bytes()); // PROJECTLIBFLAGS
    // PROJECTVERSION: reserved size of 4, then major u32 and minor u16
    dir.extend_from_slice(&0x0009u16.to_le_bytes());
    dir.extend_from_slice(&4u32.to_le_bytes());
    dir.extend_from_slice(&1u32.to_le_bytes());
    dir.extend_from_slice(&0u16.to_le_bytes());
    push_record(&mut dir, 0x000C, b""); // PROJECTCONSTANTS
    push_record(&mut dir, 0x003C, b"");

    push_record(&mut dir, 0x000F, &(modules.len() as u16).to_le_bytes()); // PROJECTMODULES
    push_record(&mut dir, 0x0013, &0xFFFFu16.to_le_bytes()); // PROJECTCOOKIE
    for (name, is_document, _) in modules {
        push_record(&mut dir, 0x0019, name.as_bytes()); // MODULENAME
        push_record(&mut dir, 0x0047, &utf16le_bytes(name));
        push_record(&mut dir, 0x001A, name.as_bytes()); // MODULESTREAMNAME
        push_record(&mut dir, 0x0032, &utf16le_bytes(name));
        push_record(&mut dir, 0x001C, b""); // MODULEDOCSTRING
        push_record(&mut dir, 0x0048, b"");
        push_record(&mut dir, 0x0031, &0u32.to_le_bytes()); // MODULEOFFSET
        push_record(&mut dir, 0x001E, &0u32.to_le_bytes()); // MODULEHELPCONTEXT
        push_record(&mut dir, 0x002C, &0xFFFFu16.to_le_bytes()); // MODULECOOKIE
        push_record(&mut dir, if *is_document { 0x0022 } else { 0x0021 }, b"");
        push_record(&mut dir, 0x002B, b""); // module terminator
    }
    push_record(&mut dir, 0x0010, b""); // dir terminator

    let mut ole = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    ole.create_storage("VBA").unwrap();
    {
        let mut stream = ole.create_stream("VBA/dir").unwrap();
        stream.write_all(&compress_container(&dir)).unwrap();
    }
    for (name, _, source) in modules {
        let mut stream = ole.create_stream(format!("VBA/{}", name)).unwrap();
        stream.write_all(&compress_container(source.as_bytes())).unwrap();
    }
    ole.into_inner().into_inner()
}

fn create_sample_xlsm(path: &Path) -> anyhow::Result<()> {
    let project = path.with_file_name("vbaProject.bin");
    fs::write(
        &project,
        build_vba_project(&[("Module1", false, MODULE1), ("ThisWorkbook", true, THIS_WORKBOOK)]),
    )?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "macro host")?;
    workbook.add_vba_project(&project)?;
    workbook.save(path)?;
    fs::remove_file(project)?;
    Ok(())
}

#[test]
fn test_extract_modules_from_xlsm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsm");
    create_sample_xlsm(&path).unwrap();

    let modules = vba::extract_modules(&path).unwrap();

    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Module1", "ThisWorkbook"]);
    assert_eq!(modules[0].source, MODULE1);
}

#[test]
fn test_hook_writes_prefixed_modules() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsm(&root.join("data.xlsm")).unwrap();

    let summary = Hook::new(HookConfig::default()).run(root).unwrap();

    assert_eq!(summary.workbooks, 1);
    assert_eq!(summary.vba_files, 1);
    assert_eq!(
        fs::read_to_string(root.join("src.vba/data_Module1")).unwrap(),
        "Sub Hello()\n    MsgBox \"hi\"\nEnd Sub"
    );
    // Nothing but Attribute lines, so no file
    assert!(!root.join("src.vba/data_ThisWorkbook").exists());
    assert!(root
        .join("excel_reports")
        .join(ReportCategory::FormulasAndValues.file_name("data"))
        .is_file());
}

#[test]
fn test_hook_keeps_vb_name() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    create_sample_xlsm(&root.join("data.xlsm")).unwrap();

    let config = HookConfig {
        keep_vb_name: true,
        ..HookConfig::default()
    };
    let summary = Hook::new(config).run(root).unwrap();

    assert_eq!(summary.vba_files, 2);
    assert_eq!(
        fs::read_to_string(root.join("src.vba/data_ThisWorkbook")).unwrap(),
        "Attribute VB_Name = \"ThisWorkbook\""
    );
    assert!(fs::read_to_string(root.join("src.vba/data_Module1"))
        .unwrap()
        .starts_with("Attribute VB_Name = \"Module1\"\nSub Hello()"));
}
