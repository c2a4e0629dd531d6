//! XML parsing utilities for extracting metadata from OOXML packages

use super::cell_ref::CellReference;
use super::styles::attr_value;
use super::workbook::{ConditionalFormat, DataValidation, DefinedName, Hyperlink};
use crate::error::HookError;
use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use zip::ZipArchive;

/// A `Relationship` entry from a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub target: String,
    /// `TargetMode="External"` (URLs, other files)
    pub external: bool,
}

/// Everything the reports need from one worksheet part
#[derive(Debug, Clone, Default)]
pub struct SheetMetadata {
    /// `s` attribute of each styled cell
    pub style_indices: HashMap<CellReference, usize>,
    pub merged_ranges: Vec<String>,
    pub conditional_formats: Vec<ConditionalFormat>,
    pub data_validations: Vec<DataValidation>,
    pub hyperlinks: Vec<Hyperlink>,
}

/// Path of the relationships part that belongs to `part`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the part that declares it
pub fn resolve_target(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match base_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Read a `.rels` part keyed by relationship id; a missing part is empty
pub fn read_relationships(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    rels_path: &str,
) -> Result<HashMap<String, Relationship>> {
    let mut relationships = HashMap::new();

    let rels_xml = match archive.by_name(rels_path) {
        Ok(file) => file,
        Err(_) => return Ok(relationships),
    };

    let mut reader = Reader::from_reader(BufReader::new(rels_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"Relationship" {
                    let id = attr_value(&e, b"Id")?;
                    let target = attr_value(&e, b"Target")?;
                    let external = attr_value(&e, b"TargetMode")?
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
                    if let (Some(id), Some(target)) = (id, target) {
                        relationships.insert(id, Relationship { target, external });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error in {}: {}", rels_path, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Map every sheet name in `xl/workbook.xml` to its part path
pub fn resolve_sheet_paths(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<HashMap<String, String>> {
    let rels = read_relationships(archive, "xl/_rels/workbook.xml.rels")?;

    let workbook_xml = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| HookError::MissingPart("xl/workbook.xml".to_string()))?;
    let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
    reader.config_mut().trim_text(true);

    let mut sheet_paths = HashMap::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"sheet" {
                    let name = attr_value(&e, b"name")?;
                    let rid = attr_value(&e, b"r:id")?;
                    if let (Some(name), Some(rid)) = (name, rid) {
                        match rels.get(&rid) {
                            Some(rel) => {
                                let path = resolve_target("xl/workbook.xml", &rel.target);
                                sheet_paths.insert(name, path);
                            }
                            None => tracing::warn!(
                                "relationship '{}' for sheet '{}' not found",
                                rid,
                                name
                            ),
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error in workbook: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet_paths)
}

/// Extract workbook-scoped defined names in file order.
///
/// Sheet-local names (`localSheetId`) and Excel's internal `_xlnm.` names are
/// skipped.
pub fn extract_defined_names(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Vec<DefinedName>> {
    let mut defined_names = Vec::new();

    let workbook_xml = match archive.by_name("xl/workbook.xml") {
        Ok(file) => file,
        Err(_) => return Ok(defined_names),
    };

    let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"definedName" {
                    let name = attr_value(&e, b"name")?.unwrap_or_default();
                    let is_local = attr_value(&e, b"localSheetId")?.is_some();
                    let refers_to = read_text_node(&mut reader)?;

                    if !name.is_empty() && !is_local && !name.starts_with("_xlnm.") {
                        defined_names.push(DefinedName { name, refers_to });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error in workbook: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(defined_names)
}

/// Collect styles, merges, conditional formats, validations and hyperlinks
/// from a worksheet part in a single pass
pub fn read_sheet_metadata(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    part_path: &str,
) -> Result<SheetMetadata> {
    let mut metadata = SheetMetadata::default();
    // (cell, r:id, location)
    let mut raw_links: Vec<(CellReference, Option<String>, Option<String>)> = Vec::new();

    {
        let sheet_xml = archive
            .by_name(part_path)
            .map_err(|_| HookError::MissingPart(part_path.to_string()))?;
        let mut reader = Reader::from_reader(BufReader::new(sheet_xml));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut cf_sqref: Option<String> = None;
        let mut open_rule: Option<ConditionalFormat> = None;
        let mut open_validation: Option<DataValidation> = None;

        loop {
            buf.clear();
            let (e, is_empty) = match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => (e, false),
                Ok(Event::Empty(e)) => (e, true),
                Ok(Event::End(e)) => {
                    match e.name().as_ref() {
                        b"cfRule" | b"conditionalFormatting" => {
                            if let Some(rule) = open_rule.take() {
                                metadata.conditional_formats.push(rule);
                            }
                        }
                        b"dataValidation" | b"dataValidations" => {
                            if let Some(validation) = open_validation.take() {
                                metadata.data_validations.push(validation);
                            }
                        }
                        _ => {}
                    }
                    continue;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(anyhow::anyhow!("XML parsing error in {}: {}", part_path, e));
                }
                _ => continue,
            };

            match e.name().as_ref() {
                b"c" => {
                    let reference =
                        attr_value(&e, b"r")?.and_then(|r| r.parse::<CellReference>().ok());
                    let style = attr_value(&e, b"s")?.and_then(|s| s.parse::<usize>().ok());
                    if let (Some(reference), Some(style)) = (reference, style) {
                        metadata.style_indices.insert(reference, style);
                    }
                }
                b"mergeCell" => {
                    if let Some(range) = attr_value(&e, b"ref")? {
                        metadata.merged_ranges.push(range);
                    }
                }
                b"conditionalFormatting" => {
                    cf_sqref = attr_value(&e, b"sqref")?;
                }
                b"cfRule" => {
                    let rule = ConditionalFormat {
                        sqref: cf_sqref.clone().unwrap_or_default(),
                        rule_type: attr_value(&e, b"type")?,
                        operator: attr_value(&e, b"operator")?,
                        priority: attr_value(&e, b"priority")?.and_then(|p| p.parse().ok()),
                        formulas: Vec::new(),
                    };
                    if is_empty {
                        metadata.conditional_formats.push(rule);
                    } else {
                        open_rule = Some(rule);
                    }
                }
                b"formula" if !is_empty => {
                    let text = read_text_node(&mut reader)?;
                    if let Some(rule) = open_rule.as_mut() {
                        rule.formulas.push(text);
                    }
                }
                b"dataValidation" => {
                    let validation = DataValidation {
                        sqref: attr_value(&e, b"sqref")?.unwrap_or_default(),
                        validation_type: attr_value(&e, b"type")?,
                        operator: attr_value(&e, b"operator")?,
                        formula1: None,
                    };
                    if is_empty {
                        metadata.data_validations.push(validation);
                    } else {
                        open_validation = Some(validation);
                    }
                }
                b"formula1" if !is_empty => {
                    let text = read_text_node(&mut reader)?;
                    if let Some(validation) = open_validation.as_mut() {
                        validation.formula1 = Some(text);
                    }
                }
                b"hyperlink" => {
                    let cells = attr_value(&e, b"ref")?
                        .map(|r| CellReference::cells_in_range(&r))
                        .unwrap_or_default();
                    let rid = attr_value(&e, b"r:id")?;
                    let location = attr_value(&e, b"location")?;
                    // A range link applies to each of its cells
                    for cell in cells {
                        raw_links.push((cell, rid.clone(), location.clone()));
                    }
                }
                _ => {}
            }
        }
    }

    if !raw_links.is_empty() {
        let rels = read_relationships(archive, &rels_path_for(part_path))?;
        metadata.hyperlinks = raw_links
            .into_iter()
            .map(|(cell, rid, location)| {
                let target = rid
                    .and_then(|rid| rels.get(&rid).map(|rel| rel.target.clone()))
                    .or(location);
                Hyperlink { cell, target }
            })
            .collect();
        metadata.hyperlinks.sort_by_key(|link| link.cell);
    }

    Ok(metadata)
}

/// Read text content from an XML node
pub fn read_text_node<R: BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(e.unescape()?.as_ref()),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::End(_) => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
