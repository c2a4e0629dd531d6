//! `xl/styles.xml` parsing

use super::workbook::{CellStyle, ColorRef, FontStyle};
use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;

/// Built-in number formats that have no `numFmt` entry in the file
fn builtin_number_format(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

/// One `xf` record of `cellXfs`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormatRecord {
    pub font_id: usize,
    pub fill_id: usize,
    pub num_fmt_id: u32,
    pub horizontal: Option<String>,
}

/// The parts of the stylesheet the formatting report needs
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub fonts: Vec<FontStyle>,
    /// Foreground color of each fill's pattern
    pub fills: Vec<Option<ColorRef>>,
    pub cell_xfs: Vec<CellFormatRecord>,
    /// Custom number formats by id
    pub num_fmts: HashMap<u32, String>,
}

impl Stylesheet {
    /// Resolve a cell's `s` attribute into a full style
    pub fn resolve(&self, xf_index: usize) -> CellStyle {
        let Some(xf) = self.cell_xfs.get(xf_index) else {
            return CellStyle::default();
        };

        CellStyle {
            font: self.fonts.get(xf.font_id).cloned().unwrap_or_default(),
            fill_color: self.fills.get(xf.fill_id).cloned().flatten(),
            horizontal_alignment: xf.horizontal.clone(),
            number_format: self.number_format(xf.num_fmt_id),
        }
    }

    pub fn number_format(&self, id: u32) -> String {
        self.num_fmts
            .get(&id)
            .cloned()
            .or_else(|| builtin_number_format(id).map(str::to_string))
            .unwrap_or_else(|| "General".to_string())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Fonts,
    Fills,
    CellXfs,
}

/// Parse `xl/styles.xml`; a package without one yields an empty stylesheet
pub fn parse_styles(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Stylesheet> {
    let mut stylesheet = Stylesheet::default();

    let styles_xml = match archive.by_name("xl/styles.xml") {
        Ok(file) => file,
        Err(_) => return Ok(stylesheet),
    };

    let mut reader = Reader::from_reader(BufReader::new(styles_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut section = Section::Other;
    let mut in_font = false;
    let mut in_fill = false;

    loop {
        buf.clear();
        let (e, is_empty) = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"fonts" | b"fills" | b"cellXfs" => section = Section::Other,
                    b"font" => in_font = false,
                    b"fill" => in_fill = false,
                    _ => {}
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error in styles: {}", e)),
            _ => continue,
        };

        match (section, e.name().as_ref()) {
            (_, b"numFmt") => {
                let id = attr_value(&e, b"numFmtId")?.and_then(|v| v.parse::<u32>().ok());
                let code = attr_value(&e, b"formatCode")?;
                if let (Some(id), Some(code)) = (id, code) {
                    stylesheet.num_fmts.insert(id, code);
                }
            }
            (_, b"fonts") if !is_empty => section = Section::Fonts,
            (_, b"fills") if !is_empty => section = Section::Fills,
            (_, b"cellXfs") if !is_empty => section = Section::CellXfs,
            (Section::Fonts, b"font") => {
                stylesheet.fonts.push(FontStyle::default());
                in_font = !is_empty;
            }
            (Section::Fonts, tag) if in_font => {
                if let Some(font) = stylesheet.fonts.last_mut() {
                    apply_font_property(font, tag, &e)?;
                }
            }
            (Section::Fills, b"fill") => {
                stylesheet.fills.push(None);
                in_fill = !is_empty;
            }
            (Section::Fills, b"fgColor") if in_fill => {
                if let Some(fill) = stylesheet.fills.last_mut() {
                    *fill = parse_color(&e)?;
                }
            }
            (Section::CellXfs, b"xf") => {
                let parse_index = |v: Option<String>| v.and_then(|v| v.parse::<usize>().ok());
                stylesheet.cell_xfs.push(CellFormatRecord {
                    font_id: parse_index(attr_value(&e, b"fontId")?).unwrap_or(0),
                    fill_id: parse_index(attr_value(&e, b"fillId")?).unwrap_or(0),
                    num_fmt_id: attr_value(&e, b"numFmtId")?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0),
                    horizontal: None,
                });
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = stylesheet.cell_xfs.last_mut() {
                    xf.horizontal = attr_value(&e, b"horizontal")?;
                }
            }
            _ => {}
        }
    }

    Ok(stylesheet)
}

fn apply_font_property(font: &mut FontStyle, tag: &[u8], e: &BytesStart) -> Result<()> {
    match tag {
        b"name" => font.name = attr_value(e, b"val")?,
        b"sz" => font.size = attr_value(e, b"val")?,
        b"b" => font.bold = is_enabled(e)?,
        b"i" => font.italic = is_enabled(e)?,
        b"color" => font.color = parse_color(e)?,
        _ => {}
    }
    Ok(())
}

/// Boolean toggles like `<b/>` are on unless `val` says otherwise
fn is_enabled(e: &BytesStart) -> Result<bool> {
    Ok(match attr_value(e, b"val")? {
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
        None => true,
    })
}

pub(crate) fn parse_color(e: &BytesStart) -> Result<Option<ColorRef>> {
    if let Some(rgb) = attr_value(e, b"rgb")? {
        return Ok(Some(ColorRef::Rgb(rgb)));
    }
    if let Some(theme) = attr_value(e, b"theme")?.and_then(|v| v.parse().ok()) {
        return Ok(Some(ColorRef::Theme(theme)));
    }
    if let Some(indexed) = attr_value(e, b"indexed")?.and_then(|v| v.parse().ok()) {
        return Ok(Some(ColorRef::Indexed(indexed)));
    }
    if attr_value(e, b"auto")?.is_some() {
        return Ok(Some(ColorRef::Auto));
    }
    Ok(None)
}

/// Unescaped value of an attribute, if present
pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}
