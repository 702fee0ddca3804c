//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_styles_xml, ParsedStyles};
use tiermatrix_core::{CellAddress, CellValue, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut saw_x = false;
        let mut decoded = None;

        if chars.peek() == Some(&'x') {
            chars.next();
            saw_x = true;

            while hex_chars.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                decoded = u32::from_str_radix(&hex_chars, 16)
                    .ok()
                    .and_then(char::from_u32);
                if decoded.is_none() {
                    hex_chars.push('_');
                }
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                // Not a valid escape sequence, output what we consumed
                result.push('_');
                if saw_x {
                    result.push('x');
                }
                result.push_str(&hex_chars);
            }
        }
    }

    result
}

/// Raw attributes of a `<c>` element plus the text collected inside it
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut cell = PendingCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    cell.reference = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"t" => {
                    cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }
        cell
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening workbook");
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;

        // workbook.xml gives names in tab order, the rels give the part paths
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                tracing::warn!(sheet = %name, r_id = %r_id, "sheet has no worksheet relationship, skipping");
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &shared_strings, &styles)?;
            let (rows, cols) = worksheet.dimensions();
            tracing::debug!(sheet = %name, rows, cols, "read worksheet");
            workbook.add_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        // Runs keep their own spacing (`xml:space="preserve"`)
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs repeat the reading of the text, not the text itself
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        tracing::trace!(count = strings.len(), "read shared strings");
        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<ParsedStyles> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(ParsedStyles::default()),
        };
        read_styles_xml(file)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &ParsedStyles,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        let mut current: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        // Position of the next cell when `r` attributes are omitted
        let mut row_idx: u32 = 0;
        let mut next_col: u32 = 0;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = Self::row_number(&e) {
                            row_idx = r;
                        }
                        next_col = 0;
                    }
                    b"c" => {
                        current = Some(PendingCell::from_element(&e));
                    }
                    b"v" if current.is_some() => in_value = true,
                    b"is" if current.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = Self::row_number(&e) {
                            row_idx = r + 1;
                        }
                    }
                    b"c" => {
                        // Empty cell element (may still carry a style)
                        let cell = PendingCell::from_element(&e);
                        let addr = Self::resolve_address(&cell, row_idx, next_col)?;
                        next_col = addr.col + 1;
                        Self::process_cell(worksheet, addr, cell, shared_strings, styles)?;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(cell) = current.take() {
                            let addr = Self::resolve_address(&cell, row_idx, next_col)?;
                            next_col = addr.col + 1;
                            Self::process_cell(worksheet, addr, cell, shared_strings, styles)?;
                        }
                        in_value = false;
                        in_inline_str = false;
                        in_inline_text = false;
                    }
                    b"row" => {
                        row_idx += 1;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(cell) = current.as_mut() {
                        if in_value {
                            if let Ok(text) = e.unescape() {
                                cell.value = Some(text.trim().to_string());
                            }
                        } else if in_inline_text {
                            if let Ok(text) = e.unescape() {
                                // Rich inline strings arrive as several runs
                                cell.value.get_or_insert_with(String::new).push_str(&text);
                                cell.cell_type = Some("inlineStr".to_string());
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// 0-based row index from a `<row r="..">` element
    fn row_number(e: &BytesStart<'_>) -> Option<u32> {
        e.attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == b"r")
            .and_then(|attr| attr.unescape_value().ok()?.parse::<u32>().ok())
            .map(|r| r.saturating_sub(1))
    }

    fn resolve_address(cell: &PendingCell, row_idx: u32, next_col: u32) -> XlsxResult<CellAddress> {
        match cell.reference.as_deref() {
            Some(cell_ref) => CellAddress::parse(cell_ref).map_err(|e| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
            }),
            None => Ok(CellAddress::new(row_idx, next_col)),
        }
    }

    /// Process a cell and add it to the worksheet
    ///
    /// Formula cells carry their cached result in `<v>`; that is the value
    /// stored.
    fn process_cell(
        worksheet: &mut Worksheet,
        addr: CellAddress,
        cell: PendingCell,
        shared_strings: &[String],
        styles: &ParsedStyles,
    ) -> XlsxResult<()> {
        if let Some(value) = cell.value {
            let cell_value = match cell.cell_type.as_deref() {
                // Shared string
                Some("s") => {
                    let idx: usize = value.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::String(s.clone())
                }

                // Boolean
                Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

                // Error
                Some("e") => CellValue::Error(value),

                // Inline or formula string - decode Excel escape sequences
                Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(&value)),

                // Number (default type or explicit "n")
                None | Some("n") => match value.trim().parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::String(value),
                },

                // Unknown type - treat as string
                Some(_) => CellValue::String(value),
            };

            worksheet.set_value_at(addr.row, addr.col, cell_value);
        }

        if let Some(s) = cell.style {
            match styles.fill_for(s) {
                Some(fill) => worksheet.set_fill_at(addr.row, addr.col, fill.clone()),
                None if s != 0 => {
                    tracing::trace!(cell = %addr, style = s, "style index has no fill entry");
                }
                None => {}
            }
        }

        Ok(())
    }
}
