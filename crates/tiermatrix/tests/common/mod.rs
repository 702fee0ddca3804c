//! In-memory XLSX fixtures
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tiermatrix_core::CellAddress;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Solid fill given as ARGB hex, with an optional background
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fill {
    pub fg: Option<String>,
    pub bg: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct Cell {
    value: Option<Value>,
    fill: Option<Fill>,
}

/// One worksheet of a fixture workbook
#[derive(Debug, Clone)]
pub struct SheetFixture {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn value<V: Into<Value>>(&mut self, row: u32, col: u32, value: V) -> &mut Self {
        self.cells.entry((row, col)).or_default().value = Some(value.into());
        self
    }

    /// Solid fill with a foreground color
    pub fn fill(&mut self, row: u32, col: u32, argb: &str) -> &mut Self {
        self.fill_with(row, col, Some(argb), None)
    }

    pub fn fill_with(
        &mut self,
        row: u32,
        col: u32,
        fg: Option<&str>,
        bg: Option<&str>,
    ) -> &mut Self {
        self.cells.entry((row, col)).or_default().fill = Some(Fill {
            fg: fg.map(str::to_string),
            bg: bg.map(str::to_string),
        });
        self
    }

    /// Matrix with its header at `(row, col)`: widths to the right, heights
    /// below, and `price(height, width)` in the grid
    pub fn matrix<F>(
        &mut self,
        row: u32,
        col: u32,
        marker: &str,
        widths: &[f64],
        heights: &[f64],
        price: F,
    ) -> &mut Self
    where
        F: Fn(f64, f64) -> Option<Value>,
    {
        self.value(row, col, marker);
        for (j, w) in widths.iter().enumerate() {
            self.value(row, col + 1 + j as u32, *w);
        }
        for (i, h) in heights.iter().enumerate() {
            let r = row + 1 + i as u32;
            self.value(r, col, *h);
            for (j, w) in widths.iter().enumerate() {
                if let Some(p) = price(*h, *w) {
                    self.value(r, col + 1 + j as u32, p);
                }
            }
        }
        self
    }

    /// Paint a rectangle of cells
    pub fn paint(&mut self, rows: std::ops::Range<u32>, cols: std::ops::Range<u32>, argb: &str) -> &mut Self {
        for r in rows {
            for c in cols.clone() {
                self.fill(r, c, argb);
            }
        }
        self
    }
}

/// Price equal to width + height
pub fn sum_price(h: f64, w: f64) -> Option<Value> {
    Some(Value::Number(w + h))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

fn color_xml(tag: &str, argb: &Option<String>) -> String {
    match argb {
        Some(argb) => format!(r#"<{} rgb="{}"/>"#, tag, argb),
        None => String::new(),
    }
}

/// Serialize sheets into XLSX bytes
pub fn build_xlsx(sheets: &[SheetFixture]) -> Vec<u8> {
    // Distinct fills become cellXfs 1.., fills 2.. (0 and 1 are reserved)
    let mut fills: Vec<Fill> = Vec::new();
    for sheet in sheets {
        for cell in sheet.cells.values() {
            if let Some(fill) = &cell.fill {
                if !fills.contains(fill) {
                    fills.push(fill.clone());
                }
            }
        }
    }

    let mut styles = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    styles.push_str(&format!(
        r#"<fills count="{}"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill>"#,
        fills.len() + 2
    ));
    for fill in &fills {
        styles.push_str(&format!(
            r#"<fill><patternFill patternType="solid">{}{}</patternFill></fill>"#,
            color_xml("fgColor", &fill.fg),
            color_xml("bgColor", &fill.bg)
        ));
    }
    styles.push_str(&format!(
        r#"</fills><cellXfs count="{}"><xf fillId="0"/>"#,
        fills.len() + 1
    ));
    for i in 0..fills.len() {
        styles.push_str(&format!(r#"<xf fillId="{}" applyFill="1"/>"#, i + 2));
    }
    styles.push_str("</cellXfs></styleSheet>");

    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut parts = Vec::new();

    for (i, sheet) in sheets.iter().enumerate() {
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(&sheet.name),
            i + 1,
            i + 1
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        let mut current_row = None;
        for ((row, col), cell) in &sheet.cells {
            if current_row != Some(*row) {
                if current_row.is_some() {
                    xml.push_str("</row>");
                }
                xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
                current_row = Some(*row);
            }
            let reference = CellAddress::new(*row, *col).to_a1_string();
            let style = cell
                .fill
                .as_ref()
                .and_then(|f| fills.iter().position(|x| x == f))
                .map(|idx| format!(r#" s="{}""#, idx + 1))
                .unwrap_or_default();
            match &cell.value {
                Some(Value::Number(n)) => xml.push_str(&format!(
                    r#"<c r="{}"{}><v>{}</v></c>"#,
                    reference, style, n
                )),
                Some(Value::Text(t)) => xml.push_str(&format!(
                    r#"<c r="{}"{} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    style,
                    escape(t)
                )),
                None => xml.push_str(&format!(r#"<c r="{}"{}/>"#, reference, style)),
            }
        }
        if current_row.is_some() {
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), xml));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        let fixed = [
            ("[Content_Types].xml".to_string(), CONTENT_TYPES.to_string()),
            ("xl/workbook.xml".to_string(), workbook),
            ("xl/_rels/workbook.xml.rels".to_string(), rels),
            ("xl/styles.xml".to_string(), styles),
        ];
        for (name, contents) in fixed.iter().chain(parts.iter()) {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

/// Write a fixture workbook to `dir/name`
pub fn write_xlsx(dir: &Path, name: &str, sheets: &[SheetFixture]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_xlsx(sheets)).unwrap();
    path
}
