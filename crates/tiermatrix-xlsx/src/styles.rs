//! styles.xml reading, reduced to background fills

use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use tiermatrix_core::style::{Color, FillStyle, PatternType};

/// Fill table plus the cellXfs -> fill mapping
#[derive(Debug, Default)]
pub(crate) struct ParsedStyles {
    /// `<fills>` in document order
    pub fills: Vec<FillStyle>,
    /// `fillId` of each `<cellXfs>/<xf>`, indexed by the cell `s` attribute
    pub cell_xf_fills: Vec<u32>,
}

impl ParsedStyles {
    /// Resolve a cell style index to its fill
    pub(crate) fn fill_for(&self, style_idx: u32) -> Option<&FillStyle> {
        let fill_id = *self.cell_xf_fills.get(style_idx as usize)?;
        self.fills.get(fill_id as usize)
    }
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<ParsedStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parsed = ParsedStyles::default();

    let mut in_fills = false;
    let mut in_fill = false;
    let mut in_pattern_fill = false;
    let mut in_cell_xfs = false;
    let mut gradient = false;
    let mut current_pattern: Option<PatternType> = None;
    let mut current_fg = Color::Auto;
    let mut current_bg = Color::Auto;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        let is_empty = matches!(event, Ok(Event::Empty(_)));
        match event {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"fills" => in_fills = !is_empty,
                b"fill" if in_fills => {
                    if is_empty {
                        parsed.fills.push(FillStyle::None);
                    } else {
                        in_fill = true;
                        gradient = false;
                        current_pattern = None;
                        current_fg = Color::Auto;
                        current_bg = Color::Auto;
                    }
                }
                b"patternFill" if in_fill => {
                    in_pattern_fill = !is_empty;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"patternType" {
                            if let Ok(v) = attr.unescape_value() {
                                current_pattern = PatternType::from_ooxml(&v);
                            }
                        }
                    }
                }
                b"fgColor" if in_pattern_fill => current_fg = parse_color_attrs(&e),
                b"bgColor" if in_pattern_fill => current_bg = parse_color_attrs(&e),
                b"gradientFill" if in_fill => gradient = true,
                b"cellXfs" => in_cell_xfs = !is_empty,
                b"xf" if in_cell_xfs => {
                    let fill_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"fillId")
                        .and_then(|attr| attr.unescape_value().ok()?.parse::<u32>().ok())
                        .unwrap_or(0);
                    parsed.cell_xf_fills.push(fill_id);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fills" => in_fills = false,
                b"patternFill" => in_pattern_fill = false,
                b"fill" if in_fill => {
                    let fill = if gradient {
                        FillStyle::Gradient
                    } else {
                        finalize_fill(current_pattern, current_fg, current_bg)
                    };
                    parsed.fills.push(fill);
                    in_fill = false;
                }
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    tracing::trace!(
        fills = parsed.fills.len(),
        cell_xfs = parsed.cell_xf_fills.len(),
        "parsed styles"
    );

    Ok(parsed)
}

fn finalize_fill(pattern: Option<PatternType>, fg: Color, bg: Color) -> FillStyle {
    match pattern.unwrap_or(PatternType::None) {
        PatternType::None => FillStyle::None,
        p => FillStyle::Pattern {
            pattern: p,
            foreground: fg,
            background: bg,
        },
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    let mut rgb: Option<String> = None;
    let mut theme: Option<u8> = None;
    let mut tint: Option<f64> = None;
    let mut indexed: Option<u8> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"rgb" => {
                rgb = attr.unescape_value().ok().map(|s| s.to_string());
            }
            b"theme" => {
                theme = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            b"tint" => {
                tint = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
            }
            b"indexed" => {
                indexed = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            _ => {}
        }
    }

    if let Some(color) = rgb.as_deref().and_then(Color::from_hex) {
        return color;
    }

    if let Some(index) = theme {
        let tint = tint.map(|t| (t * 100.0).round() as i8).unwrap_or(0);
        return Color::Theme { index, tint };
    }

    if let Some(i) = indexed {
        return Color::Indexed(i);
    }

    Color::Auto
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fills count="5">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF92CDDC"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="4" tint="0.39997558519241921"/></patternFill></fill>
    <fill><gradientFill degree="90"><stop position="0"><color rgb="FFFF0000"/></stop></gradientFill></fill>
  </fills>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="1" borderId="0"/></cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="3" borderId="0" xfId="0" applyFill="1"><alignment horizontal="center"/></xf>
    <xf numFmtId="0" fontId="0" fillId="4" borderId="0" xfId="0"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_fills_and_cell_xfs() {
        let parsed = read_styles_xml(STYLES.as_bytes()).unwrap();
        assert_eq!(parsed.fills.len(), 5);
        assert_eq!(parsed.cell_xf_fills, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_fill_resolution() {
        let parsed = read_styles_xml(STYLES.as_bytes()).unwrap();
        assert_eq!(parsed.fill_for(0), Some(&FillStyle::None));
        assert_eq!(
            parsed.fill_for(1),
            Some(&FillStyle::Pattern {
                pattern: PatternType::Solid,
                foreground: Color::argb(0xFF, 0x92, 0xCD, 0xDC),
                background: Color::Indexed(64),
            })
        );
        assert_eq!(
            parsed.fill_for(2),
            Some(&FillStyle::Pattern {
                pattern: PatternType::Solid,
                foreground: Color::theme(4, 40),
                background: Color::Auto,
            })
        );
        assert_eq!(parsed.fill_for(3), Some(&FillStyle::Gradient));
        assert_eq!(parsed.fill_for(9), None);
    }

    #[test]
    fn test_malformed_rgb_degrades_to_auto() {
        let xml = r#"<styleSheet><fills><fill><patternFill patternType="solid"><fgColor rgb="FFF"/></patternFill></fill></fills></styleSheet>"#;
        let parsed = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(
            parsed.fills,
            vec![FillStyle::Pattern {
                pattern: PatternType::Solid,
                foreground: Color::Auto,
                background: Color::Auto,
            }]
        );
    }
}
