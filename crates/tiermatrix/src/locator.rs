//! Header anchor search
//!
//! Anchors are found by text pattern. Each matrix kind has an ordered list of
//! [`Matcher`] strategies; the first strategy that finds a cell wins.

use std::fmt;

use lazy_regex::regex;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tiermatrix_core::{CellAddress, CellValue, Worksheet};

use crate::config::{ProcessorConfig, VariantProtocol};

/// What an anchor marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnchorKind {
    /// Header of the price matrix
    Primary,
    /// Header of a color-only variant matrix
    Variant(u32),
}

/// Header cell of a matrix, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Anchor {
    pub row: u32,
    pub col: u32,
    pub kind: AnchorKind,
}

impl Anchor {
    pub fn new(row: u32, col: u32, kind: AnchorKind) -> Self {
        Self { row, col, kind }
    }

    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AnchorKind::Primary => write!(f, "primary@{}", self.address()),
            AnchorKind::Variant(n) => write!(f, "variant {}@{}", n, self.address()),
        }
    }
}

/// One anchor search strategy
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Scan the first column, top to bottom
    FirstColumn(Vec<Regex>),
    /// Scan the whole bounded grid, row-major
    Grid {
        patterns: Vec<Regex>,
        /// Only consider text cells
        text_only: bool,
    },
    /// Find a label anywhere in the bounded grid, then the axis header
    /// (`h/w`) near it; the label itself is the anchor when no header is
    /// close enough
    LabelledGrid(Vec<Regex>),
}

impl Matcher {
    fn name(&self) -> &'static str {
        match self {
            Matcher::FirstColumn(_) => "first-column",
            Matcher::Grid { .. } => "grid",
            Matcher::LabelledGrid(_) => "labelled-grid",
        }
    }
}

/// The generic `h/w` axis header
fn axis_header() -> &'static Regex {
    regex!(r"(?i)\bh\s*/\s*w\b")
}

/// Case-insensitive patterns built from templates with a `{n}` placeholder
fn patterns(templates: &[&str], n: u32) -> Vec<Regex> {
    templates
        .iter()
        .filter_map(|template| {
            let source = template.replace("{n}", &n.to_string());
            match RegexBuilder::new(&source).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(pattern = %source, error = %e, "invalid anchor pattern");
                    None
                }
            }
        })
        .collect()
}

/// Variant labels looked up in the first column
const COLUMN_LABELS: &[&str] = &[
    r"Thk\.{n}",
    r"\b{n}\b",
    r"Thickness\s*{n}",
    r"หนา\s*{n}",
    r"ชั้น\s*{n}",
    r"ระดับ\s*{n}",
];

/// Thickness labels with an explicit unit, looked up anywhere
const UNIT_LABELS: &[&str] = &[
    r"Thk\.{n}\s*mm",
    r"{n}\s*mm",
    r"Thickness\s*{n}",
    r"หนา\s*{n}",
];

/// Strategies for the primary matrix, in priority order
pub fn primary_matchers(protocol: &VariantProtocol) -> Vec<Matcher> {
    let mut matchers = vec![Matcher::FirstColumn(vec![Regex::clone(regex!(r"\b1\b"))])];
    if let VariantProtocol::Thickness { primary, .. } = protocol {
        matchers.push(Matcher::Grid {
            patterns: patterns(&[r"\b{n}\s*mm\b"], *primary),
            text_only: false,
        });
    }
    matchers.push(Matcher::Grid {
        patterns: vec![axis_header().clone()],
        text_only: true,
    });
    matchers
}

/// Strategies for variant matrix `n`, in priority order
pub fn variant_matchers(protocol: &VariantProtocol, n: u32) -> Vec<Matcher> {
    let mut matchers = vec![Matcher::FirstColumn(patterns(COLUMN_LABELS, n))];
    if let VariantProtocol::Thickness { .. } = protocol {
        matchers.push(Matcher::LabelledGrid(patterns(UNIT_LABELS, n)));
    }
    matchers
}

/// Anchor search over one sheet
#[derive(Debug, Clone, Copy)]
pub struct HeaderLocator<'a> {
    sheet: &'a Worksheet,
    scan_rows: u32,
    scan_cols: u32,
    neighborhood: u32,
}

impl<'a> HeaderLocator<'a> {
    pub fn new(sheet: &'a Worksheet, config: &ProcessorConfig) -> Self {
        Self {
            sheet,
            scan_rows: config.scan_rows,
            scan_cols: config.scan_cols,
            neighborhood: config.neighborhood,
        }
    }

    /// Locate the primary matrix
    pub fn primary(&self, protocol: &VariantProtocol) -> Option<Anchor> {
        let (row, col) = self.locate(&primary_matchers(protocol))?;
        Some(Anchor::new(row, col, AnchorKind::Primary))
    }

    /// Locate variant matrix `n`
    pub fn variant(&self, protocol: &VariantProtocol, n: u32) -> Option<Anchor> {
        let (row, col) = self.locate(&variant_matchers(protocol, n))?;
        Some(Anchor::new(row, col, AnchorKind::Variant(n)))
    }

    /// Run strategies in order and return the first hit
    pub fn locate(&self, matchers: &[Matcher]) -> Option<(u32, u32)> {
        matchers.iter().find_map(|matcher| {
            let hit = match matcher {
                Matcher::FirstColumn(patterns) => self.scan_first_column(patterns),
                Matcher::Grid {
                    patterns,
                    text_only,
                } => self.scan_grid(patterns, *text_only),
                Matcher::LabelledGrid(labels) => self
                    .scan_grid(labels, false)
                    .map(|(row, col)| self.axis_header_near(row, col).unwrap_or((row, col))),
            };
            if let Some((row, col)) = hit {
                tracing::trace!(
                    sheet = self.sheet.name(),
                    strategy = matcher.name(),
                    cell = %CellAddress::new(row, col),
                    "anchor matched"
                );
            }
            hit
        })
    }

    fn scan_first_column(&self, patterns: &[Regex]) -> Option<(u32, u32)> {
        let (rows, cols) = self.sheet.dimensions();
        if cols == 0 {
            return None;
        }
        (0..rows.min(self.scan_rows))
            .find(|&row| self.matches(row, 0, patterns, false))
            .map(|row| (row, 0))
    }

    fn scan_grid(&self, patterns: &[Regex], text_only: bool) -> Option<(u32, u32)> {
        let (rows, cols) = self.sheet.dimensions();
        let cols = cols.min(self.scan_cols);
        (0..rows.min(self.scan_rows)).find_map(|row| {
            (0..cols)
                .find(|&col| self.matches(row, col, patterns, text_only))
                .map(|col| (row, col))
        })
    }

    /// First axis header within the neighborhood of a label, row-major
    fn axis_header_near(&self, row: u32, col: u32) -> Option<(u32, u32)> {
        let (rows, cols) = self.sheet.dimensions();
        let header = [axis_header().clone()];
        let row_range = row.saturating_sub(self.neighborhood)
            ..rows.min(row.saturating_add(self.neighborhood).saturating_add(1));
        let col_start = col.saturating_sub(self.neighborhood);
        let col_end = cols.min(col.saturating_add(self.neighborhood).saturating_add(1));

        row_range.into_iter().find_map(|r| {
            (col_start..col_end)
                .find(|&c| self.matches(r, c, &header, false))
                .map(|c| (r, c))
        })
    }

    fn matches(&self, row: u32, col: u32, patterns: &[Regex], text_only: bool) -> bool {
        let Some(value) = self.sheet.value_at(row, col) else {
            return false;
        };
        if text_only && !value.is_string() {
            return false;
        }
        let text = cell_text(value);
        !text.is_empty() && patterns.iter().any(|re| re.is_match(&text))
    }
}

/// Trimmed display text of a cell
pub fn cell_text(value: &CellValue) -> String {
    value.to_string().trim().to_string()
}
