//! Per-matrix color maps

use ahash::AHashMap;
use tiermatrix_core::Worksheet;

use crate::color::{ColorNormalizer, DEFAULT_COLOR};
use crate::dimensions::Dimensions;
use crate::locator::Anchor;
use crate::numeric::Number;
use crate::offset::Offset;

/// Canonical colors keyed by `(height, width)` value pairs
///
/// Keys are dimension values rather than indices, so a lookup with the
/// primary matrix's values works even when a variant's axes differ.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    colors: AHashMap<(Number, Number), String>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, height: Number, width: Number, color: String) {
        self.colors.insert((height, width), color);
    }

    /// Color at a value pair, [`DEFAULT_COLOR`] when absent
    pub fn get(&self, height: Number, width: Number) -> &str {
        self.colors
            .get(&(height, width))
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of entries carrying a color other than the default
    pub fn colored_count(&self) -> usize {
        self.colors
            .values()
            .filter(|c| ColorNormalizer::is_meaningful(c))
            .count()
    }
}

/// Canonical color of a grid cell, by 0-based position
///
/// Positions outside the sheet extent read as [`DEFAULT_COLOR`].
pub fn color_at(sheet: &Worksheet, normalizer: &ColorNormalizer, row: u32, col: u32) -> String {
    let (rows, cols) = sheet.dimensions();
    if row >= rows || col >= cols {
        return DEFAULT_COLOR.to_string();
    }
    normalizer.normalize(sheet.fill_at(row, col))
}

/// Read a full color map for a matrix
pub fn read_color_matrix(
    sheet: &Worksheet,
    anchor: &Anchor,
    offset: Offset,
    dims: &Dimensions,
    normalizer: &ColorNormalizer,
) -> ColorMap {
    let mut map = ColorMap::new();
    for (i_h, height) in dims.heights.iter().enumerate() {
        for (i_w, width) in dims.widths.iter().enumerate() {
            let color = match offset.cell(anchor, i_h, i_w) {
                Some((row, col)) => color_at(sheet, normalizer, row, col),
                None => DEFAULT_COLOR.to_string(),
            };
            map.insert(*height, *width, color);
        }
    }
    tracing::debug!(
        sheet = sheet.name(),
        anchor = %anchor,
        offset = %offset,
        cells = map.len(),
        colored = map.colored_count(),
        "read color matrix"
    );
    map
}
