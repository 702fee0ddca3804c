//! Anchor-to-data displacement
//!
//! Data cells do not always start right after the header line: merged title
//! rows push some grids one or two cells further. The calibrator samples the
//! top-left corner of the grid at each candidate offset and keeps the one
//! that lands on the most colored cells.

use std::fmt;

use tiermatrix_core::Worksheet;

use crate::color::ColorNormalizer;
use crate::color_matrix::color_at;
use crate::config::CalibrationConfig;
use crate::dimensions::Dimensions;
use crate::locator::Anchor;

/// Displacement from an anchor to the first data cell
///
/// The 1-based sheet row of grid row `i_h` is `anchor.row + rows + i_h`
/// (`anchor.row` being 0-based), and likewise for columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub rows: u32,
    pub cols: u32,
}

impl Offset {
    /// Data starts diagonally adjacent to the anchor
    pub const FIXED: Offset = Offset { rows: 2, cols: 2 };

    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// 0-based position of grid cell `(i_h, i_w)`
    ///
    /// `None` only when the position does not fit the sheet's address space.
    pub fn cell(&self, anchor: &Anchor, i_h: usize, i_w: usize) -> Option<(u32, u32)> {
        let row = displace(anchor.row, self.rows, i_h)?;
        let col = displace(anchor.col, self.cols, i_w)?;
        Some((row, col))
    }
}

fn displace(base: u32, offset: u32, index: usize) -> Option<u32> {
    let index = u32::try_from(index).ok()?;
    base.checked_add(offset)?
        .checked_add(index)?
        .checked_sub(1)
}

impl From<(u32, u32)> for Offset {
    fn from((rows, cols): (u32, u32)) -> Self {
        Self::new(rows, cols)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// Picks the offset of an irregularly placed grid
#[derive(Debug, Clone, Copy)]
pub struct OffsetCalibrator<'a> {
    sheet: &'a Worksheet,
    normalizer: &'a ColorNormalizer,
    config: &'a CalibrationConfig,
}

impl<'a> OffsetCalibrator<'a> {
    pub fn new(
        sheet: &'a Worksheet,
        normalizer: &'a ColorNormalizer,
        config: &'a CalibrationConfig,
    ) -> Self {
        Self {
            sheet,
            normalizer,
            config,
        }
    }

    /// Colored cells in the sample window at `offset`
    pub fn score(&self, anchor: &Anchor, offset: Offset, dims: &Dimensions) -> usize {
        let rows = dims.heights.len().min(self.config.sample_rows);
        let cols = dims.widths.len().min(self.config.sample_cols);

        (0..rows)
            .flat_map(|i_h| (0..cols).map(move |i_w| (i_h, i_w)))
            .filter_map(|(i_h, i_w)| offset.cell(anchor, i_h, i_w))
            .filter(|&(row, col)| {
                let color = color_at(self.sheet, self.normalizer, row, col);
                ColorNormalizer::is_meaningful(&color)
            })
            .count()
    }

    /// Highest-scoring candidate, rows in the outer loop
    ///
    /// Ties keep the earlier candidate. When nothing scores above zero the
    /// configured default offset is returned.
    pub fn calibrate(&self, anchor: &Anchor, dims: &Dimensions) -> Offset {
        let default = Offset::from(self.config.default_offset);

        let (best, score) = self
            .candidates()
            .map(|offset| (offset, self.score(anchor, offset, dims)))
            .fold((default, 0), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        tracing::debug!(
            sheet = self.sheet.name(),
            anchor = %anchor,
            offset = %best,
            score,
            "calibrated offset"
        );
        best
    }

    fn candidates(&self) -> impl Iterator<Item = Offset> + '_ {
        self.config.row_offsets.iter().flat_map(move |&rows| {
            self.config
                .col_offsets
                .iter()
                .map(move |&cols| Offset::new(rows, cols))
        })
    }
}
