//! Width and height axes of a matrix

use tiermatrix_core::Worksheet;

use crate::locator::Anchor;
use crate::numeric::{to_number, Number};

/// Axis values of one matrix
///
/// Widths run right along the anchor row, heights run down the anchor
/// column. Each axis stops at its first non-numeric cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub widths: Vec<Number>,
    pub heights: Vec<Number>,
}

impl Dimensions {
    /// Read both axes from an anchor, capping each at `limit` values
    pub fn read(sheet: &Worksheet, anchor: &Anchor, limit: Option<usize>) -> Self {
        let (rows, cols) = sheet.dimensions();
        let limit = limit.unwrap_or(usize::MAX);

        let widths = (anchor.col.saturating_add(1)..cols)
            .map(|col| to_number(sheet.value_at(anchor.row, col)))
            .take_while(Option::is_some)
            .flatten()
            .take(limit)
            .collect();
        let heights = (anchor.row.saturating_add(1)..rows)
            .map(|row| to_number(sheet.value_at(row, anchor.col)))
            .take_while(Option::is_some)
            .flatten()
            .take(limit)
            .collect();

        Self { widths, heights }
    }

    /// Either axis is empty
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty() || self.heights.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.heights.len(), self.widths.len())
    }

    pub fn width_range(&self) -> Option<(Number, Number)> {
        range(&self.widths)
    }

    pub fn height_range(&self) -> Option<(Number, Number)> {
        range(&self.heights)
    }
}

fn range(values: &[Number]) -> Option<(Number, Number)> {
    let min = values.iter().min()?;
    let max = values.iter().max()?;
    Some((*min, *max))
}
