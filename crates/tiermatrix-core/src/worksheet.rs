//! Worksheet type

use ahash::AHashMap;

use crate::cell::{CellAddress, CellValue};
use crate::style::FillStyle;

/// A worksheet (single sheet in a workbook)
///
/// Values and fills are stored sparsely and independently: a cell may carry a
/// fill without a value and the other way round. Missing entries read as
/// "no value" and "no fill".
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell values keyed by (row, col), 0-based
    values: AHashMap<(u32, u32), CellValue>,
    /// Background fills keyed by (row, col), 0-based
    fills: AHashMap<(u32, u32), FillStyle>,
    /// Last used row (0-based), over values and fills
    max_row: Option<u32>,
    /// Last used column (0-based), over values and fills
    max_col: Option<u32>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get a cell value by row and column indices
    ///
    /// Empty values are reported as `None`.
    pub fn value_at(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.values.get(&(row, col)).filter(|v| !v.is_empty())
    }

    /// Get a cell value by address string (e.g., "A1")
    pub fn value(&self, address: &str) -> crate::Result<Option<&CellValue>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr.row, addr.col))
    }

    /// Get the background fill of a cell
    pub fn fill_at(&self, row: u32, col: u32) -> Option<&FillStyle> {
        self.fills.get(&(row, col))
    }

    /// Set a cell value by row and column indices
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&(row, col));
            return;
        }
        self.values.insert((row, col), value);
        self.touch(row, col);
    }

    /// Set a cell background fill
    pub fn set_fill_at(&mut self, row: u32, col: u32, fill: FillStyle) {
        self.fills.insert((row, col), fill);
        self.touch(row, col);
    }

    fn touch(&mut self, row: u32, col: u32) {
        self.max_row = Some(self.max_row.map_or(row, |r| r.max(row)));
        self.max_col = Some(self.max_col.map_or(col, |c| c.max(col)));
    }

    // === Extent ===

    /// Used extent as `(rows, cols)` counts
    ///
    /// Both values and styled cells count towards the extent. An untouched
    /// sheet reports `(0, 0)`.
    pub fn dimensions(&self) -> (u32, u32) {
        match (self.max_row, self.max_col) {
            (Some(r), Some(c)) => (r + 1, c + 1),
            _ => (0, 0),
        }
    }

    /// Number of rows in the used extent
    pub fn row_count(&self) -> u32 {
        self.dimensions().0
    }

    /// Number of columns in the used extent
    pub fn col_count(&self) -> u32 {
        self.dimensions().1
    }

    /// Number of cells holding a value
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Check if the sheet holds neither values nor fills
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.fills.is_empty()
    }

    /// Iterate over non-empty values in row-major order
    pub fn values(&self) -> impl Iterator<Item = (CellAddress, &CellValue)> {
        let mut keys: Vec<_> = self.values.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter().filter_map(move |(row, col)| {
            self.values
                .get(&(row, col))
                .map(|v| (CellAddress::new(row, col), v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_sheet_is_empty() {
        let sheet = Worksheet::new("Sheet1");
        assert_eq!(sheet.name(), "Sheet1");
        assert_eq!(sheet.dimensions(), (0, 0));
        assert!(sheet.is_empty());
        assert_eq!(sheet.value_at(0, 0), None);
    }

    #[test]
    fn test_values_and_fills_are_independent() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(1, 1, 800.0);
        sheet.set_fill_at(2, 3, FillStyle::solid(Color::RED));

        assert_eq!(sheet.value_at(1, 1), Some(&CellValue::Number(800.0)));
        assert_eq!(sheet.fill_at(1, 1), None);
        assert_eq!(sheet.value_at(2, 3), None);
        assert!(sheet.fill_at(2, 3).is_some());
    }

    #[test]
    fn test_dimensions_include_styled_cells() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(4, 1, "x");
        sheet.set_fill_at(0, 6, FillStyle::solid(Color::RED));
        assert_eq!(sheet.dimensions(), (5, 7));
    }

    #[test]
    fn test_setting_empty_clears_value() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(0, 0, "x");
        sheet.set_value_at(0, 0, CellValue::Empty);
        assert_eq!(sheet.value_at(0, 0), None);
        assert_eq!(sheet.value_count(), 0);
    }

    #[test]
    fn test_value_by_address() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(2, 1, "h/w");
        assert_eq!(sheet.value("B3").unwrap(), Some(&CellValue::from("h/w")));
        assert!(sheet.value("3B").is_err());
    }

    #[test]
    fn test_values_iterate_row_major() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(1, 0, "c");
        sheet.set_value_at(0, 2, "b");
        sheet.set_value_at(0, 0, "a");
        let order: Vec<String> = sheet.values().map(|(a, _)| a.to_string()).collect();
        assert_eq!(order, vec!["A1", "C1", "A2"]);
    }
}
