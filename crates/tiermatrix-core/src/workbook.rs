//! Workbook type - the main document structure

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::style::FillStyle;
use crate::worksheet::Worksheet;

/// A workbook (spreadsheet document)
///
/// Worksheets keep the order in which they were added, which is the tab
/// order of the source file.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook with no worksheets
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.name()).collect()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get a worksheet by name, failing if it does not exist
    pub fn require_worksheet(&self, name: &str) -> Result<&Worksheet> {
        self.worksheet_by_name(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add an existing worksheet to the workbook
    pub fn add_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        if self.worksheet_by_name(worksheet.name()).is_some() {
            return Err(Error::DuplicateSheetName(worksheet.name().to_string()));
        }
        let index = self.worksheets.len();
        self.worksheets.push(worksheet);
        Ok(index)
    }

    /// Cell value of a named sheet (value view)
    pub fn value_at(&self, sheet: &str, row: u32, col: u32) -> Option<&CellValue> {
        self.worksheet_by_name(sheet)?.value_at(row, col)
    }

    /// Cell fill of a named sheet (fill view)
    pub fn fill_at(&self, sheet: &str, row: u32, col: u32) -> Option<&FillStyle> {
        self.worksheet_by_name(sheet)?.fill_at(row, col)
    }
}
