//! Pre-pass over the workbook that sizes the output schema
//!
//! Every price row carries the same set of color columns, so the matrices
//! present on each sheet are enumerated before any record is assembled.

use serde::Serialize;
use tiermatrix_core::{Workbook, Worksheet};

use crate::config::{ProcessorConfig, VariantProtocol};
use crate::locator::{Anchor, HeaderLocator};

/// Matrices found on one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetInventory {
    /// Position of the sheet in the workbook
    pub index: usize,
    pub sheet: String,
    /// Primary anchor; `None` means the sheet holds no matrix
    pub primary: Option<Anchor>,
    /// Variant anchors in search order
    pub variants: Vec<Anchor>,
}

impl SheetInventory {
    /// Identifiers of the matrices present, primary first
    pub fn matrix_ids(&self, protocol: &VariantProtocol) -> Vec<u32> {
        if self.primary.is_none() {
            return Vec::new();
        }
        std::iter::once(protocol.primary_id())
            .chain(self.variants.iter().filter_map(variant_id))
            .collect()
    }

    pub fn matrix_count(&self) -> usize {
        if self.primary.is_some() {
            1 + self.variants.len()
        } else {
            0
        }
    }

    /// Anchor of variant `id`, if present
    pub fn variant(&self, id: u32) -> Option<&Anchor> {
        self.variants.iter().find(|a| variant_id(a) == Some(id))
    }
}

fn variant_id(anchor: &Anchor) -> Option<u32> {
    match anchor.kind {
        crate::AnchorKind::Variant(n) => Some(n),
        crate::AnchorKind::Primary => None,
    }
}

/// One output color column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorColumn {
    /// Matrix identifier feeding the column
    pub id: u32,
    pub name: String,
}

/// Inventory of a whole workbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// Sheets selected for extraction, in workbook order
    pub sheets: Vec<SheetInventory>,
    /// Color columns shared by every price row
    pub columns: Vec<ColorColumn>,
}

impl Inventory {
    pub fn sheet(&self, index: usize) -> Option<&SheetInventory> {
        self.sheets.iter().find(|s| s.index == index)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Largest matrix count over all sheets
    pub fn max_matrices(&self) -> usize {
        self.sheets
            .iter()
            .map(SheetInventory::matrix_count)
            .max()
            .unwrap_or(0)
    }
}

/// Enumerates the matrices of each sheet
#[derive(Debug, Clone, Copy)]
pub struct MatrixInventory<'a> {
    config: &'a ProcessorConfig,
}

impl<'a> MatrixInventory<'a> {
    pub fn new(config: &'a ProcessorConfig) -> Self {
        Self { config }
    }

    /// Indices of the sheets a run extracts from
    ///
    /// Table-of-contents sheets are left out and do not count towards
    /// `max_sheets`.
    pub fn selected_sheets(&self, workbook: &Workbook) -> Vec<usize> {
        let limit = self.config.max_sheets.unwrap_or(usize::MAX);
        workbook
            .worksheets()
            .enumerate()
            .filter(|(_, sheet)| !self.config.is_toc_sheet(sheet.name()))
            .map(|(index, _)| index)
            .take(limit)
            .collect()
    }

    /// Scan every selected sheet and derive the color columns
    pub fn scan(&self, workbook: &Workbook) -> Inventory {
        let sheets: Vec<SheetInventory> = self
            .selected_sheets(workbook)
            .into_iter()
            .filter_map(|index| {
                let sheet = workbook.worksheet(index)?;
                Some(self.scan_sheet(index, sheet))
            })
            .collect();

        let protocol = &self.config.protocol;
        let ids: Vec<u32> = match protocol {
            VariantProtocol::Numbered { .. } => {
                let max = sheets
                    .iter()
                    .map(SheetInventory::matrix_count)
                    .max()
                    .unwrap_or(0)
                    .max(1);
                (1..=max as u32).collect()
            }
            VariantProtocol::Thickness { primary, variants } => std::iter::once(*primary)
                .chain(variants.iter().copied())
                .collect(),
        };
        let columns = ids
            .into_iter()
            .map(|id| ColorColumn {
                id,
                name: protocol.color_column(id),
            })
            .collect();

        Inventory { sheets, columns }
    }

    /// Matrices of one sheet
    pub fn scan_sheet(&self, index: usize, sheet: &Worksheet) -> SheetInventory {
        let protocol = &self.config.protocol;
        let locator = HeaderLocator::new(sheet, self.config);
        let primary = locator.primary(protocol);

        let variants = match (primary, protocol) {
            (None, _) => Vec::new(),
            // Contiguous numbering: the first gap ends the probe
            (Some(_), VariantProtocol::Numbered { max_variants }) => (2..=*max_variants)
                .map_while(|n| locator.variant(protocol, n))
                .collect(),
            (Some(_), VariantProtocol::Thickness { variants, .. }) => variants
                .iter()
                .filter_map(|&n| locator.variant(protocol, n))
                .collect(),
        };

        tracing::debug!(
            sheet = sheet.name(),
            primary = ?primary.map(|a| a.address().to_string()),
            variants = variants.len(),
            "inventoried sheet"
        );

        SheetInventory {
            index,
            sheet: sheet.name().to_string(),
            primary,
            variants,
        }
    }
}
