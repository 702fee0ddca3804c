//! Record assembly
//!
//! A [`Processor`] owns one workbook for the length of a run and walks its
//! sheets in order. Each sheet either contributes one type record plus its
//! priced cells, or a skip entry; nothing in between.

use std::io::{Read, Seek};
use std::path::Path;
use std::time::Instant;

use tiermatrix_core::{Workbook, Worksheet};
use tiermatrix_xlsx::XlsxReader;

use crate::color::{ColorNormalizer, DEFAULT_COLOR};
use crate::color_matrix::{read_color_matrix, ColorMap};
use crate::config::{ProcessorConfig, VariantProtocol};
use crate::dimensions::Dimensions;
use crate::error::{ExtractResult, SheetError};
use crate::inventory::{ColorColumn, Inventory, MatrixInventory, SheetInventory};
use crate::locator::{cell_text, Anchor};
use crate::numeric::{to_number, Number};
use crate::offset::{Offset, OffsetCalibrator};
use crate::records::{
    Extraction, PriceRecord, RunStatus, SkipEntry, SkipReason, TypeRecord,
};
use crate::series::series_name;

/// Sheet-level metadata found next to its label cell
#[derive(Debug, Clone, PartialEq)]
struct SheetMetadata {
    glass_qty: Number,
    description: String,
}

impl Default for SheetMetadata {
    fn default() -> Self {
        Self {
            glass_qty: Number::Int(1),
            description: String::new(),
        }
    }
}

/// Priced cell before IDs are assigned
#[derive(Debug)]
struct PricedCell {
    width: Number,
    height: Number,
    price: Number,
    colors: Vec<String>,
}

/// Output of one successfully extracted sheet
#[derive(Debug)]
struct SheetOutput {
    metadata: SheetMetadata,
    dims: Dimensions,
    cells: Vec<PricedCell>,
}

/// Extracts price and type records from one workbook
#[derive(Debug)]
pub struct Processor {
    workbook: Workbook,
    series: String,
    config: ProcessorConfig,
    normalizer: ColorNormalizer,
}

impl Processor {
    /// Create a processor over an already loaded workbook
    pub fn new<S: Into<String>>(workbook: Workbook, series: S, config: ProcessorConfig) -> Self {
        let normalizer = ColorNormalizer::new(&config.excluded_colors);
        Self {
            workbook,
            series: series.into(),
            config,
            normalizer,
        }
    }

    /// Open an XLSX file
    ///
    /// `name` is the originally uploaded filename; the series label is taken
    /// from it when given, otherwise from `path`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        name: Option<&str>,
        config: ProcessorConfig,
    ) -> ExtractResult<Self> {
        let path = path.as_ref();
        config.validate()?;
        let workbook = XlsxReader::read_file(path)?;
        let filename = match name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        tracing::info!(path = %path.display(), sheets = workbook.sheet_count(), "opened workbook");
        Ok(Self::new(workbook, series_name(&filename), config))
    }

    /// Read an XLSX document from any seekable source
    pub fn from_reader<R: Read + Seek>(
        reader: R,
        name: &str,
        config: ProcessorConfig,
    ) -> ExtractResult<Self> {
        config.validate()?;
        let workbook = XlsxReader::read(reader)?;
        Ok(Self::new(workbook, series_name(name), config))
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Matrices per sheet and the resulting color columns
    pub fn inventory(&self) -> Inventory {
        MatrixInventory::new(&self.config).scan(&self.workbook)
    }

    /// Extract every sheet, consuming the processor
    ///
    /// The workbook is dropped when the run ends, whatever the outcome.
    pub fn run(self) -> Extraction {
        let start = Instant::now();
        let budget = self.config.time_budget();
        let inventory = self.inventory();

        let mut extraction = Extraction {
            series: self.series.clone(),
            color_columns: inventory.column_names(),
            price_records: Vec::new(),
            type_records: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
            processed_sheets: 0,
            total_records: 0,
            elapsed: Default::default(),
            status: RunStatus::Complete,
        };
        let mut unprocessed = 0usize;

        for (index, name) in self.workbook.sheet_names().into_iter().enumerate() {
            if self.config.is_toc_sheet(name) {
                tracing::debug!(sheet = name, "skipping table of contents");
                extraction
                    .skipped
                    .push(SkipEntry::new(name, SkipReason::TableOfContents));
                continue;
            }

            let Some(entry) = inventory.sheet(index) else {
                extraction
                    .skipped
                    .push(SkipEntry::new(name, SkipReason::SheetLimit));
                continue;
            };

            let out_of_time = budget.map_or(false, |b| start.elapsed() >= b);
            if unprocessed > 0 || out_of_time {
                unprocessed += 1;
                extraction
                    .skipped
                    .push(SkipEntry::new(name, SkipReason::TimeBudgetExceeded));
                continue;
            }

            match self.process_sheet(name, entry, &inventory.columns, &mut extraction.warnings) {
                Ok(output) => {
                    self.emit(name, output, &mut extraction);
                    extraction.processed_sheets += 1;
                }
                Err(e) => {
                    let reason = match e {
                        SheetError::MissingAnchor => SkipReason::NoMainMatrix,
                        SheetError::MissingDimensions => SkipReason::NoDimensions,
                        other => SkipReason::Failed(other.to_string()),
                    };
                    tracing::warn!(sheet = name, %reason, "skipping sheet");
                    extraction.skipped.push(SkipEntry::new(name, reason));
                }
            }
        }

        if unprocessed > 0 {
            let message = format!(
                "Time budget exceeded: {} sheet(s) not processed",
                unprocessed
            );
            tracing::warn!("{}", message);
            extraction.warnings.push(message);
            extraction.status = RunStatus::TimedOut { unprocessed };
        }

        extraction.total_records = extraction.price_records.len();
        extraction.elapsed = start.elapsed();
        tracing::info!(
            series = %extraction.series,
            processed = extraction.processed_sheets,
            skipped = extraction.skipped.len(),
            records = extraction.total_records,
            elapsed_ms = extraction.elapsed.as_millis() as u64,
            "extraction finished"
        );
        extraction
    }

    /// Append a sheet's rows with file-scoped sequential IDs
    fn emit(&self, name: &str, output: SheetOutput, extraction: &mut Extraction) {
        let sheet_type = name.trim().to_string();
        let SheetOutput {
            metadata,
            dims,
            cells,
        } = output;

        // Non-empty axes are guaranteed by process_sheet
        if let (Some((width_min, width_max)), Some((height_min, height_max))) =
            (dims.width_range(), dims.height_range())
        {
            extraction.type_records.push(TypeRecord {
                id: extraction.type_records.len() as u64 + 1,
                serie: self.series.clone(),
                sheet_type: sheet_type.clone(),
                description: metadata.description,
                width_min,
                width_max,
                height_min,
                height_max,
            });
        }

        let count = cells.len();
        for cell in cells {
            extraction.price_records.push(PriceRecord {
                id: extraction.price_records.len() as u64 + 1,
                serie: self.series.clone(),
                sheet_type: sheet_type.clone(),
                width: cell.width,
                height: cell.height,
                price: cell.price,
                glass_qty: metadata.glass_qty,
                colors: cell.colors,
            });
        }
        tracing::info!(sheet = name, records = count, "processed sheet");
    }

    fn process_sheet(
        &self,
        name: &str,
        entry: &SheetInventory,
        columns: &[ColorColumn],
        warnings: &mut Vec<String>,
    ) -> Result<SheetOutput, SheetError> {
        let sheet = self.workbook.require_worksheet(name)?;
        let protocol = &self.config.protocol;

        let metadata = self.read_metadata(sheet);

        let primary = entry.primary.ok_or(SheetError::MissingAnchor)?;
        let dims = Dimensions::read(sheet, &primary, self.config.max_dimension_len);
        if dims.is_empty() {
            return Err(SheetError::MissingDimensions);
        }
        tracing::debug!(
            sheet = name,
            anchor = %primary,
            heights = dims.heights.len(),
            widths = dims.widths.len(),
            "primary matrix"
        );

        let maps: Vec<Option<ColorMap>> = columns
            .iter()
            .map(|column| {
                if column.id == protocol.primary_id() {
                    return Some(read_color_matrix(
                        sheet,
                        &primary,
                        Offset::FIXED,
                        &dims,
                        &self.normalizer,
                    ));
                }
                match entry.variant(column.id) {
                    Some(anchor) => Some(self.variant_colors(
                        sheet, anchor, &primary, &dims, column.id, warnings,
                    )),
                    None => {
                        if let VariantProtocol::Thickness { .. } = protocol {
                            warnings.push(format!(
                                "Sheet {}: {} matrix not found",
                                name,
                                protocol.label(column.id)
                            ));
                        }
                        None
                    }
                }
            })
            .collect();

        let mut cells = Vec::new();
        for (i_h, height) in dims.heights.iter().enumerate() {
            for (i_w, width) in dims.widths.iter().enumerate() {
                let Some((row, col)) = Offset::FIXED.cell(&primary, i_h, i_w) else {
                    continue;
                };
                let Some(price) = to_number(sheet.value_at(row, col)) else {
                    continue;
                };
                let colors = maps
                    .iter()
                    .map(|map| match map {
                        Some(map) => map.get(*height, *width).to_string(),
                        None => DEFAULT_COLOR.to_string(),
                    })
                    .collect();
                cells.push(PricedCell {
                    width: *width,
                    height: *height,
                    price,
                    colors,
                });
            }
        }

        Ok(SheetOutput {
            metadata,
            dims,
            cells,
        })
    }

    /// Colors of one variant matrix
    ///
    /// Same axes as the primary matrix: fixed offset. Own axes that differ:
    /// calibrated offset over the variant's own values. No axes of its own:
    /// calibrated offset over the primary values, anchored on the variant row
    /// and the primary column.
    fn variant_colors(
        &self,
        sheet: &Worksheet,
        anchor: &Anchor,
        primary: &Anchor,
        primary_dims: &Dimensions,
        id: u32,
        warnings: &mut Vec<String>,
    ) -> ColorMap {
        let label = self.config.protocol.label(id);
        let calibrator =
            OffsetCalibrator::new(sheet, &self.normalizer, &self.config.calibration);
        let own = Dimensions::read(sheet, anchor, self.config.max_dimension_len);

        if own == *primary_dims {
            return read_color_matrix(sheet, anchor, Offset::FIXED, primary_dims, &self.normalizer);
        }

        if !own.is_empty() {
            let (h, w) = own.shape();
            let (ph, pw) = primary_dims.shape();
            let message = format!(
                "Sheet {}: {} dimensions differ from main matrix ({}x{} vs {}x{})",
                sheet.name(),
                label,
                h,
                w,
                ph,
                pw
            );
            tracing::warn!("{}", message);
            warnings.push(message);
            let offset = calibrator.calibrate(anchor, &own);
            return read_color_matrix(sheet, anchor, offset, &own, &self.normalizer);
        }

        let message = format!(
            "Sheet {}: no dimensions for {}, using main matrix dimensions",
            sheet.name(),
            label
        );
        tracing::warn!("{}", message);
        warnings.push(message);
        let shifted = Anchor::new(anchor.row, primary.col, anchor.kind);
        let offset = calibrator.calibrate(&shifted, primary_dims);
        read_color_matrix(sheet, &shifted, offset, primary_dims, &self.normalizer)
    }

    /// Glass quantity and description, last label wins
    fn read_metadata(&self, sheet: &Worksheet) -> SheetMetadata {
        let (rows, cols) = sheet.dimensions();
        let rows = self.config.metadata_rows.map_or(rows, |limit| rows.min(limit));
        let cols = self.config.metadata_cols.map_or(cols, |limit| cols.min(limit));

        let mut metadata = SheetMetadata::default();
        for (addr, value) in sheet.values() {
            if addr.row >= rows || addr.col >= cols {
                continue;
            }
            let next = sheet.value_at(addr.row, addr.col.saturating_add(1));
            match cell_text(value).to_lowercase().as_str() {
                "glass_qty" | "glass qty" => {
                    if let Some(qty) = to_number(next) {
                        metadata.glass_qty = qty;
                    }
                }
                "description" => {
                    if let Some(next) = next {
                        metadata.description = cell_text(next);
                    }
                }
                _ => {}
            }
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tiermatrix_core::{Color, FillStyle};

    /// Primary marker at (row, 0), widths/heights as given, price = w + h
    fn matrix(sheet: &mut Worksheet, row: u32, marker: &str, widths: &[f64], heights: &[f64]) {
        sheet.set_value_at(row, 0, marker);
        for (i, w) in widths.iter().enumerate() {
            sheet.set_value_at(row, 1 + i as u32, *w);
        }
        for (i, h) in heights.iter().enumerate() {
            sheet.set_value_at(row + 1 + i as u32, 0, *h);
            for (j, w) in widths.iter().enumerate() {
                sheet.set_value_at(row + 1 + i as u32, 1 + j as u32, w + h);
            }
        }
    }

    fn processor(sheets: Vec<Worksheet>, config: ProcessorConfig) -> Processor {
        let mut wb = Workbook::new();
        for sheet in sheets {
            wb.add_worksheet(sheet).unwrap();
        }
        Processor::new(wb, "Series", config)
    }

    #[test]
    fn test_metadata_defaults_and_last_match() {
        let mut sheet = Worksheet::new("S");
        let p = processor(vec![], ProcessorConfig::default());
        assert_eq!(p.read_metadata(&sheet), SheetMetadata::default());

        sheet.set_value_at(0, 0, "Glass_QTY");
        sheet.set_value_at(0, 1, "2");
        sheet.set_value_at(1, 3, " Description ");
        sheet.set_value_at(1, 4, "  Tempered glass ");
        sheet.set_value_at(5, 0, "glass qty");
        sheet.set_value_at(5, 1, "n/a");
        let meta = p.read_metadata(&sheet);
        assert_eq!(meta.glass_qty, Number::Int(2));
        assert_eq!(meta.description, "Tempered glass");

        sheet.set_value_at(6, 0, "glass qty");
        sheet.set_value_at(6, 1, 4.0);
        assert_eq!(p.read_metadata(&sheet).glass_qty, Number::Int(4));
    }

    #[test]
    fn test_metadata_scan_limits() {
        let mut sheet = Worksheet::new("S");
        sheet.set_value_at(60, 0, "glass_qty");
        sheet.set_value_at(60, 1, 3.0);
        let config = ProcessorConfig {
            metadata_rows: Some(50),
            ..ProcessorConfig::default()
        };
        let p = processor(vec![], config);
        assert_eq!(p.read_metadata(&sheet).glass_qty, Number::Int(1));
    }

    #[test]
    fn test_single_sheet_records() {
        let mut sheet = Worksheet::new(" Sliding ");
        matrix(&mut sheet, 4, "1", &[800.0, 900.0], &[100.0, 120.0]);
        sheet.set_value_at(6, 2, "");
        sheet.set_fill_at(5, 1, FillStyle::solid(Color::RED));

        let extraction = processor(vec![sheet], ProcessorConfig::default()).run();
        assert_eq!(extraction.color_columns, vec!["1_Color"]);
        assert_eq!(extraction.processed_sheets, 1);
        assert_eq!(extraction.total_records, 3);
        assert!(extraction.is_complete());

        let ids: Vec<u64> = extraction.price_records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let first = &extraction.price_records[0];
        assert_eq!(first.sheet_type, "Sliding");
        assert_eq!((first.height, first.width), (Number::Int(100), Number::Int(800)));
        assert_eq!(first.price, Number::Int(900));
        assert_eq!(first.colors, vec!["FF0000"]);
        assert_eq!(extraction.price_records[1].colors, vec![DEFAULT_COLOR]);

        let ty = &extraction.type_records[0];
        assert_eq!((ty.width_min, ty.width_max), (Number::Int(800), Number::Int(900)));
        assert_eq!((ty.height_min, ty.height_max), (Number::Int(100), Number::Int(120)));
    }

    #[test]
    fn test_skip_reasons() {
        let mut no_dims = Worksheet::new("NoDims");
        no_dims.set_value_at(0, 0, "1");
        no_dims.set_value_at(0, 1, "width");
        let mut no_anchor = Worksheet::new("NoAnchor");
        no_anchor.set_value_at(0, 0, "Price list");

        let extraction = processor(
            vec![Worksheet::new("สารบัญ"), no_dims, no_anchor],
            ProcessorConfig::default(),
        )
        .run();
        assert_eq!(
            extraction.skipped,
            vec![
                SkipEntry::new("สารบัญ", SkipReason::TableOfContents),
                SkipEntry::new("NoDims", SkipReason::NoDimensions),
                SkipEntry::new("NoAnchor", SkipReason::NoMainMatrix),
            ]
        );
        assert_eq!(extraction.total_records, 0);
        assert!(extraction.type_records.is_empty());
    }

    #[test]
    fn test_numbered_variant_with_same_axes_uses_fixed_offset() {
        let mut sheet = Worksheet::new("S");
        matrix(&mut sheet, 0, "1", &[800.0, 900.0], &[100.0, 120.0]);
        matrix(&mut sheet, 10, "2", &[800.0, 900.0], &[100.0, 120.0]);
        sheet.set_fill_at(12, 2, FillStyle::solid(Color::rgb(0x00, 0xB0, 0x50)));

        let extraction = processor(vec![sheet], ProcessorConfig::default()).run();
        assert_eq!(extraction.color_columns, vec!["1_Color", "2_Color"]);
        assert!(extraction.warnings.is_empty());
        let last = &extraction.price_records[3];
        assert_eq!(extraction.color(last, "2_Color"), Some("00B050"));
        assert_eq!(extraction.color(last, "1_Color"), Some(DEFAULT_COLOR));
    }

    #[test]
    fn test_variant_without_axes_borrows_primary_axes() {
        let mut sheet = Worksheet::new("S");
        matrix(&mut sheet, 0, "1", &[800.0, 900.0], &[100.0, 120.0]);
        sheet.set_value_at(10, 0, "Thk.2");
        // Grid placed one row lower than the fixed convention
        for (r, c) in [(12, 1), (12, 2), (13, 1), (13, 2)] {
            sheet.set_fill_at(r, c, FillStyle::solid(Color::YELLOW));
        }

        let extraction = processor(vec![sheet], ProcessorConfig::default()).run();
        assert_eq!(
            extraction.warnings,
            vec!["Sheet S: no dimensions for matrix 2, using main matrix dimensions"]
        );
        for record in &extraction.price_records {
            assert_eq!(extraction.color(record, "2_Color"), Some("FFFF00"));
        }
    }

    #[test]
    fn test_thickness_missing_variant_warns() {
        let mut sheet = Worksheet::new("S");
        matrix(&mut sheet, 0, "h/w", &[800.0], &[100.0]);
        let config = ProcessorConfig {
            protocol: VariantProtocol::thickness_default(),
            ..ProcessorConfig::default()
        };
        let extraction = processor(vec![sheet], config).run();
        assert_eq!(
            extraction.color_columns,
            vec!["5mm_Color", "6mm_Color", "8mm_Color"]
        );
        assert_eq!(
            extraction.warnings,
            vec![
                "Sheet S: 6mm matrix not found",
                "Sheet S: 8mm matrix not found"
            ]
        );
        assert_eq!(
            extraction.price_records[0].colors,
            vec![DEFAULT_COLOR, DEFAULT_COLOR, DEFAULT_COLOR]
        );
    }

    #[test]
    fn test_zero_budget_times_out_every_sheet() {
        let mut a = Worksheet::new("A");
        matrix(&mut a, 0, "1", &[800.0], &[100.0]);
        let mut b = Worksheet::new("B");
        matrix(&mut b, 0, "1", &[800.0], &[100.0]);
        let config = ProcessorConfig {
            time_budget: Some(0.0),
            ..ProcessorConfig::default()
        };
        let extraction = processor(vec![a, b], config).run();
        assert_eq!(extraction.status, RunStatus::TimedOut { unprocessed: 2 });
        assert_eq!(extraction.processed_sheets, 0);
        assert!(extraction
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::TimeBudgetExceeded));
    }

    #[test]
    fn test_sheet_limit() {
        let sheets = (0..4)
            .map(|i| {
                let mut s = Worksheet::new(format!("S{}", i));
                matrix(&mut s, 0, "1", &[800.0], &[100.0]);
                s
            })
            .collect();
        let config = ProcessorConfig {
            max_sheets: Some(3),
            ..ProcessorConfig::default()
        };
        let extraction = processor(sheets, config).run();
        assert_eq!(extraction.processed_sheets, 3);
        assert_eq!(
            extraction.skipped,
            vec![SkipEntry::new("S3", SkipReason::SheetLimit)]
        );
        let type_ids: Vec<u64> = extraction.type_records.iter().map(|t| t.id).collect();
        assert_eq!(type_ids, vec![1, 2, 3]);
    }
}
