//! # tiermatrix
//!
//! Discovers price matrices in spreadsheet price lists and flattens them into
//! two ID-keyed tables.
//!
//! A price matrix is a header row of widths, a header column of heights and a
//! price at each intersection. The background color of each price cell carries
//! an extra attribute (typically a glass thickness tier). A sheet may hold
//! several co-located matrices: the primary one carries prices, the variant
//! ones only contribute colors.
//!
//! ## Pipeline
//!
//! Sheets are processed one at a time, in workbook order:
//!
//! 1. [`locator`] finds anchor cells by text pattern
//! 2. [`dimensions`] reads the width and height sequences next to an anchor
//! 3. [`offset`] resolves where the data grid starts relative to the anchor
//! 4. [`color_matrix`] reads canonical colors through [`color::ColorNormalizer`]
//! 5. [`processor`] assembles [`PriceRecord`]s and [`TypeRecord`]s
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiermatrix::{Processor, ProcessorConfig};
//!
//! let processor = Processor::open(
//!     "uploads/20240501_120000_ab12cd34_Sliding_data.xlsx",
//!     None,
//!     ProcessorConfig::default(),
//! )?;
//! let extraction = processor.run();
//!
//! println!(
//!     "{}: {} price rows from {} sheets",
//!     extraction.series, extraction.total_records, extraction.processed_sheets
//! );
//! # Ok::<(), tiermatrix::ExtractError>(())
//! ```

pub mod color;
pub mod color_matrix;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod export;
pub mod inventory;
pub mod locator;
pub mod numeric;
pub mod offset;
pub mod prelude;
pub mod processor;
pub mod records;
pub mod series;

pub use color::{ColorNormalizer, DEFAULT_COLOR};
pub use config::{CalibrationConfig, ProcessorConfig, VariantProtocol};
pub use error::{ExtractError, ExtractResult, SheetError};
pub use inventory::{Inventory, MatrixInventory, SheetInventory};
pub use locator::{Anchor, AnchorKind, HeaderLocator};
pub use numeric::{to_number, Number};
pub use offset::{Offset, OffsetCalibrator};
pub use processor::Processor;
pub use records::{Extraction, PriceRecord, RunStatus, SkipEntry, SkipReason, TypeRecord};
pub use series::series_name;
