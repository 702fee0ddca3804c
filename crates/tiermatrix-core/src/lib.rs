//! # tiermatrix-core
//!
//! Sheet model for the tiermatrix price-matrix extractor.
//!
//! A [`Workbook`] owns an ordered list of [`Worksheet`]s. Each worksheet
//! exposes two read-only views over one 0-based coordinate space:
//! - the value view ([`Worksheet::value_at`]) used for text and number scanning
//! - the fill view ([`Worksheet::fill_at`]) used for background colors
//!
//! ## Example
//!
//! ```rust
//! use tiermatrix_core::{CellValue, Color, FillStyle, Workbook, Worksheet};
//!
//! let mut sheet = Worksheet::new("Sliding");
//! sheet.set_value_at(0, 0, "1");
//! sheet.set_value_at(0, 1, 800.0);
//! sheet.set_fill_at(1, 1, FillStyle::solid(Color::rgb(255, 0, 0)));
//!
//! let mut workbook = Workbook::new();
//! workbook.add_worksheet(sheet).unwrap();
//!
//! assert_eq!(workbook.value_at("Sliding", 0, 1), Some(&CellValue::Number(800.0)));
//! assert!(workbook.fill_at("Sliding", 1, 1).is_some());
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellValue};
pub use error::{Error, Result};
pub use style::{Color, FillStyle, PatternType};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
