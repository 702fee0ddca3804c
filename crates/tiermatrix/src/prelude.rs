//! Prelude module - common imports for tiermatrix users
//!
//! ```rust
//! use tiermatrix::prelude::*;
//! ```

pub use crate::{
    // Output
    export::write_tables,
    Extraction,
    PriceRecord,
    RunStatus,
    SkipEntry,
    SkipReason,
    TypeRecord,

    // Engine
    ColorNormalizer,
    Processor,
    ProcessorConfig,
    VariantProtocol,

    // Errors
    ExtractError,
    ExtractResult,
};

pub use tiermatrix_core::{CellValue, Color, FillStyle, PatternType, Workbook, Worksheet};
pub use tiermatrix_xlsx::XlsxReader;
