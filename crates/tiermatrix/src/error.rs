//! Error types for tiermatrix

use thiserror::Error;

/// Result type for run-level operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Run-level failures
///
/// These abort a run. Everything that goes wrong inside a single sheet is a
/// [`SheetError`] instead and ends up as a skip entry.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The workbook could not be opened or parsed
    #[error("cannot open workbook: {0}")]
    Workbook(#[from] tiermatrix_xlsx::XlsxError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file is not valid JSON for [`crate::ProcessorConfig`]
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// CSV output failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-sheet failures, recovered into skip entries
#[derive(Debug, Error)]
pub enum SheetError {
    /// A required header cell could not be located
    #[error("no main matrix")]
    MissingAnchor,

    /// The anchor was found but one of its dimension sequences is empty
    #[error("no dimensions")]
    MissingDimensions,

    /// The sheet could not be read from the workbook
    #[error("sheet error: {0}")]
    Workbook(#[from] tiermatrix_core::Error),
}
