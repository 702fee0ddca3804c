//! # tiermatrix-xlsx
//!
//! XLSX (Office Open XML) reader for the tiermatrix sheet model.
//!
//! Only what the extractor needs is read: cell values (formula cells by
//! their cached result) and the background fill behind each cell's style.

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
