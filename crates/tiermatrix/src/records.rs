//! Output records and the run outcome

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::numeric::Number;

/// One priced cell of a primary matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Serie")]
    pub serie: String,
    /// Trimmed sheet name
    #[serde(rename = "Type")]
    pub sheet_type: String,
    #[serde(rename = "Width")]
    pub width: Number,
    #[serde(rename = "Height")]
    pub height: Number,
    #[serde(rename = "Price")]
    pub price: Number,
    #[serde(rename = "Glass_QTY")]
    pub glass_qty: Number,
    /// One canonical color per output color column, in column order
    pub colors: Vec<String>,
}

/// Summary of one processed sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Type")]
    pub sheet_type: String,
    #[serde(rename = "Description")]
    pub description: String,
    pub width_min: Number,
    pub width_max: Number,
    pub height_min: Number,
    pub height_max: Number,
}

/// Why a sheet produced no records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TableOfContents,
    NoMainMatrix,
    NoDimensions,
    /// Beyond the configured sheet limit
    SheetLimit,
    /// Not reached before the time budget ran out
    TimeBudgetExceeded,
    /// Any other per-sheet failure
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TableOfContents => write!(f, "table of contents"),
            SkipReason::NoMainMatrix => write!(f, "no main matrix"),
            SkipReason::NoDimensions => write!(f, "no dimensions"),
            SkipReason::SheetLimit => write!(f, "sheet limit reached"),
            SkipReason::TimeBudgetExceeded => write!(f, "time budget exceeded"),
            SkipReason::Failed(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipEntry {
    pub sheet: String,
    pub reason: SkipReason,
}

impl SkipEntry {
    pub fn new<S: Into<String>>(sheet: S, reason: SkipReason) -> Self {
        Self {
            sheet: sheet.into(),
            reason,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    /// The time budget ran out; `unprocessed` sheets were never looked at
    TimedOut { unprocessed: usize },
}

impl RunStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, RunStatus::Complete)
    }
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub series: String,
    /// Names of the color columns, matching [`PriceRecord::colors`]
    pub color_columns: Vec<String>,
    pub price_records: Vec<PriceRecord>,
    pub type_records: Vec<TypeRecord>,
    pub skipped: Vec<SkipEntry>,
    pub warnings: Vec<String>,
    pub processed_sheets: usize,
    pub total_records: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub status: RunStatus,
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Color of a record under a named column
    pub fn color<'a>(&self, record: &'a PriceRecord, column: &str) -> Option<&'a str> {
        let idx = self.color_columns.iter().position(|c| c == column)?;
        record.colors.get(idx).map(String::as_str)
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}
