//! Processor configuration
//!
//! Every scan limit and budget lives here so that constrained hosts tune the
//! same engine instead of carrying their own copy of it.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Name of the table-of-contents sheet that never holds a matrix
pub const TOC_SHEET_NAME: &str = "สารบัญ";

/// How variant matrices are labelled on a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantProtocol {
    /// Variants are numbered `2, 3, …` in the first column, probed until the
    /// first gap. Color columns are `1_Color`, `2_Color`, …
    Numbered {
        /// Highest variant number probed
        max_variants: u32,
    },
    /// Variants are thickness tiers labelled with a unit (`6 mm`, `Thk.8mm`),
    /// each probed independently. Color columns are `<n>mm_Color`.
    Thickness {
        /// Thickness of the primary (price) matrix
        primary: u32,
        /// Thicknesses of the color-only variant matrices
        variants: Vec<u32>,
    },
}

impl Default for VariantProtocol {
    fn default() -> Self {
        VariantProtocol::Numbered { max_variants: 20 }
    }
}

impl VariantProtocol {
    /// Thickness protocol with the 5 / 6 / 8 mm tiers
    pub fn thickness_default() -> Self {
        VariantProtocol::Thickness {
            primary: 5,
            variants: vec![6, 8],
        }
    }

    /// Identifier of the primary matrix: `1`, or the primary thickness
    pub fn primary_id(&self) -> u32 {
        match self {
            VariantProtocol::Numbered { .. } => 1,
            VariantProtocol::Thickness { primary, .. } => *primary,
        }
    }

    /// Human-readable name of a matrix, used in warnings
    pub fn label(&self, id: u32) -> String {
        match self {
            VariantProtocol::Numbered { .. } => format!("matrix {}", id),
            VariantProtocol::Thickness { .. } => format!("{}mm", id),
        }
    }

    /// Output column holding a matrix's colors
    pub fn color_column(&self, id: u32) -> String {
        match self {
            VariantProtocol::Numbered { .. } => format!("{}_Color", id),
            VariantProtocol::Thickness { .. } => format!("{}mm_Color", id),
        }
    }
}

/// Offset calibration parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Candidate row offsets, outer loop
    pub row_offsets: Vec<u32>,
    /// Candidate column offsets, inner loop
    pub col_offsets: Vec<u32>,
    /// Rows sampled from the top-left of the grid
    pub sample_rows: usize,
    /// Columns sampled from the top-left of the grid
    pub sample_cols: usize,
    /// Offset used when no candidate finds a colored cell, as `(rows, cols)`
    pub default_offset: (u32, u32),
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            row_offsets: vec![1, 2, 3],
            col_offsets: vec![1, 2, 3],
            sample_rows: 2,
            sample_cols: 2,
            default_offset: (2, 2),
        }
    }
}

/// Processor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Variant labelling convention
    pub protocol: VariantProtocol,
    /// Sheet names (trimmed, case-insensitive) that are always skipped
    pub toc_sheet_names: Vec<String>,
    /// Row limit for anchor searches
    pub scan_rows: u32,
    /// Column limit for full-grid anchor searches
    pub scan_cols: u32,
    /// Radius of the axis-header search around a thickness label
    pub neighborhood: u32,
    /// Row limit for the quantity/description scan
    pub metadata_rows: Option<u32>,
    /// Column limit for the quantity/description scan
    pub metadata_cols: Option<u32>,
    /// Cap on values read per dimension axis
    pub max_dimension_len: Option<usize>,
    /// Cap on matrix sheets processed (table-of-contents sheets do not count)
    pub max_sheets: Option<usize>,
    /// Wall-clock budget in seconds, checked between sheets
    pub time_budget: Option<f64>,
    /// Offset calibration
    pub calibration: CalibrationConfig,
    /// Color codes treated as "no color"
    pub excluded_colors: Vec<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            protocol: VariantProtocol::default(),
            toc_sheet_names: vec![TOC_SHEET_NAME.to_string()],
            scan_rows: 50,
            scan_cols: 20,
            neighborhood: 15,
            metadata_rows: None,
            metadata_cols: None,
            max_dimension_len: None,
            max_sheets: None,
            time_budget: None,
            calibration: CalibrationConfig::default(),
            excluded_colors: crate::color::DEFAULT_EXCLUDED_COLORS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl ProcessorConfig {
    /// Budgets of the serverless host: 3 sheets, 20 values per axis, 6 seconds
    pub fn serverless() -> Self {
        Self {
            protocol: VariantProtocol::Numbered { max_variants: 5 },
            metadata_rows: Some(50),
            metadata_cols: Some(10),
            max_dimension_len: Some(20),
            max_sheets: Some(3),
            time_budget: Some(6.0),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> ExtractResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ExtractResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> ExtractResult<()> {
        if self.calibration.row_offsets.contains(&0) || self.calibration.col_offsets.contains(&0)
        {
            return Err(ExtractError::Config(
                "calibration offsets start at 1 (the header line itself)".into(),
            ));
        }
        let (rows, cols) = self.calibration.default_offset;
        if rows == 0 || cols == 0 {
            return Err(ExtractError::Config(
                "default offset must be at least (1, 1)".into(),
            ));
        }
        if let Some(budget) = self.time_budget {
            if Duration::try_from_secs_f64(budget).is_err() {
                return Err(ExtractError::Config(format!(
                    "time budget must be a non-negative number of seconds, got {}",
                    budget
                )));
            }
        }
        if let VariantProtocol::Thickness { primary, variants } = &self.protocol {
            if variants.contains(primary) {
                return Err(ExtractError::Config(format!(
                    "thickness {} is listed as both primary and variant",
                    primary
                )));
            }
        }
        Ok(())
    }

    /// Time budget as a [`Duration`]
    ///
    /// Values [`validate`](Self::validate) rejects come out as `None`.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Whether a sheet name marks a table-of-contents sheet
    pub fn is_toc_sheet(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.toc_sheet_names
            .iter()
            .any(|toc| toc.trim().to_lowercase() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.protocol, VariantProtocol::Numbered { max_variants: 20 });
        assert_eq!(config.scan_rows, 50);
        assert_eq!(config.scan_cols, 20);
        assert_eq!(config.calibration.default_offset, (2, 2));
        assert_eq!(config.excluded_colors, vec!["00000000", "F2F2F2"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ProcessorConfig::from_json(
            r#"{"protocol": {"kind": "thickness", "primary": 5, "variants": [6, 8]}, "max_sheets": 3}"#,
        )
        .unwrap();
        assert_eq!(config.protocol, VariantProtocol::thickness_default());
        assert_eq!(config.max_sheets, Some(3));
        assert_eq!(config.scan_rows, 50);
        assert_eq!(config.toc_sheet_names, vec![TOC_SHEET_NAME.to_string()]);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            ProcessorConfig::from_json("{"),
            Err(ExtractError::ConfigParse(_))
        ));
        assert!(matches!(
            ProcessorConfig::from_json(r#"{"calibration": {"row_offsets": [0, 1]}}"#),
            Err(ExtractError::Config(_))
        ));
        assert!(matches!(
            ProcessorConfig::from_json(r#"{"time_budget": -1.0}"#),
            Err(ExtractError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_budget_rejected() {
        assert!(matches!(
            ProcessorConfig::from_json(r#"{"time_budget": 1e30}"#),
            Err(ExtractError::Config(_))
        ));
        let config = ProcessorConfig {
            time_budget: Some(1e30),
            ..ProcessorConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.time_budget(), None);

        let config = ProcessorConfig {
            time_budget: Some(1.5),
            ..ProcessorConfig::default()
        };
        assert_eq!(config.time_budget(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_toc_sheet_matching() {
        let config = ProcessorConfig::default();
        assert!(config.is_toc_sheet("สารบัญ"));
        assert!(config.is_toc_sheet("  สารบัญ "));
        assert!(!config.is_toc_sheet("Sliding"));
    }

    #[test]
    fn test_protocol_naming() {
        let numbered = VariantProtocol::default();
        assert_eq!(numbered.primary_id(), 1);
        assert_eq!(numbered.color_column(3), "3_Color");
        assert_eq!(numbered.label(3), "matrix 3");

        let thickness = VariantProtocol::thickness_default();
        assert_eq!(thickness.primary_id(), 5);
        assert_eq!(thickness.color_column(6), "6mm_Color");
        assert_eq!(thickness.label(8), "8mm");
    }

    #[test]
    fn test_serverless_budgets() {
        let config = ProcessorConfig::serverless();
        assert_eq!(config.max_sheets, Some(3));
        assert_eq!(config.time_budget(), Some(Duration::from_secs(6)));
        assert_eq!(config.max_dimension_len, Some(20));
    }
}
