//! Fill color normalization
//!
//! Reduces a cell fill to a canonical 6-digit upper-case RGB code, with
//! [`DEFAULT_COLOR`] standing for "no meaningful color".

use ahash::AHashSet;
use tiermatrix_core::{Color, FillStyle, PatternType};

/// Canonical "no color" value
pub const DEFAULT_COLOR: &str = "FFFFFF";

/// Fully transparent sentinel written by spreadsheet tools for unset colors
pub const TRANSPARENT: &str = "00000000";

/// Codes excluded by default: the transparent sentinel and a light gray
pub const DEFAULT_EXCLUDED_COLORS: &[&str] = &[TRANSPARENT, "F2F2F2"];

/// Extended exclusion list: theme tints and neutral grays used as decoration
pub const LEGACY_EXCLUDED_COLORS: &[&str] = &[
    TRANSPARENT,
    "DCE6F1",
    "B4C6E7",
    "A9D08E",
    "FFE699",
    "F4B183",
    "F2F2F2",
    "E6E6E6",
    "D9D9D9",
];

/// Outcome of reading one color channel
enum Channel {
    /// The transparent sentinel: the whole fill counts as uncolored
    Transparent,
    /// A 6-digit code
    Code(String),
    /// Theme or indexed reference, or a code of the wrong length
    Missing,
}

/// Converts cell fills to canonical colors
///
/// Normalization is total: absent, non-solid, theme-only and malformed fills
/// all come out as [`DEFAULT_COLOR`].
#[derive(Debug, Clone)]
pub struct ColorNormalizer {
    excluded: AHashSet<String>,
}

impl Default for ColorNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_COLORS.iter().copied())
    }
}

impl ColorNormalizer {
    /// Create a normalizer with the given exclusion list
    ///
    /// Codes are compared upper-case.
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Normalizer using [`LEGACY_EXCLUDED_COLORS`]
    pub fn legacy() -> Self {
        Self::new(LEGACY_EXCLUDED_COLORS.iter().copied())
    }

    /// Canonical color of a fill
    pub fn normalize(&self, fill: Option<&FillStyle>) -> String {
        let (foreground, background) = match fill {
            Some(FillStyle::Pattern {
                pattern: PatternType::Solid,
                foreground,
                background,
            }) => (foreground, background),
            _ => return DEFAULT_COLOR.to_string(),
        };

        let code = match Self::channel(foreground) {
            Channel::Transparent => return DEFAULT_COLOR.to_string(),
            Channel::Code(code) => code,
            Channel::Missing => match Self::channel(background) {
                Channel::Transparent => return DEFAULT_COLOR.to_string(),
                Channel::Code(code) => code,
                Channel::Missing => return DEFAULT_COLOR.to_string(),
            },
        };

        if self.excluded.contains(&code) {
            DEFAULT_COLOR.to_string()
        } else {
            code
        }
    }

    /// Whether a canonical color carries information
    pub fn is_meaningful(color: &str) -> bool {
        color != DEFAULT_COLOR
    }

    fn channel(color: &Color) -> Channel {
        // An unset channel reads as the transparent sentinel
        if color.is_auto() {
            return Channel::Transparent;
        }
        let Some(code) = color.rgb_code() else {
            return Channel::Missing;
        };
        if code == TRANSPARENT {
            return Channel::Transparent;
        }
        match code.len() {
            // The leading byte is alpha and is ignored
            8 => Channel::Code(code[2..].to_string()),
            6 => Channel::Code(code),
            _ => Channel::Missing,
        }
    }
}
