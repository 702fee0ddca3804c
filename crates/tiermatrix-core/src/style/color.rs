//! Color representation

use std::fmt;

/// Color representation
///
/// Supports RGB, ARGB, theme colors, and indexed colors. Only the explicit
/// RGB forms carry a literal color code; theme and indexed colors are
/// references into palettes the sheet does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with optional tint
    Theme {
        /// Theme color index (0-9)
        index: u8,
        /// Tint value (-1.0 to 1.0, stored as i8 percentage)
        tint: i8,
    },

    /// Indexed color (legacy Excel palette)
    Indexed(u8),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Create a theme color
    pub const fn theme(index: u8, tint: i8) -> Self {
        Color::Theme { index, tint }
    }

    /// Create from a hex string (e.g., "#FF0000", "FF0000" or "80FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::Rgb { r, g, b })
            }
            8 => {
                let a = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let r = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let g = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let b = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::Argb { a, r, g, b })
            }
            _ => None,
        }
    }

    /// The literal color code as written in the file, upper-case.
    ///
    /// Returns the 8-character `AARRGGBB` form for ARGB colors and the
    /// 6-character `RRGGBB` form for RGB colors. Theme, indexed and automatic
    /// colors have no literal code.
    pub fn rgb_code(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("{:02X}{:02X}{:02X}", r, g, b)),
            Color::Argb { a, r, g, b } => {
                Some(format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b))
            }
            Color::Auto | Color::Theme { .. } | Color::Indexed(_) => None,
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    // Common colors
    pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const RED: Color = Color::Rgb { r: 255, g: 0, b: 0 };
    pub const YELLOW: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 0,
    };
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => write!(f, "theme({}, {}%)", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}
