//! Fill/background style types

use super::Color;

/// Fill style for cell background
///
/// Pattern fills keep both color channels as written; which channel carries
/// the visible color is decided by the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    /// No fill (transparent)
    #[default]
    None,

    /// Pattern fill (including `solid`)
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },

    /// Gradient fill (colors are not tracked)
    Gradient,
}

impl FillStyle {
    /// Create a solid fill with the given foreground color
    pub fn solid(color: Color) -> Self {
        FillStyle::Pattern {
            pattern: PatternType::Solid,
            foreground: color,
            background: Color::Auto,
        }
    }

    /// Create a pattern fill
    pub fn pattern(pattern: PatternType, foreground: Color, background: Color) -> Self {
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        }
    }

    /// Check if this is a "no fill"
    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }

    /// The pattern kind, if this is a pattern fill
    pub fn pattern_type(&self) -> Option<PatternType> {
        match self {
            FillStyle::Pattern { pattern, .. } => Some(*pattern),
            _ => None,
        }
    }
}

/// Pattern fill types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    /// No pattern
    #[default]
    None,
    /// Solid (100% foreground)
    Solid,
    /// 50% gray
    MediumGray,
    /// 75% gray
    DarkGray,
    /// 25% gray
    LightGray,
    /// Horizontal stripe
    DarkHorizontal,
    /// Vertical stripe
    DarkVertical,
    /// Diagonal stripe (down)
    DarkDown,
    /// Diagonal stripe (up)
    DarkUp,
    /// Grid
    DarkGrid,
    /// Trellis
    DarkTrellis,
    /// Thin horizontal stripe
    LightHorizontal,
    /// Thin vertical stripe
    LightVertical,
    /// Thin diagonal stripe (down)
    LightDown,
    /// Thin diagonal stripe (up)
    LightUp,
    /// Thin grid
    LightGrid,
    /// Thin trellis
    LightTrellis,
    /// 12.5% gray
    Gray125,
    /// 6.25% gray
    Gray0625,
}

impl PatternType {
    /// Parse the `patternType` attribute value used by SpreadsheetML
    pub fn from_ooxml(s: &str) -> Option<Self> {
        Some(match s {
            "none" => PatternType::None,
            "solid" => PatternType::Solid,
            "mediumGray" => PatternType::MediumGray,
            "darkGray" => PatternType::DarkGray,
            "lightGray" => PatternType::LightGray,
            "darkHorizontal" => PatternType::DarkHorizontal,
            "darkVertical" => PatternType::DarkVertical,
            "darkDown" => PatternType::DarkDown,
            "darkUp" => PatternType::DarkUp,
            "darkGrid" => PatternType::DarkGrid,
            "darkTrellis" => PatternType::DarkTrellis,
            "lightHorizontal" => PatternType::LightHorizontal,
            "lightVertical" => PatternType::LightVertical,
            "lightDown" => PatternType::LightDown,
            "lightUp" => PatternType::LightUp,
            "lightGrid" => PatternType::LightGrid,
            "lightTrellis" => PatternType::LightTrellis,
            "gray125" => PatternType::Gray125,
            "gray0625" => PatternType::Gray0625,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_constructor() {
        let fill = FillStyle::solid(Color::RED);
        assert_eq!(fill.pattern_type(), Some(PatternType::Solid));
        assert!(!fill.is_none());
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!(PatternType::from_ooxml("solid"), Some(PatternType::Solid));
        assert_eq!(PatternType::from_ooxml("gray125"), Some(PatternType::Gray125));
        assert_eq!(PatternType::from_ooxml("Solid"), None);
        assert_eq!(FillStyle::Gradient.pattern_type(), None);
    }
}
