//! Lenient numeric coercion for dimension, price and quantity cells

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use lazy_regex::regex;
use serde::{Serialize, Serializer};
use tiermatrix_core::CellValue;

/// A coerced cell number
///
/// Integral values are always held as [`Number::Int`], so `800`, `800.0` and
/// `"800"` compare, hash and print the same. This is what lets color maps be
/// keyed by dimension values read from different matrices.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Build from a float, normalizing integral values
    ///
    /// NaN and infinities have no numeric meaning in a price list and map to
    /// `None`.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Some(Number::Int(f as i64))
        } else {
            Some(Number::Float(f))
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_f64().to_bits().hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(i) => serializer.serialize_i64(i),
            Number::Float(f) => serializer.serialize_f64(f),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

/// Coerce a cell to a number
///
/// Numeric cells are taken as-is. Text is stripped of thousands separators,
/// whitespace and any character other than digits, `.` and `-` before
/// parsing, so `"1,200 บาท"` reads as `1200`. Empty cells, booleans, errors
/// and text that does not parse after cleanup yield `None`.
pub fn to_number(value: Option<&CellValue>) -> Option<Number> {
    match value? {
        CellValue::Number(n) => Number::from_f64(*n),
        CellValue::String(s) => parse_lenient(s),
        CellValue::Empty | CellValue::Boolean(_) | CellValue::Error(_) => None,
    }
}

/// Text half of [`to_number`]
pub fn parse_lenient(text: &str) -> Option<Number> {
    let cleaned = regex!(r"[,\s]").replace_all(text.trim(), "");
    let cleaned = regex!(r"[^\d.\-]").replace_all(&cleaned, "");

    if cleaned.is_empty() || cleaned == "-" || cleaned == "." {
        return None;
    }

    cleaned.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;
    use pretty_assertions::assert_eq;

    fn num(text: &str) -> Option<Number> {
        to_number(Some(&CellValue::from(text)))
    }

    #[test]
    fn test_integral_values_normalize() {
        assert_eq!(to_number(Some(&CellValue::Number(800.0))), Some(Number::Int(800)));
        assert_eq!(num("800"), Some(Number::Int(800)));
        assert_eq!(num("800.0"), Some(Number::Int(800)));
        assert_eq!(num("12.5"), Some(Number::Float(12.5)));
    }

    #[test]
    fn test_cleanup() {
        assert_eq!(num("1,200"), Some(Number::Int(1200)));
        assert_eq!(num(" 1 200 "), Some(Number::Int(1200)));
        assert_eq!(num("1,200 บาท"), Some(Number::Int(1200)));
        assert_eq!(num("฿950.50"), Some(Number::Float(950.5)));
        assert_eq!(num("-15"), Some(Number::Int(-15)));
        assert_eq!(num(".5"), Some(Number::Float(0.5)));
    }

    #[test]
    fn test_absent_values() {
        assert_eq!(to_number(None), None);
        assert_eq!(to_number(Some(&CellValue::Empty)), None);
        assert_eq!(to_number(Some(&CellValue::Boolean(true))), None);
        assert_eq!(to_number(Some(&CellValue::Error("#DIV/0!".into()))), None);
        assert_eq!(to_number(Some(&CellValue::Number(f64::NAN))), None);
        assert_eq!(num(""), None);
        assert_eq!(num("-"), None);
        assert_eq!(num("."), None);
        assert_eq!(num("h/w"), None);
        assert_eq!(num("nan"), None);
        assert_eq!(num("12-14"), None);
        assert_eq!(num("1.2.3"), None);
    }

    #[test]
    fn test_equal_values_hash_together() {
        let mut set = AHashSet::new();
        set.insert(num("800").unwrap());
        set.insert(to_number(Some(&CellValue::Number(800.0))).unwrap());
        assert_eq!(set.len(), 1);
        assert!(Number::Int(100) < Number::Float(100.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::Int(1200).to_string(), "1200");
        assert_eq!(Number::Float(12.5).to_string(), "12.5");
    }
}
