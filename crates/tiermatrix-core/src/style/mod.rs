//! Cell styling types
//!
//! Only background fills are modelled; they are the sole formatting the
//! extractor reads.

mod color;
mod fill;

pub use color::Color;
pub use fill::{FillStyle, PatternType};
