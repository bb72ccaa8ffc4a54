//! The pattern language of production rules.

pub mod display;
pub mod element;
pub mod pattern;

pub use element::Element;
pub use pattern::{parse_pattern, PatternError, PatternErrorKind};
