//! Extraction strategies.
//!
//! Three independent strategies read the normalized line sequence:
//!
//! - [`table`]: label row / value row pairing (highest precedence)
//! - [`combat_time`]: the elapsed combat time field
//! - [`pattern`]: generic label/value patterns for anything else
//!
//! Their results are merged by [`crate::aggregate`].

pub mod combat_time;
pub mod pattern;
pub mod table;

pub use combat_time::{extract_combat_time, CombatTime};
pub use pattern::{extract_patterns, PatternError, PatternFamily};
pub use table::{
    extract_labels_from_line, extract_table, extract_values_from_line, is_label_row, TableExtraction,
};

/// A stat value: digit groups with optional comma separators, an optional
/// decimal part, and an optional unit suffix (억, 만 or %).
pub(crate) const VALUE_PATTERN: &str = r"\d+(?:,\d{3})*(?:\.\d+)?(?:억|만|%)?";
