//! Label row / value row pairing.
//!
//! The recognizer often reads the stat table of the result screen as one line
//! of concatenated labels followed by one line of values in the same
//! left-to-right order. Pairing them by position is more reliable than any
//! per-label pattern, so this strategy has the highest precedence.

use regex::Regex;
use std::sync::LazyLock;

use super::VALUE_PATTERN;
use crate::catalog::{AnchorKind, LABEL_PATTERNS, MIN_ANCHOR_MATCHES, REQUIRED_ANCHORS, TABLE_ANCHORS};
use crate::model::StatEntry;

/// Every catalogue label as its own capture group, in catalogue order.
static RE_LABELS: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = LABEL_PATTERNS
        .iter()
        .map(|(pattern, _)| format!("({})", pattern))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).unwrap()
});

static RE_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(VALUE_PATTERN).unwrap());

/// Result of a successful label row detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExtraction {
    /// Index of the label row in the line sequence.
    pub label_row: usize,
    /// Canonical labels, left to right, without repeats.
    pub labels: Vec<String>,
    /// Non-zero values from the following line, left to right.
    pub values: Vec<String>,
    /// `labels[i]` paired with `values[i]`.
    pub entries: Vec<StatEntry>,
}

impl TableExtraction {
    /// Returns true if line `index` is the label row or its value row.
    pub fn covers_line(&self, index: usize) -> bool {
        index == self.label_row || index == self.label_row + 1
    }
}

/// Returns true if the line looks like a stat table label row.
///
/// Spacing inside labels is irregular, so anchors are matched against the line
/// with all whitespace removed.
pub fn is_label_row(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

    let found: Vec<AnchorKind> = TABLE_ANCHORS
        .iter()
        .filter(|(fragment, _)| compact.contains(fragment))
        .map(|(_, kind)| *kind)
        .collect();

    found.len() >= MIN_ANCHOR_MATCHES && REQUIRED_ANCHORS.iter().all(|kind| found.contains(kind))
}

/// Extracts canonical labels from a label row, in order of appearance.
///
/// Exact repeats are dropped; the first occurrence keeps its position.
pub fn extract_labels_from_line(line: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    for caps in RE_LABELS.captures_iter(line) {
        let Some(index) = (1..caps.len()).find(|&i| caps.get(i).is_some()) else {
            continue;
        };
        let label = LABEL_PATTERNS[index - 1].1;
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }

    labels
}

/// Extracts stat values from a value row, in order of appearance.
///
/// Tokens whose digits are all zero ("0", "0.00%") are recognizer artifacts
/// and are skipped.
pub fn extract_values_from_line(line: &str) -> Vec<String> {
    RE_VALUE
        .find_iter(line)
        .map(|m| m.as_str())
        .filter(|token| !is_all_zero(token))
        .map(String::from)
        .collect()
}

/// Check if every digit of a value token is zero
fn is_all_zero(token: &str) -> bool {
    token
        .chars()
        .filter(|c| c.is_ascii_digit())
        .all(|c| c == '0')
}

/// Finds the first label row and pairs it with the line that follows.
///
/// Only one table is extracted per input; the result screen never shows more.
/// Returns `None` when no label row exists.
pub fn extract_table(lines: &[String]) -> Option<TableExtraction> {
    let label_row = lines.iter().position(|line| is_label_row(line))?;

    let labels = extract_labels_from_line(&lines[label_row]);
    let values = lines
        .get(label_row + 1)
        .map(|line| extract_values_from_line(line))
        .unwrap_or_default();

    let entries = labels
        .iter()
        .zip(values.iter())
        .map(|(label, value)| StatEntry::new(label, value))
        .collect();

    Some(TableExtraction {
        label_row,
        labels,
        values,
        entries,
    })
}
