//! Stat entries and the insertion-ordered stat map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::Result;

/// Reserved label for the elapsed combat time. Storage treats it as a
/// distinguished column.
pub const COMBAT_TIME_LABEL: &str = "전투 시간";

/// A single (label, value) pair.
///
/// Values keep their original formatting ("3,214.35억", "86.36%") and are
/// never parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Human-readable Korean stat name.
    pub label: String,
    /// Value as it appeared on screen.
    pub value: String,
}

impl StatEntry {
    /// Creates an entry, trimming both sides and collapsing whitespace runs in
    /// the label.
    pub fn new(label: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            label: collapse_whitespace(label.as_ref()),
            value: value.as_ref().trim().to_string(),
        }
    }
}

/// Collapses every whitespace run to a single space and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Which extraction strategy produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Label row / value row pairing.
    Table,
    /// Dedicated combat time rule.
    CombatTime,
    /// Fallback label/value patterns.
    Pattern,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Table => write!(f, "table"),
            Source::CombatTime => write!(f, "combat time"),
            Source::Pattern => write!(f, "pattern"),
        }
    }
}

/// Insertion-ordered mapping from label to value with unique labels.
///
/// The first writer of a label wins; later attempts are rejected rather than
/// overwriting. An empty map is a valid result meaning "manual entry required".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatMap {
    entries: Vec<StatEntry>,
}

impl StatMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the entry unless its label is already present.
    ///
    /// Returns true if the entry was inserted.
    pub fn insert_if_absent(&mut self, entry: StatEntry) -> bool {
        if entry.label.is_empty() || self.contains_label(&entry.label) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Moves `label` to the front, keeping the relative order of the rest.
    pub(crate) fn pin_first(&mut self, label: &str) {
        if let Some(pos) = self.entries.iter().position(|e| e.label == label) {
            let entry = self.entries.remove(pos);
            self.entries.insert(0, entry);
        }
    }

    /// Gets the value for a label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }

    /// Returns true if the label is present.
    pub fn contains_label(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the caller should fall back to manual entry.
    pub fn requires_manual_entry(&self) -> bool {
        self.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StatEntry> {
        self.entries.iter()
    }

    /// Iterates over labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Returns the combat time value, if extracted.
    pub fn combat_time(&self) -> Option<&str> {
        self.get(COMBAT_TIME_LABEL)
    }

    /// Returns the expected labels that are absent from this map.
    pub fn missing<'a>(&self, expected: &[&'a str]) -> Vec<&'a str> {
        expected
            .iter()
            .copied()
            .filter(|label| !self.contains_label(label))
            .collect()
    }

    /// Serializes the map as a flat JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the map as an indented JSON object.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a flat JSON object of string values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'a> IntoIterator for &'a StatMap {
    type Item = &'a StatEntry;
    type IntoIter = std::slice::Iter<'a, StatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<StatEntry> for StatMap {
    fn from_iter<I: IntoIterator<Item = StatEntry>>(iter: I) -> Self {
        let mut map = StatMap::new();
        for entry in iter {
            map.insert_if_absent(entry);
        }
        map
    }
}

impl Serialize for StatMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.label, &entry.value)?;
        }
        map.end()
    }
}

struct StatMapVisitor;

impl<'de> Visitor<'de> for StatMapVisitor {
    type Value = StatMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat object of string labels to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<StatMap, A::Error> {
        let mut map = StatMap::new();
        while let Some((label, value)) = access.next_entry::<String, String>()? {
            map.insert_if_absent(StatEntry::new(label, value));
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for StatMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(StatMapVisitor)
    }
}
