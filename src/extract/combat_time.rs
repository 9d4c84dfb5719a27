//! Elapsed combat time.
//!
//! The combat time is the field downstream storage cares about most, so it
//! gets its own strict rule instead of going through the generic patterns.

use regex::Regex;
use std::sync::LazyLock;

static RE_COMBAT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"전투\s*시간\s*(\d{1,3})\s*:\s*(\d{1,2})(?:\D|$)").unwrap()
});

/// A normalized combat time and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatTime {
    /// `<minutes>:<two-digit seconds>`, e.g. "14:12".
    pub value: String,
    /// The line the time was read from.
    pub line: String,
    /// Index of that line in the sequence.
    pub line_index: usize,
}

/// Reads a combat time from a single line.
///
/// Seconds of 60 or more are rejected as misreads.
pub fn parse_combat_time(line: &str) -> Option<String> {
    let caps = RE_COMBAT_TIME.captures(line)?;
    let minutes = &caps[1];
    let seconds: u32 = caps[2].parse().ok()?;

    if seconds >= 60 {
        return None;
    }

    Some(format!("{}:{:02}", minutes, seconds))
}

/// Returns the first combat time found in the line sequence.
pub fn extract_combat_time(lines: &[String]) -> Option<CombatTime> {
    lines.iter().enumerate().find_map(|(line_index, line)| {
        parse_combat_time(line).map(|value| CombatTime {
            value,
            line: line.clone(),
            line_index,
        })
    })
}
