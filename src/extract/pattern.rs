//! Fallback label/value patterns.
//!
//! Anything the table stage missed is picked up here, line by line. Rule
//! families are tried in a fixed order and the first value seen for a label
//! wins, so a looser rule never overwrites a more specific one.
//!
//! A failing attempt is reported to the observer and skipped; the scan always
//! covers every line with every rule.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use super::VALUE_PATTERN;
use crate::model::StatEntry;
use crate::observer::PipelineObserver;

/// Failure of a single rule attempt on a single line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The line exceeds the configured length limit.
    #[error("line has {chars} characters (limit {limit})")]
    LineTooLong { chars: usize, limit: usize },
}

/// Rule families, in the order they are tried on each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    /// `<words> <value>`
    Generic,
    /// `<digits>분 <term> <value>` or `<digits><term> <value>`, for per-minute /
    /// per-second metrics. The term never starts with a unit glyph.
    PerUnit,
    /// `<term> 적중률 <percentage>`
    HitRate,
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternFamily::Generic => write!(f, "generic"),
            PatternFamily::PerUnit => write!(f, "per-unit"),
            PatternFamily::HitRate => write!(f, "hit-rate"),
        }
    }
}

/// A compiled rule. Group 1 is the label, group 2 the value.
struct PatternRule {
    family: PatternFamily,
    regex: Regex,
}

/// Rule sources, in the order they are tried.
const RULE_SOURCES: &[(PatternFamily, &str)] = &[
    (
        PatternFamily::Generic,
        r"(?:^|\s)([가-힣A-Za-z][가-힣A-Za-z0-9]*(?:\s+[가-힣A-Za-z][가-힣A-Za-z0-9]*)*)\s+({value})",
    ),
    (
        PatternFamily::PerUnit,
        r"(?:^|\s)(\d+(?:\s*분\s*[가-힣]+|[가-힣&&[^억만분]][가-힣]*)(?:\s+[가-힣]+)*)\s+({value})",
    ),
    (
        PatternFamily::HitRate,
        r"(?:^|\s)([가-힣]+\s*적중률)\s*(\d+(?:\.\d+)?%)",
    ),
];

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .filter_map(|(family, source)| {
            let source = source.replace("{value}", VALUE_PATTERN);
            match Regex::new(&source) {
                Ok(regex) => Some(PatternRule {
                    family: *family,
                    regex,
                }),
                Err(e) => {
                    log::warn!("skipping {} rule that failed to compile: {}", family, e);
                    None
                }
            }
        })
        .collect()
});

/// A label right after a `<digits>분` / `<digits>초` unit is the tail of a
/// per-unit metric ("1분 피해량") and belongs to that family.
static RE_UNIT_COUNT_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[분초]\s*$").unwrap());

/// Returns true if a Generic label is really the tail of a per-unit metric,
/// either after a glued unit (`1분 피해량`) or as a spaced unit (`1 분 피해량`).
fn is_unit_tail(prefix: &str, label: &str) -> bool {
    if RE_UNIT_COUNT_TAIL.is_match(prefix) {
        return true;
    }
    matches!(label.split_whitespace().next(), Some("분" | "초"))
        && prefix
            .trim_end()
            .ends_with(|c: char| c.is_ascii_digit())
}

/// `1 분 피해량` and `1분피해량` both label as `1분 피해량`.
static RE_MINUTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*분\s*").unwrap());

/// Returns true if the value ending at `end` is a complete token.
///
/// A value followed by a separator or a clock colon is part of something
/// larger ("14:12", "3,21") and is rejected.
fn is_terminated(line: &str, end: usize) -> bool {
    let rest = &line[end..];
    if rest.trim_start().starts_with(':') {
        return false;
    }
    !rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, ',' | '.'))
}

/// Runs one rule over one line.
fn try_rule(rule: &PatternRule, line: &str, max_line_chars: usize) -> Result<Vec<StatEntry>, PatternError> {
    let chars = line.chars().count();
    if chars > max_line_chars {
        return Err(PatternError::LineTooLong {
            chars,
            limit: max_line_chars,
        });
    }

    let mut found = Vec::new();

    for caps in rule.regex.captures_iter(line) {
        let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        if !is_terminated(line, value.end()) {
            continue;
        }

        if rule.family == PatternFamily::Generic && is_unit_tail(&line[..label.start()], label.as_str()) {
            continue;
        }

        let label = match rule.family {
            PatternFamily::PerUnit => RE_MINUTE_PREFIX.replace(label.as_str(), "${1}분 "),
            _ => label.as_str().into(),
        };
        found.push(StatEntry::new(label, value.as_str()));
    }

    Ok(found)
}

/// Extracts label/value pairs from every line with every rule family.
///
/// The first value seen for a label wins, across families and across lines.
/// Lines longer than `max_line_chars` are reported as failures and skipped.
pub fn extract_patterns(
    lines: &[String],
    max_line_chars: usize,
    observer: &dyn PipelineObserver,
) -> Vec<StatEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();

    for (line_index, line) in lines.iter().enumerate() {
        for rule in RULES.iter() {
            match try_rule(rule, line, max_line_chars) {
                Ok(found) => {
                    for entry in found {
                        if seen.insert(entry.label.clone()) {
                            entries.push(entry);
                        }
                    }
                }
                Err(e) => {
                    observer.pattern_failed(line_index, &rule.family.to_string(), &e);
                }
            }
        }
    }

    entries
}
