//! # Correction
//!
//! Line-level repair of known recognizer mistakes.
//!
//! 1. **Single characters** - isolated Hangul syllables become a `-` placeholder
//! 2. **Dictionary** - whole-word misspellings of domain terms
//! 3. **Minute count** - `1 분` is joined to `1분`; a bare `분` gets its dropped
//!    leading `1` back
//! 4. **Clock layout** - `(전투 시간 14 : 12)` becomes `전투 시간    14:12`
//! 5. **Compound spacing** - glued terms after known prefixes are split apart

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

// ============================================================================
// Single Character Substitution
// ============================================================================

/// Check if character is a precomposed Hangul syllable
pub(crate) fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Replaces every Hangul syllable that stands alone between whitespace with
/// `-`, leaving the surrounding whitespace untouched.
///
/// Stray single glyphs between numeric fields are almost always a mis-split
/// particle, so a neutral placeholder keeps them out of later patterns while
/// preserving the column spacing.
pub fn substitute_single_characters(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut result = String::with_capacity(line.len());

    for (i, &c) in chars.iter().enumerate() {
        let isolated = is_hangul_syllable(c)
            && i > 0
            && chars[i - 1].is_whitespace()
            && chars.get(i + 1).is_some_and(|next| next.is_whitespace())
            && !is_spaced_unit(&chars, i);

        if isolated {
            result.push('-');
        } else {
            result.push(c);
        }
    }

    result
}

/// A `분`/`초` whose previous token ends in a digit is a spaced time unit
/// (`1 분 피해량`), not a stray glyph.
fn is_spaced_unit(chars: &[char], i: usize) -> bool {
    matches!(chars[i], '분' | '초')
        && chars[..i]
            .iter()
            .rev()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| c.is_ascii_digit())
}

// ============================================================================
// Correction Dictionary
// ============================================================================

/// Known misrecognitions of domain terms: (misrecognized, corrected).
const CORRECTIONS: &[(&str, &str)] = &[
    // 피해량
    ("피해랑", "피해량"),
    ("피해럄", "피해량"),
    ("피혜량", "피해량"),
    ("피해양", "피해량"),
    // 적중률
    ("적중룰", "적중률"),
    ("적증률", "적중률"),
    ("적중를", "적중률"),
    ("적중율", "적중률"),
    // 유효율
    ("유효을", "유효율"),
    ("유효룰", "유효율"),
    ("유호율", "유효율"),
    // 가동률
    ("가동를", "가동률"),
    ("가동룰", "가동률"),
    ("가동율", "가동률"),
    // 백어택
    ("백어텍", "백어택"),
    ("백이택", "백어택"),
    ("백어태", "백어택"),
    // 카운터
    ("카운타", "카운터"),
    ("카운더", "카운터"),
    ("카문터", "카운터"),
    // 치명타
    ("치명티", "치명타"),
    ("치멍타", "치명타"),
    ("치명다", "치명타"),
    // 전투 시간
    ("시관", "시간"),
    ("시긴", "시간"),
    ("전튜", "전투"),
];

/// Read-only table of known misrecognitions, compiled once per process.
pub struct CorrectionDictionary {
    entries: HashMap<&'static str, &'static str>,
    matcher: Regex,
}

static DICTIONARY: LazyLock<CorrectionDictionary> = LazyLock::new(CorrectionDictionary::build);

impl CorrectionDictionary {
    /// Returns the process-wide dictionary.
    pub fn global() -> &'static CorrectionDictionary {
        &DICTIONARY
    }

    fn build() -> Self {
        let entries: HashMap<&'static str, &'static str> = CORRECTIONS.iter().copied().collect();

        // Longest keys first so overlapping keys prefer the longer match
        let mut keys: Vec<&str> = entries.keys().copied().collect();
        keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = Regex::new(&format!(r"\b(?:{})\b", alternation)).unwrap();

        Self { entries, matcher }
    }

    /// Returns the correction for a misrecognized token.
    pub fn get(&self, token: &str) -> Option<&'static str> {
        self.entries.get(token).copied()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over (misrecognized, corrected) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        CORRECTIONS.iter().copied()
    }

    /// Replaces every whole-word misrecognition in `line`.
    pub fn apply(&self, line: &str) -> String {
        self.matcher
            .replace_all(line, |caps: &Captures| {
                let token = &caps[0];
                self.get(token).unwrap_or(token).to_string()
            })
            .into_owned()
    }
}

// ============================================================================
// Structural Rules
// ============================================================================

static RE_SPACED_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)(\d+)\s+([분초])(\s|$)").unwrap());

static RE_BARE_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)분(\s|$)").unwrap());

static RE_PARENTHESIZED_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*([가-힣]+(?:\s+[가-힣]+)*)\s+(\d{1,3})\s*:\s*(\d{1,2})\s*\)").unwrap()
});

/// Prefixes that the recognizer glues to the following term.
const COMPOUND_PREFIXES: &[&str] = &["치명타", "백어택", "초당"];

static RE_COMPOUND_SPACING: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    COMPOUND_PREFIXES
        .iter()
        .map(|prefix| Regex::new(&format!("({})([가-힣])", regex::escape(prefix))).unwrap())
        .collect()
});

/// Upper bound on rule-set passes per line.
const MAX_CORRECTION_PASSES: usize = 8;

/// Applies the ordered rule set once.
fn apply_rules(line: &str) -> String {
    let mut result = DICTIONARY.apply(line);

    result = RE_SPACED_UNIT
        .replace_all(&result, "${1}${2}${3}${4}")
        .into_owned();

    result = RE_BARE_MINUTE
        .replace_all(&result, "${1}1분${2}")
        .into_owned();

    result = RE_PARENTHESIZED_CLOCK
        .replace_all(&result, "$1    $2:$3")
        .into_owned();

    for re in RE_COMPOUND_SPACING.iter() {
        result = re.replace_all(&result, "$1 $2").into_owned();
    }

    result
}

/// Corrects one line.
///
/// The rule set is re-applied until the line stops changing, so a rule that
/// exposes a new whole word for the dictionary (e.g. splitting `치명타적증률`)
/// is fully resolved and `correct_line(correct_line(x)) == correct_line(x)`.
pub fn correct_line(line: &str) -> String {
    let mut current = apply_rules(line);

    for _ in 1..MAX_CORRECTION_PASSES {
        let next = apply_rules(&current);
        if next == current {
            break;
        }
        current = next;
    }

    current
}
