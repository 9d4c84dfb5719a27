//! # Text Normalization
//!
//! The first stages of the pipeline: they turn recognizer output into a clean
//! [`LineSequence`] before any extraction happens.
//!
//! 1. **Line breaks** - escaped `\n`, CR/LF variants, runs of blank lines
//! 2. **Glyphs** - Unicode NFC, fullwidth ASCII, invisible characters
//! 3. **Noise filter** - whole-line deny-list of recognizer garbage

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::model::LineSequence;
use crate::observer::PipelineObserver;

// ============================================================================
// Stage 1: Line Breaks
// ============================================================================

static RE_EXCESS_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Canonicalizes line breaks.
///
/// - Literal two-character `\n` escapes become real line breaks
/// - `\r\n` and lone `\r` become `\n`
/// - Three or more consecutive line breaks collapse to exactly two
/// - Leading/trailing whitespace of the whole text is trimmed
pub fn normalize_line_breaks(text: &str) -> String {
    let unescaped = text
        .replace("\\n", "\n")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    RE_EXCESS_BREAKS
        .replace_all(&unescaped, "\n\n")
        .trim()
        .to_string()
}

// ============================================================================
// Stage 2: Glyphs
// ============================================================================

/// Normalizes glyphs the recognizer emits in inconsistent forms.
///
/// - Unicode NFC (decomposed Hangul jamo are recomposed into syllables)
/// - Invisible characters removed (BOM, zero-width space, replacement char)
/// - Fullwidth ASCII variants (`％`, `：`, `１`) mapped to ASCII
/// - Ideographic space mapped to a regular space
pub fn normalize_glyphs(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.nfc() {
        if is_invisible_char(c) {
            continue;
        }

        if let Some(normalized) = normalize_fullwidth(c) {
            result.push(normalized);
            continue;
        }

        result.push(c);
    }

    result
}

/// Check if character is invisible noise that should be removed
fn is_invisible_char(c: char) -> bool {
    matches!(
        c,
        '\0'
        | '\u{200B}' // Zero-width space
        | '\u{200C}' // Zero-width non-joiner
        | '\u{200D}' // Zero-width joiner
        | '\u{FEFF}' // BOM
        | '\u{FFFD}' // Replacement character
        | '\u{00AD}' // Soft hyphen
    )
}

/// Normalize fullwidth characters to ASCII equivalents
fn normalize_fullwidth(c: char) -> Option<char> {
    match c {
        '\u{3000}' => Some(' '),
        '\u{FF01}'..='\u{FF5E}' => {
            let offset = c as u32 - 0xFF01;
            char::from_u32(0x21 + offset)
        }
        _ => None,
    }
}

/// Splits text into trimmed, non-blank lines.
pub fn split_lines(text: &str) -> LineSequence {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// Stage 3: Noise Filter
// ============================================================================

/// Structural signatures of lines the recognizer produces from screen chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseSignature {
    /// A digit run broken by two or more consecutive `.`/`,` marks ("12.,345").
    MalformedDigitRun,
    /// The tab bar caption read together with two stray numbers.
    TabBarCaption,
    /// Nothing but a 12+ digit run followed by a 9+ digit run.
    DoubleDigitRun,
}

static RE_MALFORMED_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[.,]{2,}\d").unwrap());

static RE_TAB_BAR_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+ \d+\.\d+\s+공격\s*정보\s+지원\s*정보\s+타임\s*라인$").unwrap()
});

static RE_DOUBLE_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12,}\s+\d{9,}$").unwrap());

/// Returns the garbage signature a line matches, if any.
///
/// The whole line is judged at once; there is no partial repair.
pub fn noise_signature(line: &str) -> Option<NoiseSignature> {
    let trimmed = line.trim();

    if RE_MALFORMED_DIGIT_RUN.is_match(trimmed) {
        return Some(NoiseSignature::MalformedDigitRun);
    }
    if RE_TAB_BAR_CAPTION.is_match(trimmed) {
        return Some(NoiseSignature::TabBarCaption);
    }
    if RE_DOUBLE_DIGIT_RUN.is_match(trimmed) {
        return Some(NoiseSignature::DoubleDigitRun);
    }

    None
}

/// Drops lines matching a known garbage signature. Surviving lines are
/// returned unchanged and in order.
pub fn filter_noise_lines(lines: &[String], observer: &dyn PipelineObserver) -> LineSequence {
    lines
        .iter()
        .filter(|line| match noise_signature(line) {
            Some(signature) => {
                observer.line_dropped(line, signature);
                false
            }
            None => true,
        })
        .cloned()
        .collect()
}
