//! Diagnostic hooks for the extraction pipeline.
//!
//! Stages never print. Anything worth reporting goes through a
//! [`PipelineObserver`] passed in by the caller, so the pipeline runs headless
//! by default and can be wired to the `log` facade with [`LogObserver`].

use std::fmt;

use crate::extract::pattern::PatternError;
use crate::model::Source;
use crate::normalize::NoiseSignature;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Escaped/redundant line break canonicalization.
    LineBreaks,
    /// NFC and fullwidth glyph normalization.
    Glyphs,
    /// Known garbage line removal.
    NoiseFilter,
    /// Label row / value row pairing.
    TableStructure,
    /// Isolated single Hangul replacement.
    SingleCharacters,
    /// Dictionary and structural corrections.
    Correction,
    /// Dedicated combat time rule.
    CombatTime,
    /// Fallback label/value patterns.
    Patterns,
    /// Precedence merge.
    Aggregation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LineBreaks => "line breaks",
            Stage::Glyphs => "glyphs",
            Stage::NoiseFilter => "noise filter",
            Stage::TableStructure => "table structure",
            Stage::SingleCharacters => "single characters",
            Stage::Correction => "correction",
            Stage::CombatTime => "combat time",
            Stage::Patterns => "patterns",
            Stage::Aggregation => "aggregation",
        };
        f.write_str(name)
    }
}

/// Receives diagnostics from the pipeline. Every method defaults to a no-op.
pub trait PipelineObserver {
    /// A stage finished; `items` is the number of lines or entries it produced.
    fn stage_finished(&self, _stage: Stage, _items: usize) {}

    /// A line was dropped as recognizer garbage.
    fn line_dropped(&self, _line: &str, _signature: NoiseSignature) {}

    /// A label row was found at `label_row`, yielding `pairs` entries.
    fn table_detected(&self, _label_row: usize, _pairs: usize) {}

    /// A single pattern attempt failed; the scan continues.
    fn pattern_failed(&self, _line_index: usize, _rule: &str, _error: &PatternError) {}

    /// A lower-precedence entry lost a label collision.
    fn entry_discarded(&self, _label: &str, _value: &str, _source: Source) {}

    /// The pipeline panicked and returned an empty map.
    fn pipeline_panicked(&self, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn stage_finished(&self, stage: Stage, items: usize) {
        log::debug!("stage '{}' finished with {} items", stage, items);
    }

    fn line_dropped(&self, line: &str, signature: NoiseSignature) {
        log::debug!("dropped noise line ({:?}): {}", signature, line);
    }

    fn table_detected(&self, label_row: usize, pairs: usize) {
        log::debug!("label row at line {} yielded {} pairs", label_row, pairs);
    }

    fn pattern_failed(&self, line_index: usize, rule: &str, error: &PatternError) {
        log::warn!("pattern '{}' failed on line {}: {}", rule, line_index, error);
    }

    fn entry_discarded(&self, label: &str, value: &str, source: Source) {
        log::debug!("discarded {} value '{}' for '{}'", source, value, label);
    }

    fn pipeline_panicked(&self, message: &str) {
        log::error!("extraction pipeline panicked: {}", message);
    }
}
