//! # Extraction Pipeline
//!
//! Composes the stages strictly in sequence:
//!
//! 1. **Line breaks** - [`normalize_line_breaks`]
//! 2. **Glyphs** - [`normalize_glyphs`] (optional)
//! 3. **Noise filter** - [`filter_noise_lines`]
//! 4. **Table structure** - [`extract_table`] (optional)
//! 5. **Single characters** - [`substitute_single_characters`]
//! 6. **Correction** - [`correct_line`]
//! 7. **Combat time** - [`extract_combat_time`]
//! 8. **Patterns** - [`extract_patterns`] (optional)
//! 9. **Aggregation** - [`aggregate`]
//!
//! The table is read from the filtered lines before any correction, since the
//! label row is recognized on raw spacing. Combat time and patterns see the
//! corrected lines; patterns skip the label and value rows of a detected table.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::aggregate::aggregate;
use crate::correct::{correct_line, substitute_single_characters};
use crate::extract::{extract_combat_time, extract_patterns, extract_table, CombatTime, TableExtraction};
use crate::model::{LineSequence, RawText, StatEntry, StatMap};
use crate::normalize::{filter_noise_lines, normalize_glyphs, normalize_line_breaks, split_lines};
use crate::observer::{PipelineObserver, Stage};
use crate::options::ExtractOptions;

/// Line sequence as it stood after one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSnapshot {
    pub stage: Stage,
    pub lines: LineSequence,
}

/// Intermediate results of a single run, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineTrace {
    /// Line-producing stages, in execution order.
    pub stages: Vec<StageSnapshot>,
    /// The table, if a label row was found.
    pub table: Option<TableExtraction>,
    /// The combat time, if found.
    pub combat_time: Option<CombatTime>,
    /// Fallback pattern matches before aggregation.
    pub patterns: Vec<StatEntry>,
    /// Final aggregated result.
    pub stats: StatMap,
}

impl PipelineTrace {
    /// Returns the lines after `stage`, if that stage ran.
    pub fn lines_after(&self, stage: Stage) -> Option<&[String]> {
        self.stages
            .iter()
            .find(|snapshot| snapshot.stage == stage)
            .map(|snapshot| snapshot.lines.as_slice())
    }
}

/// Runs the whole pipeline.
///
/// Never fails: a panic anywhere in the stages is reported through
/// [`PipelineObserver::pipeline_panicked`] and yields an empty map.
pub fn run(raw: &RawText, options: &ExtractOptions, observer: &dyn PipelineObserver) -> StatMap {
    isolated(observer, || run_stages(raw, options, observer, None))
}

/// Runs the pipeline and records every intermediate result.
///
/// Panics are isolated the same way as in [`run`]; a panicking run yields an
/// empty trace.
pub fn trace(raw: &RawText, options: &ExtractOptions, observer: &dyn PipelineObserver) -> PipelineTrace {
    isolated(observer, || {
        let mut trace = PipelineTrace::default();
        let stats = run_stages(raw, options, observer, Some(&mut trace));
        trace.stats = stats;
        trace
    })
}

fn isolated<T: Default>(observer: &dyn PipelineObserver, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            observer.pipeline_panicked(&panic_message(payload.as_ref()));
            T::default()
        }
    }
}

fn run_stages(
    raw: &RawText,
    options: &ExtractOptions,
    observer: &dyn PipelineObserver,
    mut trace: Option<&mut PipelineTrace>,
) -> StatMap {
    // Stage 1-2: text level
    let mut text = normalize_line_breaks(raw.text());
    finish_lines(&mut trace, observer, Stage::LineBreaks, &split_lines(&text));

    if options.normalize_glyphs {
        text = normalize_glyphs(&text);
        finish_lines(&mut trace, observer, Stage::Glyphs, &split_lines(&text));
    }

    // Stage 3: noise filter
    let lines = filter_noise_lines(&split_lines(&text), observer);
    finish_lines(&mut trace, observer, Stage::NoiseFilter, &lines);

    // Stage 4: table structure
    let table = if options.table_structure {
        let table = extract_table(&lines);
        if let Some(table) = &table {
            observer.table_detected(table.label_row, table.entries.len());
        }
        let pairs = table.as_ref().map_or(0, |t| t.entries.len());
        observer.stage_finished(Stage::TableStructure, pairs);
        table
    } else {
        None
    };

    // Stage 5-6: line repair
    let lines: LineSequence = lines
        .iter()
        .map(|line| substitute_single_characters(line))
        .collect();
    finish_lines(&mut trace, observer, Stage::SingleCharacters, &lines);

    let lines: LineSequence = lines.iter().map(|line| correct_line(line)).collect();
    finish_lines(&mut trace, observer, Stage::Correction, &lines);

    // Stage 7: combat time
    let combat_time = extract_combat_time(&lines);
    observer.stage_finished(Stage::CombatTime, usize::from(combat_time.is_some()));

    // Stage 8: patterns
    let patterns = if options.fallback_patterns {
        // Table rows were consumed by stage 4; blanked so line indices hold
        let pattern_lines: LineSequence = match &table {
            Some(table) => lines
                .iter()
                .enumerate()
                .map(|(index, line)| if table.covers_line(index) { String::new() } else { line.clone() })
                .collect(),
            None => lines.clone(),
        };
        let patterns = extract_patterns(&pattern_lines, options.max_line_chars, observer);
        observer.stage_finished(Stage::Patterns, patterns.len());
        patterns
    } else {
        Vec::new()
    };

    // Stage 9: aggregation
    let table_entries = table.as_ref().map_or(&[][..], |t| t.entries.as_slice());
    let stats = aggregate(table_entries, combat_time.as_ref(), &patterns, observer);
    observer.stage_finished(Stage::Aggregation, stats.len());

    if let Some(trace) = trace {
        trace.table = table;
        trace.combat_time = combat_time;
        trace.patterns = patterns;
    }

    stats
}

fn finish_lines(
    trace: &mut Option<&mut PipelineTrace>,
    observer: &dyn PipelineObserver,
    stage: Stage,
    lines: &[String],
) {
    observer.stage_finished(stage, lines.len());
    if let Some(trace) = trace {
        trace.stages.push(StageSnapshot {
            stage,
            lines: lines.to_vec(),
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::cell::RefCell;

    const SCREEN: &str = "주요 정보\n\
        피해량 초당 피해량 치명타 피해 증가 유효율\n\
        3,214.35억 3.77억 97.86%\n\
        전투 시간 14 : 12\n\
        분 피해량 593.24억";

    #[derive(Default)]
    struct StageRecorder {
        stages: RefCell<Vec<Stage>>,
    }

    impl PipelineObserver for StageRecorder {
        fn stage_finished(&self, stage: Stage, _items: usize) {
            self.stages.borrow_mut().push(stage);
        }
    }

    #[test]
    fn test_stages_reported_in_order() {
        let recorder = StageRecorder::default();
        run(&RawText::from_text(SCREEN), &ExtractOptions::default(), &recorder);

        assert_eq!(
            *recorder.stages.borrow(),
            vec![
                Stage::LineBreaks,
                Stage::Glyphs,
                Stage::NoiseFilter,
                Stage::TableStructure,
                Stage::SingleCharacters,
                Stage::Correction,
                Stage::CombatTime,
                Stage::Patterns,
                Stage::Aggregation,
            ]
        );
    }

    #[test]
    fn test_disabled_stages_skipped() {
        let recorder = StageRecorder::default();
        let options = ExtractOptions::table_only().without_glyph_normalization();
        run(&RawText::from_text(SCREEN), &options, &recorder);

        let stages = recorder.stages.borrow();
        assert!(!stages.contains(&Stage::Glyphs));
        assert!(!stages.contains(&Stage::Patterns));
        assert!(stages.contains(&Stage::TableStructure));
    }

    #[test]
    fn test_trace_records_intermediates() {
        let trace = trace(&RawText::from_text(SCREEN), &ExtractOptions::default(), &NoopObserver);

        let table = trace.table.as_ref().unwrap();
        assert_eq!(table.label_row, 1);
        assert_eq!(table.entries.len(), 3);
        assert_eq!(trace.combat_time.as_ref().unwrap().value, "14:12");

        let corrected = trace.lines_after(Stage::Correction).unwrap();
        assert_eq!(corrected[4], "1분 피해량 593.24억");
        assert!(trace.lines_after(Stage::Patterns).is_none());

        assert_eq!(trace.stats.get("1분 피해량"), Some("593.24억"));
        assert_eq!(trace.stats.combat_time(), Some("14:12"));
    }

    #[test]
    fn test_trace_matches_run() {
        let raw = RawText::from_text(SCREEN);
        let options = ExtractOptions::default();
        assert_eq!(trace(&raw, &options, &NoopObserver).stats, run(&raw, &options, &NoopObserver));
    }

    #[test]
    fn test_patterns_skip_table_rows() {
        let raw = RawText::from_text("피해량 초당 피해량 치명타 피해 증가 유효율\n3214억 3.77억 97.86%\n카운터 성공 17");
        let trace = trace(&raw, &ExtractOptions::default(), &NoopObserver);

        assert_eq!(trace.table.as_ref().unwrap().entries.len(), 3);
        let labels: Vec<&str> = trace.patterns.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["카운터 성공"]);
    }

    #[test]
    fn test_isolated_panic_yields_default() {
        #[derive(Default)]
        struct PanicRecorder {
            messages: RefCell<Vec<String>>,
        }

        impl PipelineObserver for PanicRecorder {
            fn pipeline_panicked(&self, message: &str) {
                self.messages.borrow_mut().push(message.to_string());
            }
        }

        let recorder = PanicRecorder::default();
        let trace = isolated(&recorder, || -> PipelineTrace { panic!("stage exploded") });
        assert_eq!(trace, PipelineTrace::default());
        assert_eq!(*recorder.messages.borrow(), vec!["stage exploded".to_string()]);

        let value = isolated(&recorder, || 7usize);
        assert_eq!(value, 7);
        assert_eq!(recorder.messages.borrow().len(), 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
