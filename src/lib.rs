//! # raidstat
//!
//! Recovers raid result statistics from noisy text recognized on a screenshot
//! of the in-game combat statistics screen.
//!
//! The input is whatever the recognizer produced: broken line breaks, glued or
//! split Korean terms, stray glyphs, whole garbage lines. The output is an
//! insertion-ordered mapping from Korean stat labels to values kept exactly as
//! displayed (`3,214.35억`, `86.36%`, `14:12`).
//!
//! ## Quick Start
//!
//! ```
//! use raidstat::{extract_stats, RawText};
//!
//! let raw = RawText::from_text(
//!     "피해량 초당 피해량 치명타 피해 증가 유효율\n3,214.35억 3.77억 97.86%\n전투 시간 14 : 12",
//! );
//! let stats = extract_stats(&raw);
//!
//! assert_eq!(stats.combat_time(), Some("14:12"));
//! assert_eq!(stats.get("피해량"), Some("3,214.35억"));
//! ```
//!
//! ## Strategies
//!
//! Three strategies contribute entries, in order of precedence:
//!
//! - **Table**: a row of labels paired by position with the row of values below it
//! - **Combat time**: a dedicated rule for `전투 시간 <m> : <s>`
//! - **Patterns**: fallback `<label> <value>` rules, line by line
//!
//! A label is owned by the first strategy that produced it.
//!
//! ## Features
//!
//! - `parallel` (default): parallel batch extraction with Rayon

pub mod aggregate;
pub mod catalog;
pub mod correct;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod observer;
pub mod options;
pub mod pipeline;

// Re-exports
pub use correct::CorrectionDictionary;
pub use error::{Error, Result};
pub use model::{
    LineSequence, RawText, Source, StatEntry, StatMap, COMBAT_TIME_LABEL, DEFAULT_MIN_CONFIDENCE,
    HIGH_CONFIDENCE,
};
pub use observer::{LogObserver, NoopObserver, PipelineObserver, Stage};
pub use options::ExtractOptions;
pub use pipeline::{PipelineTrace, StageSnapshot};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Extracts stats with default options.
///
/// Never fails; an empty map means the caller should fall back to manual entry.
pub fn extract_stats(raw: &RawText) -> StatMap {
    extract_stats_with_options(raw, &ExtractOptions::default())
}

/// Extracts stats with custom options.
pub fn extract_stats_with_options(raw: &RawText, options: &ExtractOptions) -> StatMap {
    pipeline::run(raw, options, &LogObserver)
}

/// Extracts stats from independent inputs.
///
/// Output order matches input order. With the `parallel` feature and
/// [`ExtractOptions::parallel`] set, inputs are processed on the Rayon pool.
///
/// # Example
///
/// ```
/// use raidstat::{extract_batch, ExtractOptions, RawText};
///
/// let inputs = vec![
///     RawText::from_text("전투 시간 14 : 12"),
///     RawText::from_text("무력화 4,240"),
/// ];
/// let results = extract_batch(&inputs, &ExtractOptions::default());
///
/// assert_eq!(results[0].combat_time(), Some("14:12"));
/// assert_eq!(results[1].get("무력화"), Some("4,240"));
/// ```
pub fn extract_batch(inputs: &[RawText], options: &ExtractOptions) -> Vec<StatMap> {
    #[cfg(feature = "parallel")]
    if options.parallel {
        return inputs
            .par_iter()
            .map(|raw| pipeline::run(raw, options, &LogObserver))
            .collect();
    }

    inputs
        .iter()
        .map(|raw| pipeline::run(raw, options, &LogObserver))
        .collect()
}

/// Builder for configured extraction.
///
/// # Example
///
/// ```
/// use raidstat::{Extractor, ExtractOptions, NoopObserver, RawText};
///
/// let stats = Extractor::new()
///     .with_options(ExtractOptions::table_only())
///     .with_observer(NoopObserver)
///     .extract(&RawText::from_text("전투 시간 14 : 12"));
///
/// assert_eq!(stats.combat_time(), Some("14:12"));
/// ```
pub struct Extractor {
    options: ExtractOptions,
    observer: Box<dyn PipelineObserver + Send + Sync>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Creates an extractor with default options that logs through `log`.
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
            observer: Box::new(LogObserver),
        }
    }

    /// Sets the extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the diagnostics observer.
    pub fn with_observer(mut self, observer: impl PipelineObserver + Send + Sync + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Runs the pipeline on one input.
    pub fn extract(&self, raw: &RawText) -> StatMap {
        pipeline::run(raw, &self.options, self.observer.as_ref())
    }

    /// Runs the pipeline and returns every intermediate result.
    pub fn trace(&self, raw: &RawText) -> PipelineTrace {
        pipeline::trace(raw, &self.options, self.observer.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const RESULT_SCREEN: &str = "피해량 초당 피해량 치명타 피해 증가 유효율\n\
        3,214.35억 3.77억 97.86%\n\
        전투 시간 14 : 12";

    fn entries(stats: &StatMap) -> Vec<(&str, &str)> {
        stats
            .iter()
            .map(|e| (e.label.as_str(), e.value.as_str()))
            .collect()
    }

    #[test]
    fn test_result_screen_end_to_end() {
        let stats = extract_stats(&RawText::from_text(RESULT_SCREEN));
        assert_eq!(
            entries(&stats),
            vec![
                ("전투 시간", "14:12"),
                ("피해량", "3,214.35억"),
                ("초당 피해량", "3.77억"),
                ("치명타 피해 증가 유효율", "97.86%"),
            ]
        );
        assert_eq!(
            stats.to_json().unwrap(),
            r#"{"전투 시간":"14:12","피해량":"3,214.35억","초당 피해량":"3.77억","치명타 피해 증가 유효율":"97.86%"}"#
        );
    }

    #[test]
    fn test_escaped_line_breaks_end_to_end() {
        let escaped = RESULT_SCREEN.replace('\n', "\\n");
        let stats = extract_stats(&RawText::from_text(escaped));
        assert_eq!(stats, extract_stats(&RawText::from_text(RESULT_SCREEN)));
    }

    #[test]
    fn test_table_wins_over_pattern() {
        let raw = RawText::from_text(
            "피해량 초당 피해량 치명타 피해 증가 유효율\n\
             3,214.35억 3.77억 97.86%\n\
             피해량 1.00억\n\
             무력화 4,240",
        );
        let stats = extract_stats(&raw);
        assert_eq!(stats.get("피해량"), Some("3,214.35억"));
        assert_eq!(stats.get("무력화"), Some("4,240"));
        assert_eq!(stats.combat_time(), None);
    }

    #[test]
    fn test_corrections_feed_patterns() {
        let raw = RawText::from_text(
            "주요 정보 (전투 시관 14 : 12)\n\
             치명타적증률 86.36%\n\
             백어텍 적중률 62.56%\n\
             분 피해량 593.24억",
        );
        let stats = extract_stats(&raw);
        assert_eq!(
            entries(&stats),
            vec![
                ("전투 시간", "14:12"),
                ("치명타 적중률", "86.36%"),
                ("백어택 적중률", "62.56%"),
                ("1분 피해량", "593.24억"),
            ]
        );
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_empty_input() {
        assert!(extract_stats(&RawText::from_text("")).is_empty());
        assert!(extract_stats(&RawText::from_text("  \n\t\n  ")).is_empty());
        assert!(extract_stats(&RawText::from_text("\\n\\n\\n")).requires_manual_entry());
    }

    #[test]
    fn test_noise_only_input() {
        let raw = RawText::from_text(
            "12 34.56 공격 정보 지원 정보 타임 라인\n\
             123456789012 123456789\n\
             피해량 3..77억",
        );
        assert!(extract_stats(&raw).is_empty());
    }

    #[test]
    fn test_noise_lines_do_not_leak() {
        let raw = RawText::from_text(format!("{}\n무력화 12.,345\n카운터 성공 17", RESULT_SCREEN));
        let stats = extract_stats(&raw);
        assert!(!stats.contains_label("무력화"));
        assert_eq!(stats.get("카운터 성공"), Some("17"));
    }

    #[test]
    fn test_deterministic() {
        let raw = RawText::from_text(RESULT_SCREEN);
        let first = extract_stats(&raw);
        for _ in 0..10 {
            assert_eq!(extract_stats(&raw), first);
        }
    }

    #[test]
    fn test_table_only_skips_patterns() {
        let raw = RawText::from_text(format!("{}\n무력화 4,240", RESULT_SCREEN));
        let stats = extract_stats_with_options(&raw, &ExtractOptions::table_only());
        assert_eq!(stats.len(), 4);
        assert!(!stats.contains_label("무력화"));
    }

    #[test]
    fn test_fullwidth_input() {
        let raw = RawText::from_text("치명타 적중률　８６.３６％");
        let stats = extract_stats(&raw);
        assert_eq!(stats.get("치명타 적중률"), Some("86.36%"));
    }

    struct PanickingObserver;

    impl PipelineObserver for PanickingObserver {
        fn stage_finished(&self, stage: Stage, _items: usize) {
            if stage == Stage::Correction {
                panic!("observer failure");
            }
        }
    }

    #[test]
    fn test_panic_yields_empty_map() {
        let stats = Extractor::new()
            .with_observer(PanickingObserver)
            .extract(&RawText::from_text(RESULT_SCREEN));
        assert!(stats.is_empty());
    }

    #[derive(Clone, Default)]
    struct PanicCounter {
        panics: Arc<AtomicUsize>,
    }

    impl PipelineObserver for PanicCounter {
        fn stage_finished(&self, _stage: Stage, _items: usize) {
            panic!("observer failure");
        }

        fn pipeline_panicked(&self, message: &str) {
            assert_eq!(message, "observer failure");
            self.panics.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_panic_reported_to_observer() {
        let counter = PanicCounter::default();
        let extractor = Extractor::new().with_observer(counter.clone());
        assert!(extractor.extract(&RawText::from_text(RESULT_SCREEN)).is_empty());
        assert_eq!(counter.panics.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_trace_panic_reported_to_observer() {
        let counter = PanicCounter::default();
        let extractor = Extractor::new().with_observer(counter.clone());
        let trace = extractor.trace(&RawText::from_text(RESULT_SCREEN));
        assert!(trace.stats.is_empty());
        assert!(trace.stages.is_empty());
        assert_eq!(counter.panics.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_table_rows_not_rescanned() {
        let raw = RawText::from_text(
            "피해량 초당 피해량 치명타 피해 증가 유효율\n3214억 3.77억 97.86%\n전투 시간 14 : 12",
        );
        let stats = extract_stats(&raw);

        assert_eq!(stats.len(), 4);
        assert_eq!(
            entries(&stats),
            vec![
                ("전투 시간", "14:12"),
                ("피해량", "3214억"),
                ("초당 피해량", "3.77억"),
                ("치명타 피해 증가 유효율", "97.86%"),
            ]
        );
        assert!(!stats.contains_label("3214억"));
    }

    #[test]
    fn test_spaced_minute_label() {
        let stats = extract_stats(&RawText::from_text("1 분 피해량 593.24억"));
        assert_eq!(stats.get("1분 피해량"), Some("593.24억"));
        assert!(!stats.contains_label("피해량"));
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let inputs: Vec<RawText> = vec![
            RawText::from_text(RESULT_SCREEN),
            RawText::from_text(""),
            RawText::from_text("무력화 4,240 카운터 성공 17"),
            RawText::from_text("헤드어택 적중률12.5%"),
        ];

        let parallel = extract_batch(&inputs, &ExtractOptions::default());
        let sequential = extract_batch(&inputs, &ExtractOptions::default().sequential());
        let one_by_one: Vec<StatMap> = inputs.iter().map(extract_stats).collect();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel, one_by_one);
    }

    #[test]
    fn test_extractor_trace() {
        let extractor = Extractor::new().with_options(ExtractOptions::new().sequential());
        let raw = RawText::from_text(RESULT_SCREEN);
        assert!(!extractor.options().parallel);
        assert_eq!(extractor.trace(&raw).stats, extractor.extract(&raw));
    }
}
