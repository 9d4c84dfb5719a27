//! Precedence merge of the extraction strategies into one [`StatMap`].

use crate::extract::CombatTime;
use crate::model::{StatEntry, StatMap, Source, COMBAT_TIME_LABEL};
use crate::observer::PipelineObserver;

/// Merges table pairs, the combat time and pattern matches.
///
/// Precedence is table > combat time > pattern; a lower-precedence entry
/// whose label is already present is discarded and reported. The combat time
/// label, when present, is moved to the front. Every other label keeps the
/// order in which it was first accepted.
pub fn aggregate(
    table: &[StatEntry],
    combat_time: Option<&CombatTime>,
    patterns: &[StatEntry],
    observer: &dyn PipelineObserver,
) -> StatMap {
    let mut stats = StatMap::new();

    let combat_entry = combat_time.map(|time| StatEntry::new(COMBAT_TIME_LABEL, &time.value));

    let ordered = table
        .iter()
        .map(|entry| (entry, Source::Table))
        .chain(combat_entry.iter().map(|entry| (entry, Source::CombatTime)))
        .chain(patterns.iter().map(|entry| (entry, Source::Pattern)));

    for (entry, source) in ordered {
        if !stats.insert_if_absent(entry.clone()) {
            observer.entry_discarded(&entry.label, &entry.value, source);
        }
    }

    stats.pin_first(COMBAT_TIME_LABEL);
    stats
}
