// chargelog - core/correlate.rs
//
// Two-pass correlation over a snapshot:
//   classify_records: tag every record with frame, direction, timestamp.
//   select: direct matches for the active filters, plus replies correlated
//           to action-matched Calls by unique id + payload-shape check.
// Both passes are pure functions of their inputs; re-running them on an
// unchanged snapshot yields identical output.

use crate::core::classify;
use crate::core::direction;
use crate::core::filter::{matches_search, PredicateVocabulary};
use crate::core::frame;
use crate::core::model::{
    Direction, FilterSelection, FilterSpecifier, LogRecord, MessageType, ParsedFrame,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Per-record derivations shared by the selection pass and the exporter.
/// Parallel to the snapshot slice; index i tags record i.
#[derive(Debug, Clone)]
pub struct RecordTags {
    pub frame: Option<ParsedFrame>,
    pub direction: Direction,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Pass 1: derive frame, direction, and timestamp for every record.
pub fn classify_records(records: &[LogRecord]) -> Vec<RecordTags> {
    records
        .iter()
        .map(|record| {
            let parsed = frame::parse_frame(&record.message);
            let resolved = direction::resolve(&record.message, parsed.as_ref());
            RecordTags {
                frame: parsed,
                direction: resolved,
                timestamp: record.parsed_timestamp(),
            }
        })
        .collect()
}

/// Pass 2: select the records matching the active filters.
///
/// Returns indices into the snapshot. `ShowAll` bypasses correlation and
/// returns everything in original order; a specific filter set produces
/// direct matches plus correlated replies, de-duplicated and sorted
/// ascending by timestamp (untimestamped records keep input order at the
/// end). The free-text search is applied last and only ever narrows.
pub fn select(
    records: &[LogRecord],
    tags: &[RecordTags],
    selection: &FilterSelection,
    search: &str,
    vocab: &PredicateVocabulary,
) -> Vec<usize> {
    let needle = search.trim().to_lowercase();

    let set = match selection {
        FilterSelection::ShowAll => {
            return (0..records.len())
                .filter(|&i| matches_search(&records[i].message, &needle))
                .collect();
        }
        FilterSelection::Specific(set) => set,
    };

    let mut action_names: HashSet<&str> = HashSet::new();
    let mut directions: HashSet<Direction> = HashSet::new();
    let mut want_connection = false;
    let mut want_error = false;
    for spec in set {
        match spec {
            FilterSpecifier::Action(name) => {
                action_names.insert(name.as_str());
            }
            FilterSpecifier::Direction(d) => {
                directions.insert(*d);
            }
            FilterSpecifier::Connection => want_connection = true,
            FilterSpecifier::Error => want_error = true,
            // ShowAll never coexists with specific filters; treat a stray
            // one as inert rather than widening the result.
            FilterSpecifier::ShowAll => {}
        }
    }

    // Direct matches: any active predicate true on the record itself.
    let mut direct: Vec<usize> = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let tag = &tags[i];
        let action_hit = match &tag.frame {
            Some(f) if f.message_type == MessageType::Call => f
                .action
                .as_deref()
                .is_some_and(|a| action_names.contains(a)),
            _ => false,
        };
        let direction_hit = tag.direction != Direction::Unknown && directions.contains(&tag.direction);
        if action_hit
            || direction_hit
            || (want_connection && vocab.is_connection(&record.message))
            || (want_error && vocab.is_error(&record.message))
        {
            direct.push(i);
        }
    }

    // An action filter with no matching Call means "no such traffic
    // occurred"; never widen to unrelated records.
    if !action_names.is_empty() && direct.is_empty() {
        tracing::debug!(?action_names, "No direct matches for action filters; empty result");
        return Vec::new();
    }

    // Correlation keys: unique ids of Calls selected by an action filter,
    // remembering which filter(s) produced each key.
    let mut keys: HashMap<&str, HashSet<&str>> = HashMap::new();
    for &i in &direct {
        if let Some(f) = &tags[i].frame {
            if f.message_type == MessageType::Call {
                if let Some(action) = f.action.as_deref() {
                    if action_names.contains(action) {
                        keys.entry(f.unique_id.as_str()).or_default().insert(action);
                    }
                }
            }
        }
    }

    // Related matches: replies carrying a recorded key. Results must pass
    // the response-matcher for at least one action that produced the key;
    // Errors correlate unconditionally once keyed.
    let mut selected: BTreeSet<usize> = direct.iter().copied().collect();
    if !keys.is_empty() {
        for (i, tag) in tags.iter().enumerate() {
            if selected.contains(&i) {
                continue;
            }
            let Some(f) = &tag.frame else { continue };
            let Some(key_actions) = keys.get(f.unique_id.as_str()) else {
                continue;
            };
            let related = match f.message_type {
                MessageType::CallError => true,
                MessageType::CallResult => key_actions
                    .iter()
                    .any(|a| classify::action_matches_result(a, f.payload.as_ref())),
                MessageType::Call => false,
            };
            if related {
                selected.insert(i);
            }
        }
    }

    tracing::debug!(
        direct = direct.len(),
        total = selected.len(),
        "Correlation complete"
    );

    // Chronological order; untimestamped records sort last, input order
    // preserved among equals.
    let mut result: Vec<usize> = selected.into_iter().collect();
    result.sort_by(|&a, &b| match (tags[a].timestamp, tags[b].timestamp) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(&b),
    });

    result.retain(|&i| matches_search(&records[i].message, &needle));
    result
}
