// chargelog - app/state.rs
//
// Filter view controller: owns the active filter selection, the free-text
// search, and the latest snapshot. Re-entered on every refresh cycle; the
// filtered view is always recomputed from scratch, so unchanged state
// yields identical output.

use crate::core::correlate::{self, RecordTags};
use crate::core::filter::PredicateVocabulary;
use crate::core::model::{FilterSelection, FilterSpecifier, FilteredView, LogRecord};
use crate::util::error::ExportError;
use std::collections::HashSet;
use std::io::Write;

/// View state for one selected charger.
///
/// Each refresh fully replaces the snapshot; only the filter selection and
/// search text survive between cycles.
#[derive(Debug)]
pub struct ViewState {
    snapshot: Vec<LogRecord>,
    tags: Vec<RecordTags>,
    selection: FilterSelection,
    search_text: String,
    vocabulary: PredicateVocabulary,
    filtered_indices: Vec<usize>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(PredicateVocabulary::default())
    }
}

impl ViewState {
    pub fn new(vocabulary: PredicateVocabulary) -> Self {
        Self {
            snapshot: Vec::new(),
            tags: Vec::new(),
            selection: FilterSelection::ShowAll,
            search_text: String::new(),
            vocabulary,
            filtered_indices: Vec::new(),
        }
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Replace the snapshot wholesale with a fresh fetch and recompute.
    pub fn refresh(&mut self, snapshot: Vec<LogRecord>) {
        self.tags = correlate::classify_records(&snapshot);
        self.snapshot = snapshot;
        self.apply();
        tracing::debug!(
            total = self.snapshot.len(),
            filtered = self.filtered_indices.len(),
            "Snapshot refreshed"
        );
    }

    /// Switch to ShowAll, clearing any specific filters.
    pub fn select_show_all(&mut self) {
        self.selection = FilterSelection::ShowAll;
        self.apply();
    }

    /// Toggle one filter specifier.
    ///
    /// Selecting ShowAll clears the set; selecting a specific filter while
    /// in ShowAll starts a fresh set with just that filter; toggling the
    /// last member away reverts to ShowAll.
    pub fn toggle_filter(&mut self, spec: FilterSpecifier) {
        if spec == FilterSpecifier::ShowAll {
            self.select_show_all();
            return;
        }

        self.selection = match std::mem::take(&mut self.selection) {
            FilterSelection::ShowAll => {
                let mut set = HashSet::new();
                set.insert(spec);
                FilterSelection::Specific(set)
            }
            FilterSelection::Specific(mut set) => {
                if !set.remove(&spec) {
                    set.insert(spec);
                }
                if set.is_empty() {
                    FilterSelection::ShowAll
                } else {
                    FilterSelection::Specific(set)
                }
            }
        };
        self.apply();
    }

    /// Update the free-text search and recompute.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.apply();
    }

    /// Force ShowAll and empty the search field.
    pub fn clear_all(&mut self) {
        self.selection = FilterSelection::ShowAll;
        self.search_text.clear();
        self.apply();
    }

    fn apply(&mut self) {
        self.filtered_indices = correlate::select(
            &self.snapshot,
            &self.tags,
            &self.selection,
            &self.search_text,
            &self.vocabulary,
        );
    }

    /// The `(total, filtered)` count pair for status display.
    pub fn counts(&self) -> (usize, usize) {
        (self.snapshot.len(), self.filtered_indices.len())
    }

    /// Borrowing iterator over the filtered records, in view order.
    pub fn filtered_records(&self) -> impl Iterator<Item = &LogRecord> {
        self.filtered_indices.iter().map(|&i| &self.snapshot[i])
    }

    /// Materialise the filtered view for the rendering layer.
    pub fn view(&self) -> FilteredView {
        let records: Vec<LogRecord> = self.filtered_records().cloned().collect();
        let filtered = records.len();
        FilteredView {
            records,
            total: self.snapshot.len(),
            filtered,
        }
    }

    /// Export the current snapshot as CSV, most-recent-first, independent
    /// of the active filters. Returns the number of rows written.
    pub fn export_csv<W: Write>(
        &self,
        charge_point_id: &str,
        writer: W,
    ) -> Result<usize, ExportError> {
        let newest_first: Vec<LogRecord> = self.snapshot.iter().rev().cloned().collect();
        crate::core::export::export_csv(&newest_first, charge_point_id, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Direction;

    fn snapshot() -> Vec<LogRecord> {
        vec![
            LogRecord::new("2024-03-01T10:00:01Z", "WebSocket connection established"),
            LogRecord::new(
                "2024-03-01T10:00:02Z",
                r#"CP->CS: [2,"42","Reset",{"type":"Soft"}]"#,
            ),
            LogRecord::new(
                "2024-03-01T10:00:03Z",
                r#"CS->CP: [3,"42",{"status":"Accepted"}]"#,
            ),
        ]
    }

    fn action(name: &str) -> FilterSpecifier {
        FilterSpecifier::Action(name.to_string())
    }

    #[test]
    fn test_initial_state_is_show_all() {
        let state = ViewState::default();
        assert!(state.selection().is_show_all());
    }

    #[test]
    fn test_show_all_returns_snapshot_verbatim() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        let view = state.view();
        assert_eq!(view.records, snapshot());
        assert_eq!((view.total, view.filtered), (3, 3));
    }

    #[test]
    fn test_toggle_from_show_all_starts_specific() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));
        assert!(!state.selection().is_show_all());
        assert_eq!(state.counts(), (3, 2)); // call + correlated reply
    }

    #[test]
    fn test_toggle_last_filter_reverts_to_show_all() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));
        state.toggle_filter(action("Reset"));
        assert!(state.selection().is_show_all());
        assert_eq!(state.counts(), (3, 3));
    }

    #[test]
    fn test_select_show_all_clears_set() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));
        state.toggle_filter(FilterSpecifier::Connection);
        state.toggle_filter(FilterSpecifier::ShowAll);
        assert!(state.selection().is_show_all());
    }

    #[test]
    fn test_add_and_remove_in_specific_state() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));
        state.toggle_filter(FilterSpecifier::Connection);
        assert_eq!(state.counts(), (3, 3));
        state.toggle_filter(action("Reset"));
        // Connection filter remains: only the connection line matches.
        assert_eq!(state.counts(), (3, 1));
        assert!(!state.selection().is_show_all());
    }

    #[test]
    fn test_clear_all_resets_selection_and_search() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(FilterSpecifier::Direction(Direction::ChargerToServer));
        state.set_search("reset");
        state.clear_all();
        assert!(state.selection().is_show_all());
        assert_eq!(state.search_text(), "");
        assert_eq!(state.counts(), (3, 3));
    }

    #[test]
    fn test_refresh_replaces_snapshot_and_keeps_filters() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));
        assert_eq!(state.counts(), (3, 2));

        // New snapshot without any Reset traffic: same filters, empty view.
        state.refresh(vec![LogRecord::new(
            "2024-03-01T11:00:00Z",
            r#"CP->CS: [2,"1","Heartbeat",{}]"#,
        )]);
        assert!(!state.selection().is_show_all());
        assert_eq!(state.counts(), (1, 0));
    }

    #[test]
    fn test_refresh_is_deterministic() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));
        let first = state.view();
        state.refresh(snapshot());
        let second = state.view();
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_ignores_active_filters() {
        let mut state = ViewState::default();
        state.refresh(snapshot());
        state.toggle_filter(action("Reset"));

        let mut buf = Vec::new();
        let rows = state.export_csv("CP001", &mut buf).unwrap();
        // The connection line has no flow and is dropped; the Reset pair
        // exports even though only it matches the filter, but the filter
        // played no part: all flow-bearing records are present.
        assert_eq!(rows, 2);
        let output = String::from_utf8(buf).unwrap();
        // Most-recent-first: the reply (10:00:03) precedes the call.
        let reply_pos = output.find("StatusResponse").unwrap();
        let call_pos = output.find("Reset").unwrap();
        assert!(reply_pos < call_pos);
    }
}
