//! The collection view: a snapshot of rows plus the screen's [`ViewState`]
//!
//! Every derived value (visible page, counts, empty state) is recomputed
//! from the snapshot and the view state on demand. Setters only touch the
//! view state and then re-clamp the page index against the new filtered
//! count, so the index can never point past the last page.

use std::collections::HashSet;
use std::sync::Arc;

use atrium_common::{Error, FieldValue, Result, Row};

use crate::empty_state::EmptyState;
use crate::filter::{apply_column_filters, apply_global_filter, same_filter_value, FuzzyMatcher};
use crate::paginate::{page_window, paginate};
use crate::sort::{apply_sort, sort_key};
use crate::state::{SortRule, ViewState};
use crate::ViewConfig;

/// Whether the rows behind the view have been fetched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// No fetch has completed yet
    #[default]
    Pending,
    Ready,
    /// The last fetch failed; the collection is treated as empty
    Failed(String),
}

/// Everything a list screen renders, derived in one pass
#[derive(Debug)]
pub struct ViewModel<'a, R> {
    pub visible_rows: Vec<&'a R>,
    /// Rows surviving the filters, across all pages
    pub total_count: usize,
    /// Rows in the snapshot before filtering
    pub raw_count: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub empty_state: EmptyState,
}

/// Collection view engine for one screen
#[derive(Debug)]
pub struct CollectionView<R> {
    rows: Arc<[R]>,
    phase: LoadPhase,
    state: ViewState,
    matcher: FuzzyMatcher,
}

impl<R: Row> CollectionView<R> {
    pub fn new(state: ViewState, matcher: FuzzyMatcher) -> Self {
        Self {
            rows: Arc::from(Vec::new()),
            phase: LoadPhase::Pending,
            state,
            matcher,
        }
    }

    pub fn with_config(config: &ViewConfig) -> Self {
        Self::new(
            ViewState::new(config.page_size),
            FuzzyMatcher::new(config.fuzzy_threshold),
        )
    }

    /// Swap in a freshly fetched collection.
    ///
    /// The whole snapshot is replaced at once. Selected ids that no longer
    /// exist are dropped and the page index is re-clamped. A collection with
    /// duplicate ids is rejected and leaves the view untouched.
    pub fn replace_snapshot(&mut self, rows: Vec<R>) -> Result<()> {
        let mut seen = HashSet::with_capacity(rows.len());
        if let Some(dup) = rows.iter().find(|r| !seen.insert(r.row_id())) {
            return Err(Error::Validation(format!(
                "Duplicate id '{}' in collection snapshot",
                dup.row_id()
            )));
        }

        self.state.retain_selection(|id| seen.contains(id));
        self.rows = Arc::from(rows);
        self.phase = LoadPhase::Ready;
        self.reclamp();

        tracing::debug!(
            rows = self.rows.len(),
            selected = self.state.selected_ids().len(),
            "Collection snapshot replaced"
        );
        Ok(())
    }

    /// Record a failed fetch. The stale rows are discarded until a retry
    /// succeeds.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.rows = Arc::from(Vec::new());
        self.phase = LoadPhase::Failed(message.into());
        self.state.clear_selection();
        self.reclamp();
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The raw snapshot, unfiltered and in repository order
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn snapshot(&self) -> Arc<[R]> {
        Arc::clone(&self.rows)
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|r| r.row_id() == id)
    }

    fn filtered_sorted(&self) -> Vec<&R> {
        let rows: Vec<&R> = self.rows.iter().collect();
        let rows = apply_global_filter(rows, self.state.global_query(), &self.matcher);
        let rows = apply_column_filters(rows, self.state.column_filters());
        apply_sort(rows, self.state.sort_rules())
    }

    /// Derive the visible page and its counts
    pub fn derive(&self) -> ViewModel<'_, R> {
        let sorted = self.filtered_sorted();
        let (page, window) = paginate(&sorted, self.state.page_index(), self.state.page_size());
        let empty_state = EmptyState::classify(
            self.phase == LoadPhase::Pending,
            matches!(self.phase, LoadPhase::Failed(_)),
            self.rows.len(),
            sorted.len(),
        );

        ViewModel {
            total_count: sorted.len(),
            raw_count: self.rows.len(),
            page_index: window.page_index,
            page_count: window.page_count,
            empty_state,
            visible_rows: page.to_vec(),
        }
    }

    pub fn visible_rows(&self) -> Vec<&R> {
        self.derive().visible_rows
    }

    pub fn total_count(&self) -> usize {
        self.filtered_sorted().len()
    }

    pub fn page_count(&self) -> usize {
        self.derive().page_count
    }

    pub fn empty_state(&self) -> EmptyState {
        self.derive().empty_state
    }

    fn reclamp(&mut self) {
        let total = self.filtered_sorted().len();
        let window = page_window(total, self.state.page_index(), self.state.page_size());
        self.state.clamp_page(window.page_count);
    }

    pub fn set_sort(&mut self, rules: Vec<SortRule>) {
        self.state.set_sort(rules);
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.state.toggle_sort(field);
    }

    pub fn set_column_filter(&mut self, field: impl Into<String>, accepted: Vec<FieldValue>) {
        self.state.set_column_filter(field, accepted);
        self.reclamp();
    }

    pub fn clear_column_filter(&mut self, field: &str) {
        self.state.clear_column_filter(field);
        self.reclamp();
    }

    pub fn set_global_query(&mut self, query: impl Into<String>) {
        self.state.set_global_query(query);
        self.reclamp();
    }

    pub fn clear_filters(&mut self) {
        self.state.clear_filters();
        self.reclamp();
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.state.set_page(page_index);
        self.reclamp();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.set_page_size(page_size);
    }

    /// Flip the selection of a row in the snapshot.
    ///
    /// Returns whether the row is selected afterwards; unknown ids are ignored.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.state.toggle_selection(id)
    }

    /// Select every row on the visible page
    pub fn select_all_on_page(&mut self) {
        let ids: Vec<String> = self
            .visible_rows()
            .iter()
            .map(|r| r.row_id().to_string())
            .collect();
        self.state.select(ids);
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state.is_selected(id)
    }

    /// Selected rows in snapshot order, including rows filtered out of view
    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows
            .iter()
            .filter(|r| self.state.is_selected(r.row_id()))
            .collect()
    }

    pub fn is_page_fully_selected(&self) -> bool {
        let visible = self.visible_rows();
        !visible.is_empty() && visible.iter().all(|r| self.state.is_selected(r.row_id()))
    }

    /// Distinct values of `field` across the snapshot, in sort order.
    ///
    /// Used to build column filter menus, so values collapse exactly when a
    /// column filter would treat them as the same value.
    pub fn facet_values(&self, field: &str) -> Vec<FieldValue> {
        let mut values: Vec<FieldValue> = Vec::new();
        for row in self.rows.iter() {
            let Some(value) = row.value(field) else {
                continue;
            };
            if !values.iter().any(|v| same_filter_value(v, &value)) {
                values.push(value.into_owned());
            }
        }
        values.sort_by_cached_key(|v| sort_key(Some(v)));
        values
    }
}
