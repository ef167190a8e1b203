//! Per-screen view configuration
//!
//! A [`ViewState`] is created when a screen mounts and dropped when it
//! unmounts. It is never persisted.

use std::collections::{BTreeMap, BTreeSet};

use atrium_common::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use atrium_common::FieldValue;
use serde::{Deserialize, Serialize};

use crate::filter::same_filter_value;

/// Sort direction of a single sort rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One `(field, direction)` sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    pub field: String,
    pub direction: SortDirection,
}

impl SortRule {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Sort, filter, pagination and selection configuration of one screen
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    sort_rules: Vec<SortRule>,
    column_filters: BTreeMap<String, Vec<FieldValue>>,
    global_query: String,
    page_index: usize,
    page_size: usize,
    selected_ids: BTreeSet<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    /// Create an empty view state; `page_size` is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(page_size: usize) -> Self {
        Self {
            sort_rules: Vec::new(),
            column_filters: BTreeMap::new(),
            global_query: String::new(),
            page_index: 0,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            selected_ids: BTreeSet::new(),
        }
    }

    pub fn sort_rules(&self) -> &[SortRule] {
        &self.sort_rules
    }

    pub fn column_filters(&self) -> &BTreeMap<String, Vec<FieldValue>> {
        &self.column_filters
    }

    pub fn global_query(&self) -> &str {
        &self.global_query
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }

    /// Whether a global query or any column filter narrows the collection
    pub fn has_active_filters(&self) -> bool {
        !self.global_query.trim().is_empty() || !self.column_filters.is_empty()
    }

    /// Replace the sort rules. A field listed twice keeps its first rule.
    pub fn set_sort(&mut self, rules: Vec<SortRule>) {
        let mut seen = BTreeSet::new();
        self.sort_rules = rules
            .into_iter()
            .filter(|rule| seen.insert(rule.field.clone()))
            .collect();
    }

    /// Header-click behaviour: a field cycles ascending, descending, unsorted.
    ///
    /// A newly sorted field becomes the primary key.
    pub fn toggle_sort(&mut self, field: &str) {
        match self.sort_rules.iter().position(|r| r.field == field) {
            Some(pos) => match self.sort_rules[pos].direction {
                SortDirection::Ascending => {
                    self.sort_rules[pos].direction = SortDirection::Descending;
                }
                SortDirection::Descending => {
                    self.sort_rules.remove(pos);
                }
            },
            None => self.sort_rules.insert(0, SortRule::ascending(field)),
        }
    }

    /// Set the accepted values of one column. An empty set removes the filter.
    pub fn set_column_filter(&mut self, field: impl Into<String>, accepted: Vec<FieldValue>) {
        let field = field.into();
        let mut deduped: Vec<FieldValue> = Vec::with_capacity(accepted.len());
        for value in accepted {
            if !deduped.iter().any(|v| same_filter_value(v, &value)) {
                deduped.push(value);
            }
        }

        if deduped.is_empty() {
            self.column_filters.remove(&field);
        } else {
            self.column_filters.insert(field, deduped);
        }
    }

    pub fn clear_column_filter(&mut self, field: &str) {
        self.column_filters.remove(field);
    }

    pub fn set_global_query(&mut self, query: impl Into<String>) {
        self.global_query = query.into();
    }

    /// Drop the global query and every column filter
    pub fn clear_filters(&mut self) {
        self.global_query.clear();
        self.column_filters.clear();
    }

    /// Request a page; the engine clamps it against the filtered count
    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Change the page size and return to the first page
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self.page_index = 0;
    }

    pub(crate) fn clamp_page(&mut self, page_count: usize) {
        if page_count == 0 {
            self.page_index = 0;
        } else if self.page_index >= page_count {
            self.page_index = page_count - 1;
        }
    }

    /// Flip the selection of `id`; returns whether it is selected afterwards
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.selected_ids.remove(id) {
            false
        } else {
            self.selected_ids.insert(id.to_string());
            true
        }
    }

    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_ids.extend(ids.into_iter().map(Into::into));
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
    }

    /// Keep only the selected ids accepted by `keep`
    pub fn retain_selection(&mut self, keep: impl Fn(&str) -> bool) {
        self.selected_ids.retain(|id| keep(id));
    }
}
