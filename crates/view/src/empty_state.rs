//! Empty-state classification
//!
//! Decides which message a list screen shows. It is always derived from the
//! load phase and the row counts, never stored next to them.

use serde::Serialize;

/// What a list screen currently has to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmptyState {
    /// No data fetched yet
    Loading,
    /// The last fetch failed
    Error,
    /// The collection itself is empty
    EmptyNoData,
    /// Rows exist but none survive the current filters
    EmptyFiltered,
    /// At least one row is visible
    Populated,
}

impl EmptyState {
    /// Classify from `(loading, error, raw count, filtered count)`.
    ///
    /// An empty raw collection is `EmptyNoData` even with filters active;
    /// there is nothing a filter change could reveal.
    pub fn classify(loading: bool, error: bool, raw_count: usize, filtered_count: usize) -> Self {
        if error {
            EmptyState::Error
        } else if loading {
            EmptyState::Loading
        } else if raw_count == 0 {
            EmptyState::EmptyNoData
        } else if filtered_count == 0 {
            EmptyState::EmptyFiltered
        } else {
            EmptyState::Populated
        }
    }

    pub fn has_rows(&self) -> bool {
        matches!(self, EmptyState::Populated)
    }
}
