//! Collection view engine
//!
//! Turns a snapshot of rows plus a per-screen [`ViewState`] into the visible
//! page of a list screen:
//! - fuzzy global search and per-column value filters
//! - stable, type-aware multi-key sorting
//! - pagination with page-index clamping
//! - row selection that survives re-sorting and re-filtering
//! - empty-state classification

pub mod empty_state;
pub mod engine;
pub mod filter;
pub mod paginate;
pub mod sort;
pub mod state;

#[cfg(test)]
mod test_support;

use atrium_common::Config;

pub use empty_state::EmptyState;
pub use engine::{CollectionView, LoadPhase, ViewModel};
pub use filter::{apply_column_filters, apply_global_filter, FuzzyMatcher};
pub use paginate::{page_window, paginate, PageWindow};
pub use sort::{apply_sort, sort_key, SortKey};
pub use state::{SortDirection, SortRule, ViewState};

/// Defaults applied to every newly mounted collection view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub page_size: usize,
    pub fuzzy_threshold: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ViewConfig {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.default_page_size,
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }
}
