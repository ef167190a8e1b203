//! Global fuzzy filter and per-column filters
//!
//! The global filter scores each row's search text against the query with
//! Jaro-Winkler similarity, token by token. Every query token must find a
//! sufficiently similar token in the row for the row to be kept. Very short
//! query tokens only match as substrings, since similarity scores between two
//! or three character strings are too noisy to be useful.

use std::collections::BTreeMap;

use atrium_common::config::DEFAULT_FUZZY_THRESHOLD;
use atrium_common::{FieldValue, Row};
use rapidfuzz::distance::jaro_winkler;

use crate::sort::{sort_key, SortKey};

/// Query tokens shorter than this only match as substrings
pub const MIN_FUZZY_TOKEN_LEN: usize = 4;

/// Lowercase alphanumeric tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Scores free text against a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl FuzzyMatcher {
    /// Create a matcher; the threshold is clamped to `0.0..=1.0`
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_FUZZY_THRESHOLD
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score of `haystack` for `query`, from 0.0 (no match) to 1.0 (every
    /// query token appears verbatim).
    ///
    /// An empty query scores 1.0 against anything.
    pub fn score(&self, query: &str, haystack: &str) -> f64 {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return 1.0;
        }
        let hay_tokens = tokenize(haystack);
        if hay_tokens.is_empty() {
            return 0.0;
        }
        score_tokens(&query_tokens, &hay_tokens)
    }

    pub fn matches(&self, query: &str, haystack: &str) -> bool {
        self.score(query, haystack) >= self.threshold
    }
}

fn score_tokens(query_tokens: &[String], hay_tokens: &[String]) -> f64 {
    query_tokens
        .iter()
        .map(|q| {
            hay_tokens
                .iter()
                .map(|h| token_score(q, h))
                .fold(0.0_f64, f64::max)
        })
        .fold(1.0_f64, f64::min)
}

fn token_score(query: &str, candidate: &str) -> f64 {
    if candidate.contains(query) {
        return 1.0;
    }
    if query.chars().count() < MIN_FUZZY_TOKEN_LEN {
        return 0.0;
    }
    jaro_winkler::similarity(query.chars(), candidate.chars())
}

/// Keep the rows whose search text passes the matcher's threshold.
///
/// A blank query keeps every row; a query nothing matches yields an empty
/// collection.
pub fn apply_global_filter<'a, R: Row>(
    rows: Vec<&'a R>,
    query: &str,
    matcher: &FuzzyMatcher,
) -> Vec<&'a R> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            let hay_tokens = tokenize(&row.search_text());
            !hay_tokens.is_empty() && score_tokens(&query_tokens, &hay_tokens) >= matcher.threshold
        })
        .collect()
}

/// Equality used by column filters and facets.
///
/// Plain text compares exactly, so `"free"` and `"FREE"` are distinct values.
/// Numbers, numeric text, timestamps and date-like text compare by what they
/// denote, so `"12"` equals `12`.
pub fn same_filter_value(a: &FieldValue, b: &FieldValue) -> bool {
    match (sort_key(Some(a)), sort_key(Some(b))) {
        (SortKey::Text(_), SortKey::Text(_)) => a == b,
        (ka, kb) => ka == kb,
    }
}

/// Whether `value` is a member of `accepted`
pub fn value_accepted(value: Option<&FieldValue>, accepted: &[FieldValue]) -> bool {
    let Some(value) = value else {
        return false;
    };
    accepted
        .iter()
        .any(|candidate| same_filter_value(candidate, value))
}

/// Keep the rows that satisfy every column filter
pub fn apply_column_filters<'a, R: Row>(
    rows: Vec<&'a R>,
    filters: &BTreeMap<String, Vec<FieldValue>>,
) -> Vec<&'a R> {
    if filters.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            filters
                .iter()
                .all(|(field, accepted)| value_accepted(row.value(field).as_deref(), accepted))
        })
        .collect()
}
