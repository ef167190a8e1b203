//! Type-aware, stable multi-key sorting
//!
//! Every field value is mapped to a [`SortKey`] first. Keys form a total
//! order, so the comparator can never violate the contract of `sort_by`
//! whatever the rows contain:
//!
//! - missing values (and NaN) sort first
//! - booleans, then numbers (including numeric text), then timestamps
//!   (including date-like text), then remaining text
//! - text compares case-insensitively

use std::cmp::Ordering;

use atrium_common::{FieldValue, Row};
use chrono::{DateTime, Utc};

use crate::state::{SortDirection, SortRule};

/// Normalized, totally ordered view of a field value
#[derive(Debug, Clone)]
pub enum SortKey {
    Missing,
    Bool(bool),
    Number(f64),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Bool(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Time(_) => 3,
            SortKey::Text(_) => 4,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Map a field value to its sort key
pub fn sort_key(value: Option<&FieldValue>) -> SortKey {
    let Some(value) = value else {
        return SortKey::Missing;
    };

    match value {
        FieldValue::Bool(b) => SortKey::Bool(*b),
        FieldValue::Number(n) if n.is_nan() => SortKey::Missing,
        FieldValue::Number(n) => SortKey::Number(*n),
        FieldValue::Timestamp(ts) => SortKey::Time(*ts),
        FieldValue::Text(s) => {
            if let Some(n) = value.as_number() {
                SortKey::Number(n)
            } else if let Some(ts) = value.as_timestamp() {
                SortKey::Time(ts)
            } else {
                SortKey::Text(s.to_lowercase())
            }
        }
    }
}

/// Sort rows by the given rules. The sort is stable: rows that compare equal
/// on every rule keep their input order.
pub fn apply_sort<'a, R: Row>(rows: Vec<&'a R>, rules: &[SortRule]) -> Vec<&'a R> {
    if rules.is_empty() || rows.len() < 2 {
        return rows;
    }

    // Decorate once so each comparison is a cheap key comparison.
    let mut decorated: Vec<(Vec<SortKey>, &'a R)> = rows
        .into_iter()
        .map(|row| {
            let keys = rules
                .iter()
                .map(|rule| sort_key(row.value(&rule.field).as_deref()))
                .collect();
            (keys, row)
        })
        .collect();

    decorated.sort_by(|(a, _), (b, _)| {
        for (idx, rule) in rules.iter().enumerate() {
            let ordering = match rule.direction {
                SortDirection::Ascending => a[idx].cmp(&b[idx]),
                SortDirection::Descending => b[idx].cmp(&a[idx]),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    decorated.into_iter().map(|(_, row)| row).collect()
}
