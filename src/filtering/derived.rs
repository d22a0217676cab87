//! In-memory sort pass for derived keys.
//!
//! Derived keys (joined or computed fields like `brandName`) cannot be pushed
//! into the storage query, so they are applied here over the denormalized
//! page. The pass runs on the already-paginated rows only; ordering across
//! pages therefore reflects the native sort, not the derived keys. That scope
//! is intentional and pinned by tests.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::SortField;

/// A comparable view of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// Implemented by denormalized records to expose field values by external id.
/// Returning `None` (unknown field, absent value) makes the key undecidable
/// for that pair of rows.
pub trait SortAccessor {
    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

/// Stable multi-key sort over `rows`. Keys are evaluated in order; the first
/// key with comparable, unequal values on both sides decides. A key missing
/// on either side is skipped rather than sorting absents first or last, and
/// full ties keep their original relative order.
pub fn sort_by_derived_keys<T: SortAccessor>(rows: &mut [T], keys: &[SortField]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for key in keys {
            let (Some(left), Some(right)) = (a.sort_value(&key.id), b.sort_value(&key.id)) else {
                continue;
            };
            let ordering = compare(&left, &right);
            let ordering = if key.desc {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Values of different shapes never decide a key.
fn compare(left: &SortValue, right: &SortValue) -> Ordering {
    match (left, right) {
        (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (SortValue::Number(a), SortValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
        (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
