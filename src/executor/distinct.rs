//! Distinct reduction
//!
//! Order preserving, first occurrence wins. Only records of the same
//! logical name are ever compared:
//! - both records have an identity: duplicates iff the ids are equal
//! - otherwise: duplicates iff their sorted, projected attribute sets are
//!   structurally equal
//!
//! Pairwise comparison makes this quadratic in the number of records.

use crate::record::{AttributeValue, Record};

/// Removes duplicate records
pub struct DistinctReducer;

impl DistinctReducer {
    /// Reduces `records` to distinct entries, keeping the first of each
    pub fn reduce(records: Vec<Record>) -> Vec<Record> {
        let mut output: Vec<Record> = Vec::with_capacity(records.len());

        for record in records {
            if !output.iter().any(|kept| Self::is_duplicate(kept, &record)) {
                output.push(record);
            }
        }

        output
    }

    /// True when `a` and `b` represent the same result row
    pub fn is_duplicate(a: &Record, b: &Record) -> bool {
        if a.logical_name != b.logical_name {
            return false;
        }

        match (a.identity(), b.identity()) {
            (Some(x), Some(y)) => x == y,
            _ => Self::content_key(a) == Self::content_key(b),
        }
    }

    /// Attribute set sorted by key with values projected for comparison
    fn content_key(record: &Record) -> Vec<(&str, AttributeValue)> {
        record
            .attributes
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v.distinct_projection()))
            .collect()
    }
}
