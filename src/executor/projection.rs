//! Column projection
//!
//! Copies the requested attributes of a record. Null values are dropped so
//! that a null and a missing attribute look the same to the caller.

use crate::query::ColumnSet;
use crate::record::Record;

/// Returns a copy of `record` restricted to `column_set`.
///
/// Formatted values supplied with the source record survive for every kept
/// attribute.
pub fn project(record: &Record, column_set: &ColumnSet) -> Record {
    let mut projected = Record {
        logical_name: record.logical_name.clone(),
        id: record.id,
        attributes: Default::default(),
        formatted_values: Default::default(),
        origin: record.origin,
    };

    for (key, value) in &record.attributes {
        if value.is_null() || !column_set.includes(key) {
            continue;
        }
        projected.attributes.insert(key.clone(), value.clone());
        if let Some(formatted) = record.formatted_values.get(key) {
            projected
                .formatted_values
                .insert(key.clone(), formatted.clone());
        }
    }

    projected
}
