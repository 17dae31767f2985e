//! Post-query record transforms
//!
//! Transforms run on the cloned records of the returned page, after
//! annotation. The executor owns an ordered list of them.

use chrono::{DateTime, Utc};

use crate::metadata::{DateBehavior, MetadataCatalog};
use crate::record::{AttributeValue, Record};

/// A rewrite applied to every returned record
pub trait RecordTransform: Send + Sync {
    /// Name used in log fields
    fn name(&self) -> &'static str;

    fn apply(&self, record: &mut Record, catalog: &dyn MetadataCatalog);
}

/// Truncates date-only attributes to midnight UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct DateBehaviorTransform;

impl DateBehaviorTransform {
    fn is_date_only(catalog: &dyn MetadataCatalog, entity: &str, attribute: &str) -> bool {
        catalog
            .attribute(entity, attribute)
            .and_then(|meta| meta.date_behavior)
            == Some(DateBehavior::DateOnly)
    }

    fn truncate(value: &mut AttributeValue, date_only: bool) {
        if let AttributeValue::DateTime(dt) = value {
            if date_only {
                *dt = midnight(*dt);
            }
        }
    }
}

impl RecordTransform for DateBehaviorTransform {
    fn name(&self) -> &'static str {
        "date_behavior"
    }

    fn apply(&self, record: &mut Record, catalog: &dyn MetadataCatalog) {
        let entity = record.logical_name.clone();

        for (key, value) in record.attributes.iter_mut() {
            match value {
                AttributeValue::Aliased(aliased) => {
                    let source = aliased.entity_logical_name.as_deref().unwrap_or(&entity);
                    let date_only =
                        Self::is_date_only(catalog, source, &aliased.attribute_logical_name);
                    Self::truncate(&mut aliased.value, date_only);
                }
                other => {
                    let date_only = Self::is_date_only(catalog, &entity, key);
                    Self::truncate(other, date_only);
                }
            }
        }
    }
}

fn midnight(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(dt)
}
