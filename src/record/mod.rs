//! Record data model
//!
//! Records are untyped bags of named, typed values with an identity
//! (logical name + optional id) and a map of formatted display strings.

mod entity;
mod value;

pub use entity::{Record, RecordOrigin};
pub use value::{AliasedValue, AttributeValue, EntityReference, Money, Numeric, OptionSetValue};
