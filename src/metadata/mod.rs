//! Metadata catalog
//!
//! Attribute types, date behaviours and option labels per entity. The
//! executor reads it for label resolution and post-query transforms; it
//! never writes to it.

mod catalog;
mod types;

pub use catalog::{InMemoryCatalog, MetadataCatalog};
pub use types::{AttributeMetadata, AttributeType, DateBehavior, EntityMetadata, OptionMetadata};
