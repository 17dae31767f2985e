//! Record (entity instance) representation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value::{AttributeValue, EntityReference};

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordOrigin {
    /// Read from the record store
    #[default]
    Stored,
    /// Synthesized by aggregation; carries no identity
    Aggregate,
}

/// A single stored record: identity, typed attributes and formatted values.
///
/// Attribute order is irrelevant; the map is kept sorted so that every
/// rendering of a record is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub logical_name: String,
    pub id: Option<Uuid>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub formatted_values: BTreeMap<String, String>,
    #[serde(default, skip_serializing)]
    pub origin: RecordOrigin,
}

impl Record {
    /// Creates a record with no identity yet
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            id: None,
            attributes: BTreeMap::new(),
            formatted_values: BTreeMap::new(),
            origin: RecordOrigin::Stored,
        }
    }

    /// Creates a record with the given identity
    pub fn with_id(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::new(logical_name)
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an attribute, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Returns a non-null attribute value.
    ///
    /// A stored `Null` is reported as absent.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// True when the record carries a non-null value for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The record's id, treating the nil GUID as no identity
    pub fn identity(&self) -> Option<Uuid> {
        self.id.filter(|id| !id.is_nil())
    }

    pub fn has_identity(&self) -> bool {
        self.identity().is_some()
    }

    /// Returns the id used for rendering, nil when the record has none
    pub fn id_or_nil(&self) -> Uuid {
        self.identity().unwrap_or_else(Uuid::nil)
    }

    /// Builds a lookup pointing at this record
    pub fn to_reference(&self) -> EntityReference {
        EntityReference::new(self.logical_name.clone(), self.id_or_nil())
    }

    /// Returns the formatted value for `key`, if any
    pub fn formatted_value(&self, key: &str) -> Option<&str> {
        self.formatted_values.get(key).map(String::as_str)
    }

    /// True when the record was synthesized by aggregation
    pub fn is_aggregate(&self) -> bool {
        self.origin == RecordOrigin::Aggregate
    }
}
