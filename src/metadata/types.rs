//! Entity and attribute metadata
//!
//! The engine only reads metadata: attribute types, date behaviour and
//! option labels. Hosts build it with ordinary setters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Boolean,
    Integer,
    Double,
    Decimal,
    Money,
    String,
    DateTime,
    Uniqueidentifier,
    Picklist,
    Lookup,
}

/// How date/time values of an attribute are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateBehavior {
    UserLocal,
    /// Only the date part is meaningful; time is midnight
    DateOnly,
    TimeZoneIndependent,
}

/// One option of a picklist attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMetadata {
    pub value: i32,
    pub label: String,
}

/// Attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub logical_name: String,
    pub attribute_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_behavior: Option<DateBehavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionMetadata>,
}

impl AttributeMetadata {
    pub fn new(logical_name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            logical_name: logical_name.into(),
            attribute_type,
            date_behavior: None,
            options: Vec::new(),
        }
    }

    /// Create a date/time attribute with the given behaviour
    pub fn datetime(logical_name: impl Into<String>, behavior: DateBehavior) -> Self {
        Self {
            date_behavior: Some(behavior),
            ..Self::new(logical_name, AttributeType::DateTime)
        }
    }

    /// Create a picklist attribute with its options
    pub fn picklist<I, S>(logical_name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        Self {
            options: options
                .into_iter()
                .map(|(value, label)| OptionMetadata {
                    value,
                    label: label.into(),
                })
                .collect(),
            ..Self::new(logical_name, AttributeType::Picklist)
        }
    }

    /// Returns the label of option `value`, if defined
    pub fn option_label(&self, value: i32) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

/// Entity definition: logical name plus attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub logical_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeMetadata>,
}

impl EntityMetadata {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds or replaces one attribute, keyed by its logical name
    pub fn set_attribute(&mut self, attribute: AttributeMetadata) {
        self.attributes
            .insert(attribute.logical_name.clone(), attribute);
    }

    /// Replaces the whole attribute collection
    pub fn set_attributes(&mut self, attributes: impl IntoIterator<Item = AttributeMetadata>) {
        self.attributes = attributes
            .into_iter()
            .map(|a| (a.logical_name.clone(), a))
            .collect();
    }

    /// Builder-style variant of [`set_attribute`](Self::set_attribute)
    pub fn with_attribute(mut self, attribute: AttributeMetadata) -> Self {
        self.set_attribute(attribute);
        self
    }

    pub fn attribute(&self, logical_name: &str) -> Option<&AttributeMetadata> {
        self.attributes.get(logical_name)
    }
}
