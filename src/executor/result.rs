//! Result package of a retrieve-multiple execution

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// One page of query results in the service's response shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityCollection {
    /// Target entity of the query
    pub entity_name: String,
    /// Records on this page, in result order
    pub entities: Vec<Record>,
    /// Whether records exist past this page
    pub more_records: bool,
    /// Set only when more records exist
    pub paging_cookie: Option<String>,
    /// Size of the full result set, or -1 when not requested
    pub total_record_count: i64,
    pub total_record_count_limit_exceeded: bool,
}

impl EntityCollection {
    /// Creates an empty page for `entity_name`
    pub fn empty(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            entities: Vec::new(),
            more_records: false,
            paging_cookie: None,
            total_record_count: -1,
            total_record_count_limit_exceeded: false,
        }
    }

    /// Returns true if the page has no records
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of records on the page
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns an iterator over the records
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entities.iter()
    }

    /// Serializes the page in wire shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl IntoIterator for EntityCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}
