//! Read-only metadata catalog handed to the executor

use std::collections::HashMap;

use super::types::{AttributeMetadata, EntityMetadata};

/// Read access to entity metadata
pub trait MetadataCatalog {
    /// Returns the metadata of an entity, if registered
    fn entity(&self, logical_name: &str) -> Option<&EntityMetadata>;

    /// Returns the metadata of one attribute, if registered
    fn attribute(&self, entity: &str, attribute: &str) -> Option<&AttributeMetadata> {
        self.entity(entity).and_then(|e| e.attribute(attribute))
    }
}

/// Catalog backed by a hash map; empty catalogs are valid everywhere
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entities: HashMap<String, EntityMetadata>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces an entity definition
    pub fn insert(&mut self, entity: EntityMetadata) {
        self.entities.insert(entity.logical_name.clone(), entity);
    }

    pub fn with_entity(mut self, entity: EntityMetadata) -> Self {
        self.insert(entity);
        self
    }

    /// Mutable access for hosts that adjust metadata after registration
    pub fn entity_mut(&mut self, logical_name: &str) -> Option<&mut EntityMetadata> {
        self.entities.get_mut(logical_name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl MetadataCatalog for InMemoryCatalog {
    fn entity(&self, logical_name: &str) -> Option<&EntityMetadata> {
        self.entities.get(logical_name)
    }
}
