//! crmsim - An in-memory CRM record store with a retrieve-multiple query engine
//!
//! Executes query expressions against borrowed record snapshots with the
//! paging, distinct and aggregation semantics of the hosted service.

pub mod config;
pub mod executor;
pub mod metadata;
pub mod observability;
pub mod query;
pub mod record;

pub use config::{ConfigError, EngineConfig, DEFAULT_MAX_RETRIEVE_COUNT};
pub use executor::{execute, EntityCollection, QueryExecutor};
pub use metadata::{InMemoryCatalog, MetadataCatalog};
pub use query::{QueryError, QueryErrorCode, QueryExpression, QueryRequest, QueryResult};
pub use record::{AttributeValue, Record};
