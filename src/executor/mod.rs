//! Query Executor subsystem
//!
//! Executes retrieve-multiple requests against an in-memory snapshot of
//! candidate records and produces one deterministic page.
//!
//! # Execution Flow (strict order)
//!
//! 1. Translate and validate the request
//! 2. Filter records by the condition tree
//! 3. Aggregate then sort, or sort then project
//! 4. Reduce to distinct records (if requested)
//! 5. Apply top count
//! 6. Snapshot the total record count (if requested)
//! 7. Select the page window and build the paging cookie
//! 8. Annotate formatted values and run post-query transforms
//!
//! # Invariants
//!
//! - Deterministic execution: same request + same records = same page
//! - Source records are never mutated
//! - Data anomalies (missing or mistyped attributes) are never errors

mod aggregate;
mod distinct;
mod executor;
mod filters;
mod formatter;
mod paging;
mod projection;
mod result;
mod sorter;
mod transform;

pub use aggregate::Aggregator;
pub use distinct::DistinctReducer;
pub use executor::{execute, QueryExecutor};
pub use filters::{CompiledFilter, ConditionEvaluator};
pub use formatter::FormattedValueAnnotator;
pub use paging::{braced_upper, paging_cookie, PageWindow};
pub use projection::project;
pub use result::EntityCollection;
pub use sorter::RecordSorter;
pub use transform::{DateBehaviorTransform, RecordTransform};
