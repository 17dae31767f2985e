//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Counters for executed and rejected queries
//!
//! Observability is read-only: it never changes what a query returns.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
