//! Query metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, relaxed atomics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated by every execution
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Successful executions
    queries_executed: AtomicU64,
    /// Rejected requests
    queries_rejected: AtomicU64,
    /// Source records examined
    records_scanned: AtomicU64,
    /// Records returned across all pages
    records_returned: AtomicU64,
    /// Executions that requested aggregation
    aggregate_queries: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aggregate_queries(&self) {
        self.aggregate_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_scanned(&self, count: u64) {
        self.records_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_records_returned(&self, count: u64) {
        self.records_returned.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            records_scanned: self.records_scanned.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            aggregate_queries: self.aggregate_queries.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub records_scanned: u64,
    pub records_returned: u64,
    pub aggregate_queries: u64,
}

impl MetricsSnapshot {
    /// Serializes the snapshot as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
