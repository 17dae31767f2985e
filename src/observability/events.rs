//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events of the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Engine configuration loaded
    ConfigLoaded,
    /// Query received and translated
    QueryBegin,
    /// Query executed successfully
    QueryComplete,
    /// Query rejected before execution
    QueryRejected,
    /// Aggregation produced its groups
    AggregateComplete,
    /// Distinct reduction dropped duplicates
    DistinctReduced,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryBegin => "QUERY_BEGIN",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::AggregateComplete => "AGGREGATE_COMPLETE",
            Event::DistinctReduced => "DISTINCT_REDUCED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryRejected => Severity::Warn,
            Event::ConfigLoaded | Event::QueryComplete => Severity::Info,
            Event::QueryBegin | Event::AggregateComplete | Event::DistinctReduced => {
                Severity::Trace
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
