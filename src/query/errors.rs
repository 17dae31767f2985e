//! Query error types
//!
//! Error codes:
//! - CRM_QUERY_UNSUPPORTED_SHAPE (REJECT)
//! - CRM_QUERY_INVALID (REJECT)
//!
//! Anything wrong with the *data* (missing attributes, mismatched types,
//! empty aggregate groups) is never an error; only requests that cannot be
//! executed at all are rejected.

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected, nothing executed
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// The request cannot be mapped to a condition tree
    UnsupportedQueryShape,
    /// Structurally inconsistent query description
    InvalidQueryDescription,
}

impl QueryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::UnsupportedQueryShape => "CRM_QUERY_UNSUPPORTED_SHAPE",
            QueryErrorCode::InvalidQueryDescription => "CRM_QUERY_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with context
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    /// Attribute involved, if any
    attribute: Option<String>,
}

impl QueryError {
    /// Create an unsupported query shape error
    pub fn unsupported_shape(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::UnsupportedQueryShape,
            message: reason.into(),
            attribute: None,
        }
    }

    /// Create an invalid query description error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::InvalidQueryDescription,
            message: reason.into(),
            attribute: None,
        }
    }

    /// Create an invalid query description error tied to one attribute
    pub fn invalid_attribute(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self {
            code: QueryErrorCode::InvalidQueryDescription,
            message: format!("Attribute '{}': {}", attribute, reason.into()),
            attribute: Some(attribute),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attribute name if applicable
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
