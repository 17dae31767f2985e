//! Engine configuration
//!
//! Supplied by the hosting context. Every field has a default, so an empty
//! JSON object is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Page size used when a query does not set one
pub const DEFAULT_MAX_RETRIEVE_COUNT: u32 = 5000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration of the query engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default page size when a query leaves it at 0
    pub max_retrieve_count: u32,
    /// Whether date-only attributes are truncated to midnight in results
    pub apply_date_behavior: bool,
    /// Minimum severity written by the query logger
    pub log_level: Severity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retrieve_count: DEFAULT_MAX_RETRIEVE_COUNT,
            apply_date_behavior: true,
            log_level: Severity::Warn,
        }
    }
}

impl EngineConfig {
    /// Sets the default page size
    pub fn with_max_retrieve_count(mut self, count: u32) -> Self {
        self.max_retrieve_count = count;
        self
    }

    /// Enables or disables the date behaviour transform
    pub fn with_date_behavior(mut self, enabled: bool) -> Self {
        self.apply_date_behavior = enabled;
        self
    }

    /// Sets the logger threshold
    pub fn with_log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Parses and validates a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retrieve_count == 0 {
            return Err(ConfigError::Invalid(
                "max_retrieve_count must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
