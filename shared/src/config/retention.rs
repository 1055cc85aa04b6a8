//! Retention configuration for metric series.
//!
//! Bounds the number of points each metric series keeps in memory. Spans,
//! logs and resources are kept for the lifetime of the process.

use crate::storage::metric_store::DEFAULT_MAX_DATA_POINTS;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Environment variable overriding [`RetentionConfig::max_data_points`].
pub const MAX_DATA_POINTS_ENV: &str = "OTEL_INSPECT_MAX_DATA_POINTS";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed.
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// A parsed value is outside its allowed range.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Tunables of the ingestion core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RetentionConfig {
    /// Points retained per metric series; older points are evicted first.
    #[validate(range(min = 1, max = 1_000_000, message = "max_data_points must be between 1 and 1000000"))]
    pub max_data_points: usize,
}

impl RetentionConfig {
    /// Creates a configuration with the given per-series point limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::RetentionConfig;
    ///
    /// let config = RetentionConfig::new(250);
    /// assert_eq!(config.max_data_points, 250);
    /// assert!(config.validate_config().is_ok());
    /// ```
    #[must_use]
    pub fn new(max_data_points: usize) -> Self {
        Self { max_data_points }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable or out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_data_points = match lookup(MAX_DATA_POINTS_ENV) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: MAX_DATA_POINTS_ENV,
                    value,
                })?,
            None => DEFAULT_MAX_DATA_POINTS,
        };

        let config = Self { max_data_points };
        config.validate_config()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_data_points` is zero or above one million.
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }
}

impl Default for RetentionConfig {
    /// Keeps 1000 points per series.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DATA_POINTS)
    }
}
