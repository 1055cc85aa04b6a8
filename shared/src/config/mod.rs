//! Configuration module for OTel Inspect.
//!
//! This module contains the tunables of the ingestion core.

pub mod retention;

pub use retention::{ConfigError, RetentionConfig, MAX_DATA_POINTS_ENV};
