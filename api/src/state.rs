//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::routes::{ApiError, ApiResult};
use shared::config::RetentionConfig;
use shared::ingest::Telemetry;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Application state shared across all request handlers.
///
/// Holds the one ingestion hub of the process. Writers take the lock for a
/// whole record, so readers never see a half-linked span.
#[derive(Clone, Default)]
pub struct AppState {
    telemetry: Arc<RwLock<Telemetry>>,
}

impl AppState {
    /// Creates a new application state with an empty hub.
    #[must_use]
    pub fn new(retention: &RetentionConfig) -> Self {
        Self {
            telemetry: Arc::new(RwLock::new(Telemetry::new(retention))),
        }
    }

    /// Locks the hub for reading.
    ///
    /// # Errors
    ///
    /// Returns a `lock_error` response if the lock is poisoned.
    pub fn read(&self) -> ApiResult<RwLockReadGuard<'_, Telemetry>> {
        self.telemetry.read().map_err(|_| ApiError::lock())
    }

    /// Locks the hub for writing.
    ///
    /// # Errors
    ///
    /// Returns a `lock_error` response if the lock is poisoned.
    pub fn write(&self) -> ApiResult<RwLockWriteGuard<'_, Telemetry>> {
        self.telemetry.write().map_err(|_| ApiError::lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAN: &str = r#"{"topic": "traces", "payload": {"name": "op", "trace_id": "t", "span_id": "s", "start_time_unix_nano": "1", "end_time_unix_nano": "2"}}"#;

    #[test]
    fn test_app_state_is_clone() {
        let state = AppState::default();
        let state2 = state.clone();

        state.write().unwrap().ingest_json(SPAN).unwrap();

        assert_eq!(state2.read().unwrap().stats().spans, 1);
    }

    #[test]
    fn test_app_state_uses_retention() {
        let state = AppState::new(&RetentionConfig::new(7));
        assert_eq!(state.read().unwrap().metrics().max_data_points(), 7);
    }
}
