//! API route definitions.
//!
//! This module organizes all HTTP routes for the OTel Inspect API server.

mod error;
mod health;
mod ingest;
mod logs;
mod metrics;
mod resources;
mod traces;

pub use error::{to_json, ApiError, ApiResult};
pub use health::health_routes;
pub use ingest::{ingest_routes, IngestSummary, RejectedRecord};
pub use logs::logs_routes;
pub use metrics::metrics_routes;
pub use resources::resources_routes;
pub use traces::traces_routes;

use shared::filter::FilterSet;

/// Parses an optional `key=value` query filter.
///
/// # Errors
///
/// Returns `400 invalid_filter` if the value has no `=` or an empty key.
pub(crate) fn parse_filter(filter: Option<&str>) -> ApiResult<FilterSet> {
    let mut filters = FilterSet::new();
    if let Some(filter) = filter {
        match filter.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => filters.add(key.trim(), value),
            _ => {
                return Err(ApiError::bad_request(
                    "invalid_filter",
                    format!("Expected key=value, got '{filter}'"),
                ))
            }
        }
    }
    Ok(filters)
}
