//! Health check endpoint.
//!
//! Reports liveness plus the hub's change counter, so pollers can tell
//! whether anything was ingested since their last look.

use super::ApiResult;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Current hub revision.
    pub revision: u64,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let revision = state.read()?.revision();
    Ok(Json(HealthResponse {
        status: "healthy",
        service: "otel-inspect-api",
        version: env!("CARGO_PKG_VERSION"),
        revision,
    }))
}
