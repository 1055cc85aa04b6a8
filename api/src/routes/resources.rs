//! Resource registry and hub statistics endpoints.

use super::ApiResult;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use shared::ingest::TelemetryStats;
use shared::models::Resource;
use std::collections::HashMap;

/// A registered resource.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Deduplication key, usable as the `resource` query parameter.
    pub key: String,
    /// Short display label.
    pub label: String,
    /// `service.name`.
    pub service_name: String,
    /// `service.version`.
    pub service_version: String,
    /// `service.namespace`.
    pub service_namespace: String,
    /// `service.instance.id`.
    pub service_instance_id: String,
    /// Remaining resource attributes.
    pub attributes: HashMap<String, String>,
}

impl From<&Resource> for ResourceSummary {
    fn from(resource: &Resource) -> Self {
        Self {
            key: resource.key().to_string(),
            label: resource.label(),
            service_name: resource.service_name().to_string(),
            service_version: resource.service_version().to_string(),
            service_namespace: resource.service_namespace().to_string(),
            service_instance_id: resource.service_instance_id().to_string(),
            attributes: resource.attributes().clone(),
        }
    }
}

/// Resource list.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceListResponse {
    /// Number of resources.
    pub total_count: usize,
    /// Resources in first-seen order.
    pub resources: Vec<ResourceSummary>,
}

/// Creates the resource and stats routes.
pub fn resources_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/resources", get(list_resources))
        .route("/api/v1/stats", get(stats))
        .with_state(state)
}

async fn list_resources(State(state): State<AppState>) -> ApiResult<Json<ResourceListResponse>> {
    let telemetry = state.read()?;
    let resources: Vec<ResourceSummary> = telemetry
        .resources()
        .resources()
        .iter()
        .map(ResourceSummary::from)
        .collect();

    Ok(Json(ResourceListResponse {
        total_count: resources.len(),
        resources,
    }))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<TelemetryStats>> {
    let stats = state.read()?.stats();
    Ok(Json(stats))
}
