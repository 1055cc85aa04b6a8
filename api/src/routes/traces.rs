//! Trace ingestion and query endpoints.

use super::ingest::{batch, ingest_records, IngestSummary};
use super::{parse_filter, to_json, ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{Span, SpanDto};
use shared::projection::TraceView;
use shared::storage::SpanNode;

/// Query parameters for the root list.
#[derive(Debug, Default, Deserialize)]
pub struct TraceQueryParams {
    /// Only roots of this trace.
    pub trace_id: Option<String>,
    /// Only roots reported by this resource key.
    pub resource: Option<String>,
    /// `key=value` filter over the root spans.
    pub filter: Option<String>,
}

/// Nested root list.
#[derive(Debug, Serialize)]
pub struct TraceQueryResponse<'a> {
    /// Number of matching roots.
    pub total_count: usize,
    /// Matching roots with their subtrees.
    pub roots: Vec<SpanNode<'a>>,
}

/// Query parameters for a trace timeline.
#[derive(Debug, Default, Deserialize)]
pub struct TraceViewParams {
    /// Interleave correlated logs.
    #[serde(default)]
    pub logs: bool,
}

/// Creates the traces routes.
pub fn traces_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/traces", post(ingest_spans).get(query_traces))
        .route("/api/v1/traces/{trace_id}", get(get_trace))
        .with_state(state)
}

async fn ingest_spans(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngestSummary>)> {
    let records = batch(payload)?;
    ingest_records(&state, records, |telemetry, record| {
        let dto: SpanDto = serde_json::from_value(record)?;
        Ok(telemetry.add_span(dto)?)
    })
}

async fn query_traces(
    State(state): State<AppState>,
    Query(params): Query<TraceQueryParams>,
) -> ApiResult<Json<Value>> {
    let filters = parse_filter(params.filter.as_deref())?;
    let telemetry = state.read()?;
    let traces = telemetry.traces();

    let roots: Vec<&Span> = match params.trace_id.as_deref() {
        Some(trace_id) => traces.roots_for_trace(trace_id),
        None => traces.roots(),
    }
    .into_iter()
    .filter(|span| {
        params
            .resource
            .as_deref()
            .is_none_or(|key| span.resource.key() == key)
    })
    .filter(|span| filters.matches(span))
    .collect();

    let response = TraceQueryResponse {
        total_count: roots.len(),
        roots: traces.trees(&roots),
    };
    to_json(&response).map(Json)
}

async fn get_trace(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
    Query(params): Query<TraceViewParams>,
) -> ApiResult<Json<TraceView>> {
    let view = state.read()?.trace_view(&trace_id, params.logs);

    if view.is_empty() {
        return Err(ApiError::not_found(format!("Trace {trace_id} not found")));
    }
    Ok(Json(view))
}
