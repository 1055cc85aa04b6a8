//! Log ingestion and query endpoints.

use super::ingest::{batch, ingest_records, IngestSummary};
use super::{parse_filter, to_json, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{Log, LogDto};

/// Upper bound for `limit`.
pub const MAX_LIMIT: usize = 1000;

/// Query parameters for logs.
#[derive(Debug, Default, Deserialize)]
pub struct LogQueryParams {
    /// Only logs of this resource key.
    pub resource: Option<String>,
    /// Only logs correlated with this trace.
    pub trace_id: Option<String>,
    /// Only logs correlated with this span; requires `trace_id`.
    pub span_id: Option<String>,
    /// `key=value` filter over the logs.
    pub filter: Option<String>,
    /// Maximum number of logs returned (capped at [`MAX_LIMIT`]).
    pub limit: Option<usize>,
}

/// Logs newest first.
#[derive(Debug, Serialize)]
pub struct LogQueryResponse<'a> {
    /// Matching logs before `limit` was applied.
    pub total_count: usize,
    /// Matching logs.
    pub logs: Vec<&'a Log>,
}

/// Creates the logs routes.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/logs", post(ingest_logs).get(query_logs))
        .with_state(state)
}

/// Accepts a single log or a batch; each record is applied on its own.
async fn ingest_logs(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngestSummary>)> {
    let records = batch(payload)?;
    ingest_records(&state, records, |telemetry, record| {
        let dto: LogDto = serde_json::from_value(record)?;
        Ok(telemetry.add_log(dto)?)
    })
}

async fn query_logs(
    State(state): State<AppState>,
    Query(params): Query<LogQueryParams>,
) -> ApiResult<Json<Value>> {
    let filters = parse_filter(params.filter.as_deref())?;
    let telemetry = state.read()?;
    let store = telemetry.logs();

    let candidates = match (params.trace_id.as_deref(), params.span_id.as_deref()) {
        (Some(trace_id), Some(span_id)) => store.by_span(trace_id, span_id),
        (Some(trace_id), None) => store.by_trace(trace_id),
        _ => store.logs().iter().collect(),
    };

    let matching: Vec<&Log> = candidates
        .into_iter()
        .filter(|log| {
            params
                .resource
                .as_deref()
                .is_none_or(|key| log.resource.key() == key)
        })
        .filter(|log| filters.matches(log))
        .collect();

    let total_count = matching.len();
    let limit = params.limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT);
    let response = LogQueryResponse {
        total_count,
        logs: matching.into_iter().take(limit).collect(),
    };
    to_json(&response).map(Json)
}
