//! Metric ingestion, listing and projection endpoints.

use super::ingest::{batch, ingest_records, IngestSummary};
use super::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{Metric, MetricDto, MetricType};
use shared::projection::{
    chart_data, relevant_metrics, table_data, ChartData, MetricTableRow, SeriesSelector, TimeRange,
};

/// One series in the metric list.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Series key.
    pub key: String,
    /// Metric name.
    pub name: String,
    /// Latest description.
    pub description: String,
    /// Unit.
    pub unit: String,
    /// `Gauge`, `Sum` or `Histogram`.
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Resource key.
    pub resource_key: String,
    /// Resource label.
    pub resource: String,
    /// Retained points.
    pub data_points: usize,
}

impl From<&Metric> for MetricSummary {
    fn from(metric: &Metric) -> Self {
        Self {
            key: metric.key.clone(),
            name: metric.name.clone(),
            description: metric.description.clone(),
            unit: metric.unit.clone(),
            metric_type: metric.metric_type(),
            resource_key: metric.resource.key().to_string(),
            resource: metric.resource.label(),
            data_points: metric.data_points.len(),
        }
    }
}

/// Metric list.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricListResponse {
    /// Number of series.
    pub total_count: usize,
    /// Series in arrival order.
    pub metrics: Vec<MetricSummary>,
}

/// Query parameters of the chart and table projections.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectionParams {
    /// Metric name.
    pub name: String,
    /// Unit; empty when omitted.
    #[serde(default)]
    pub unit: String,
    /// `gauge`, `sum` or `histogram` (case-insensitive).
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Only series of this resource key.
    pub resource: Option<String>,
    /// Inclusive window start, nanoseconds since epoch.
    pub start_ns: Option<i64>,
    /// Inclusive window end, nanoseconds since epoch.
    pub end_ns: Option<i64>,
}

impl ProjectionParams {
    fn selector(&self) -> ApiResult<SeriesSelector> {
        let metric_type: MetricType = self
            .metric_type
            .parse()
            .map_err(|e: String| ApiError::bad_request("invalid_type", e))?;
        Ok(SeriesSelector::new(&self.name, &self.unit, metric_type))
    }

    fn range(&self) -> Option<TimeRange> {
        if self.start_ns.is_none() && self.end_ns.is_none() {
            return None;
        }
        Some(TimeRange {
            start_ns: self.start_ns,
            end_ns: self.end_ns,
        })
    }
}

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/metrics", post(ingest_metrics).get(list_metrics))
        .route("/api/v1/metrics/chart", get(metric_chart))
        .route("/api/v1/metrics/table", get(metric_table))
        .with_state(state)
}

async fn ingest_metrics(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngestSummary>)> {
    let records = batch(payload)?;
    ingest_records(&state, records, |telemetry, record| {
        let dto: MetricDto = serde_json::from_value(record)?;
        Ok(telemetry.add_metric(dto)?)
    })
}

async fn list_metrics(State(state): State<AppState>) -> ApiResult<Json<MetricListResponse>> {
    let telemetry = state.read()?;
    let metrics: Vec<MetricSummary> = telemetry
        .metrics()
        .metrics()
        .iter()
        .map(MetricSummary::from)
        .collect();

    Ok(Json(MetricListResponse {
        total_count: metrics.len(),
        metrics,
    }))
}

async fn metric_chart(
    State(state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> ApiResult<Json<ChartData>> {
    let selector = params.selector()?;
    let telemetry = state.read()?;
    let metrics = telemetry.metrics().metrics();
    ensure_known(&selector, metrics)?;

    Ok(Json(chart_data(
        &selector,
        metrics,
        params.resource.as_deref(),
        params.range(),
    )))
}

async fn metric_table(
    State(state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> ApiResult<Json<Vec<MetricTableRow>>> {
    let selector = params.selector()?;
    let telemetry = state.read()?;
    let metrics = telemetry.metrics().metrics();
    ensure_known(&selector, metrics)?;

    Ok(Json(table_data(
        &selector,
        metrics,
        params.resource.as_deref(),
        params.range(),
    )))
}

/// 404 unless some series carries the selector's identity. A known series
/// with no points in the window is an empty projection, not an error.
fn ensure_known(selector: &SeriesSelector, metrics: &[Metric]) -> ApiResult<()> {
    if relevant_metrics(selector, metrics, None).is_empty() {
        return Err(ApiError::not_found(format!(
            "No {} series named '{}' with unit '{}'",
            selector.metric_type, selector.name, selector.unit
        )));
    }
    Ok(())
}
