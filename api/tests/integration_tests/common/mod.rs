//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup and HTTP request helpers.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};

/// Creates a test router over an empty ingestion hub.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::default();
    let router = create_router(state.clone());
    (router, state)
}

/// Helper to make a POST request with JSON body.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to POST to
/// * `body` - The JSON body to send
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to GET from
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// A span with nanosecond timestamps in the wire format.
pub fn span(trace_id: &str, span_id: &str, parent: Option<&str>, start_ns: i64, end_ns: i64) -> Value {
    json!({
        "name": format!("op-{span_id}"),
        "scope": "integration",
        "trace_id": trace_id,
        "span_id": span_id,
        "parent_span_id": parent.unwrap_or(""),
        "start_time_unix_nano": start_ns.to_string(),
        "end_time_unix_nano": end_ns.to_string(),
        "kind": "SPAN_KIND_SERVER",
        "status": {"code": "STATUS_CODE_OK", "message": ""},
        "resource": {
            "service_name": "checkout",
            "service_version": "1.2.0",
            "service_instance_id": "4f1c2b9e-77aa"
        },
        "tags": {"http.method": "GET"}
    })
}

/// A log record correlated with `span_id` of trace `t1` when given.
pub fn log(time_ns: i64, severity: &str, message: &str, span_id: Option<&str>) -> Value {
    json!({
        "time_unix_nano": time_ns.to_string(),
        "severity": severity,
        "message": message,
        "trace_id": span_id.map(|_| "t1"),
        "span_id": span_id,
        "resource": {"service_name": "checkout", "service_instance_id": "4f1c2b9e-77aa"}
    })
}

/// A gauge sample for `service` with `(time_ns, value)` points.
pub fn gauge(name: &str, service: &str, points: &[(i64, f64)]) -> Value {
    let data_points: Vec<Value> = points
        .iter()
        .map(|(ns, v)| json!({"time_unix_nano": ns.to_string(), "value": v}))
        .collect();
    json!({
        "name": name,
        "unit": "ms",
        "resource": {"service_name": service},
        "data": {"t": "Gauge", "data_points": data_points}
    })
}
