//! Integration tests for log ingestion and querying.
//!
//! Tests cover:
//! - Single and batch log ingestion
//! - Newest-first ordering regardless of arrival order
//! - Filtering by trace, resource and attribute

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, log, post_json, test_app};

#[tokio::test]
async fn test_ingest_single_and_batch() {
    let (app, _state) = test_app();

    let (status, response) =
        post_json(app.clone(), "/api/v1/logs", log(1_000, "INFO", "one", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 1);

    let batch = json!([
        log(2_000, "WARN", "two", None),
        log(3_000, "ERROR", "three", None),
    ]);
    let (status, response) = post_json(app.clone(), "/api/v1/logs", batch).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 2);

    let (_, response) = get(app, "/api/v1/logs").await;
    assert_eq!(response["total_count"], 3);
}

#[tokio::test]
async fn test_logs_sorted_newest_first() {
    let (app, _state) = test_app();

    for (ns, message) in [(2_000, "b"), (3_000, "c"), (1_000, "a")] {
        post_json(app.clone(), "/api/v1/logs", log(ns, "INFO", message, None)).await;
    }

    let (_, response) = get(app, "/api/v1/logs").await;
    let messages: Vec<&str> = response["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_iso_timestamp_fallback() {
    let (app, _state) = test_app();

    let record = json!({"timestamp": "2024-01-15T10:30:00.123456789Z", "message": "iso"});
    let (status, _) = post_json(app.clone(), "/api/v1/logs", record).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, response) = get(app, "/api/v1/logs").await;
    assert_eq!(response["logs"][0]["time_ns"], 1_705_314_600_123_456_789_i64);
}

#[tokio::test]
async fn test_filter_logs() {
    let (app, _state) = test_app();

    let batch = json!([
        log(1_000, "INFO", "in trace", Some("s1")),
        log(2_000, "ERROR", "outside", None),
        {
            "time_unix_nano": "3000",
            "message": "other service",
            "resource": {"service_name": "billing"}
        }
    ]);
    post_json(app.clone(), "/api/v1/logs", batch).await;

    let (_, response) = get(app.clone(), "/api/v1/logs?trace_id=t1").await;
    assert_eq!(response["total_count"], 1);
    assert_eq!(response["logs"][0]["message"], "in trace");

    let (_, response) = get(app.clone(), "/api/v1/logs?filter=resource.service_name%3Dbilling").await;
    assert_eq!(response["total_count"], 1);
    assert_eq!(response["logs"][0]["message"], "other service");

    let (_, response) = get(app, "/api/v1/logs?resource=%7Cbilling%7C%7C").await;
    assert_eq!(response["total_count"], 1);
}

#[tokio::test]
async fn test_invalid_log_requests() {
    let (app, _state) = test_app();

    let (status, response) = post_json(app.clone(), "/api/v1/logs", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "empty_batch");

    let (status, response) = post_json(
        app,
        "/api/v1/logs",
        json!({"timestamp": "2024-01-15T10:30:00Z", "message": "no fraction"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["rejected"], 1);
}
