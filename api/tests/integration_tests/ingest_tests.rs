//! Integration tests for envelope ingestion.
//!
//! Tests cover:
//! - Routing of each topic to its collection
//! - Per-record rejection inside a batch
//! - Revision counting

use axum::http::StatusCode;
use serde_json::json;

use super::common::{gauge, get, log, post_json, span, test_app};

#[tokio::test]
async fn test_envelopes_reach_every_collection() {
    let (app, _state) = test_app();

    let batch = json!([
        {"topic": "traces", "payload": span("t1", "root", None, 1_000, 5_000)},
        {"topic": "logs", "payload": log(2_000, "INFO", "hello", Some("root"))},
        {"topic": "metrics", "payload": gauge("latency", "checkout", &[(1_000_000, 12.5)])}
    ]);

    let (status, response) = post_json(app.clone(), "/api/v1/ingest", batch).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 3);

    let (_, stats) = get(app, "/api/v1/stats").await;
    assert_eq!(stats["spans"], 1);
    assert_eq!(stats["logs"], 1);
    assert_eq!(stats["metric_series"], 1);
    assert_eq!(stats["revision"], 3);
}

#[tokio::test]
async fn test_bad_record_does_not_block_batch() {
    let (app, _state) = test_app();

    let batch = json!([
        {"topic": "traces", "payload": {"name": "no ids"}},
        {"topic": "traces", "payload": span("t1", "a", None, 1, 2)},
        {"topic": "bogus", "payload": {}}
    ]);

    let (status, response) = post_json(app.clone(), "/api/v1/ingest", batch).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 1);
    assert_eq!(response["rejected"], 2);
    assert_eq!(response["errors"][0]["index"], 0);
    assert_eq!(response["errors"][1]["index"], 2);

    let (_, stats) = get(app, "/api/v1/stats").await;
    assert_eq!(stats["spans"], 1);
    assert_eq!(stats["revision"], 1);
}

#[tokio::test]
async fn test_duplicate_span_is_reported_not_stored() {
    let (app, _state) = test_app();
    let envelope = json!({"topic": "traces", "payload": span("t1", "a", None, 1, 2)});

    let (status, _) = post_json(app.clone(), "/api/v1/ingest", envelope.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = post_json(app.clone(), "/api/v1/ingest", envelope).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["duplicates"], 1);

    let (_, stats) = get(app, "/api/v1/stats").await;
    assert_eq!(stats["spans"], 1);
    assert_eq!(stats["revision"], 1);
}
