//! Integration tests for trace assembly and the trace timeline.
//!
//! Tests cover:
//! - Out-of-order arrival
//! - Orphans that stay on the root list
//! - Timeline rows with interleaved logs

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, log, post_json, span, test_app};

#[tokio::test]
async fn test_children_before_parent() {
    let (app, _state) = test_app();

    for record in [
        span("t1", "grandchild", Some("child"), 3_000, 4_000),
        span("t1", "child", Some("root"), 2_000, 5_000),
        span("t1", "root", None, 1_000, 10_000),
    ] {
        let (status, _) = post_json(app.clone(), "/api/v1/traces", record).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, response) = get(app.clone(), "/api/v1/traces").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 1);

    let root = &response["roots"][0];
    assert_eq!(root["span"]["span_id"], "root");
    assert_eq!(root["span"]["duration_ns"], 9_000);
    assert_eq!(root["children"][0]["span"]["span_id"], "child");
    assert_eq!(root["children"][0]["children"][0]["span"]["span_id"], "grandchild");

    let (_, stats) = get(app, "/api/v1/stats").await;
    assert_eq!(stats["roots"], 1);
    assert_eq!(stats["pending_parents"], 0);
}

#[tokio::test]
async fn test_orphan_stays_root_until_parent_arrives() {
    let (app, _state) = test_app();

    post_json(
        app.clone(),
        "/api/v1/traces",
        span("t1", "child", Some("missing"), 2, 3),
    )
    .await;

    let (_, response) = get(app.clone(), "/api/v1/traces").await;
    assert_eq!(response["total_count"], 1);
    assert_eq!(response["roots"][0]["span"]["span_id"], "child");

    let (_, stats) = get(app, "/api/v1/stats").await;
    assert_eq!(stats["pending_parents"], 1);
}

#[tokio::test]
async fn test_same_span_id_in_other_trace_is_not_a_parent() {
    let (app, _state) = test_app();

    let batch = json!([
        span("t1", "p", None, 1, 2),
        span("t2", "c", Some("p"), 1, 2),
    ]);
    post_json(app.clone(), "/api/v1/traces", batch).await;

    let (_, response) = get(app, "/api/v1/traces").await;
    assert_eq!(response["total_count"], 2);
    assert!(response["roots"][0]["children"].as_array().unwrap().is_empty());
    assert!(response["roots"][1]["children"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_trace_timeline_with_logs() {
    let (app, _state) = test_app();

    let spans = json!([
        span("t1", "root", None, 1_000, 11_000),
        span("t1", "child", Some("root"), 6_000, 11_000),
    ]);
    post_json(app.clone(), "/api/v1/traces", spans).await;
    post_json(
        app.clone(),
        "/api/v1/logs",
        json!([
            log(3_000, "ERROR", "later", Some("root")),
            log(2_000, "INFO", "earlier", Some("root")),
        ]),
    )
    .await;

    let (status, view) = get(app.clone(), "/api/v1/traces/t1?logs=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["range"]["start_ns"], 1_000);
    assert_eq!(view["range"]["end_ns"], 11_000);

    let rows = view["rows"].as_array().unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["op-root", "earlier", "later", "op-child"]);
    assert_eq!(rows[1]["kind"], "log");
    assert_eq!(rows[1]["depth"], 1);
    assert_eq!(rows[2]["severity"], "error");
    assert_eq!(rows[3]["offset_pct"], 50.0);
    assert_eq!(rows[3]["width_pct"], 50.0);

    let (_, view) = get(app, "/api/v1/traces/t1").await;
    assert_eq!(view["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_trace_returns_404() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/v1/traces/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}
