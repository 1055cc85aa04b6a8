//! Integration tests for the resource registry.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{gauge, get, log, post_json, span, test_app};

#[tokio::test]
async fn test_resources_seen_across_signals_are_registered_once() {
    let (app, _state) = test_app();

    post_json(app.clone(), "/api/v1/traces", span("t1", "a", None, 1, 2)).await;
    post_json(app.clone(), "/api/v1/logs", log(5, "INFO", "x", None)).await;
    post_json(
        app.clone(),
        "/api/v1/metrics",
        json!(gauge("latency", "billing", &[(1, 1.0)])),
    )
    .await;

    let (status, response) = get(app, "/api/v1/resources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 3);

    let first = &response["resources"][0];
    assert_eq!(first["service_name"], "checkout");
    assert_eq!(first["service_version"], "1.2.0");
    assert_eq!(first["key"], "|checkout|1.2.0|4f1c2b9e-77aa");
    assert_eq!(first["label"], "checkout (4f1c2b9e)");
    assert_eq!(response["resources"][1]["key"], "|checkout||4f1c2b9e-77aa");
    assert_eq!(response["resources"][2]["service_name"], "billing");
}
