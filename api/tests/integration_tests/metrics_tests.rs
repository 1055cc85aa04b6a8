//! Integration tests for metric ingestion and projections.
//!
//! Tests cover:
//! - Series merging and listing
//! - Chart resampling across resources
//! - Table rows with histogram percentiles

use axum::http::StatusCode;
use serde_json::json;

use super::common::{gauge, get, post_json, test_app};

#[tokio::test]
async fn test_samples_merge_into_one_series() {
    let (app, _state) = test_app();

    post_json(
        app.clone(),
        "/api/v1/metrics",
        gauge("latency", "checkout", &[(2_000_000, 20.0)]),
    )
    .await;
    post_json(
        app.clone(),
        "/api/v1/metrics",
        gauge("latency", "checkout", &[(1_000_000, 10.0)]),
    )
    .await;

    let (status, response) = get(app, "/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 1);
    assert_eq!(response["metrics"][0]["name"], "latency");
    assert_eq!(response["metrics"][0]["type"], "Gauge");
    assert_eq!(response["metrics"][0]["data_points"], 2);
}

#[tokio::test]
async fn test_chart_aligns_resources_on_one_axis() {
    let (app, _state) = test_app();

    let batch = json!([
        gauge("latency", "checkout", &[(1_000_000_000, 10.0), (3_000_000_000, 30.0)]),
        gauge("latency", "billing", &[(2_000_000_000, 20.0)]),
    ]);
    post_json(app.clone(), "/api/v1/metrics", batch).await;

    let (status, chart) = get(app.clone(), "/api/v1/metrics/chart?name=latency&unit=ms&type=gauge").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chart["timestamps_ms"], json!([1000, 2000, 3000]));
    assert_eq!(chart["datasets"][0]["data"], json!([10.0, null, 30.0]));
    assert_eq!(chart["datasets"][1]["data"], json!([null, 20.0, null]));

    let (_, chart) = get(
        app,
        "/api/v1/metrics/chart?name=latency&unit=ms&type=gauge&resource=%7Cbilling%7C%7C",
    )
    .await;
    assert_eq!(chart["datasets"].as_array().unwrap().len(), 1);
    assert_eq!(chart["timestamps_ms"], json!([2000]));
}

#[tokio::test]
async fn test_histogram_table_has_percentiles() {
    let (app, _state) = test_app();

    let histogram = json!({
        "name": "request.size",
        "unit": "By",
        "resource": {"service_name": "checkout"},
        "data": {
            "t": "Histogram",
            "aggregation_temporality": "AGGREGATION_TEMPORALITY_DELTA",
            "data_points": [{
                "time_unix_nano": "1000000000",
                "count": 10,
                "sum": 150.0,
                "bucket_counts": [10, 0, 0],
                "explicit_bounds": [10.0, 20.0]
            }]
        }
    });
    let (status, _) = post_json(app.clone(), "/api/v1/metrics", histogram).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, rows) = get(app.clone(), "/api/v1/metrics/table?name=request.size&unit=By&type=histogram").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows[0]["value"], 15.0);
    assert_eq!(rows[0]["p50"], 5.0);

    let (_, chart) = get(app, "/api/v1/metrics/chart?name=request.size&unit=By&type=histogram").await;
    assert_eq!(chart["datasets"][0]["label"], "checkout () (Avg)");
    assert_eq!(chart["datasets"][0]["data"], json!([15.0]));
}

#[tokio::test]
async fn test_projection_errors() {
    let (app, _state) = test_app();

    let (status, response) = get(app.clone(), "/api/v1/metrics/chart?name=x&type=counter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_type");

    let (status, response) = get(app, "/api/v1/metrics/table?name=x&type=gauge").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}
