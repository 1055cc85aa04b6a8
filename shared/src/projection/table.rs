//! Table projection: one row per raw data point, newest first.

use super::{point_values, relevant_metrics, SeriesSelector, TimeRange};
use crate::models::{DataPoint, Metric};
use crate::time::nanos_to_millis;
use chrono::DateTime;
use serde::Serialize;
use std::collections::HashMap;

/// One table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTableRow {
    /// Sample time, nanoseconds since epoch.
    pub time_ns: i64,
    /// `YYYY-MM-DD HH:MM:SS.mmm` (UTC).
    pub timestamp: String,
    /// Resource label.
    pub resource: String,
    /// Raw, accumulated or average value.
    pub value: f64,
    /// Estimated median (histograms only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    /// Estimated 95th percentile (histograms only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    /// Estimated 99th percentile (histograms only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
    /// Point attributes.
    pub attributes: HashMap<String, String>,
}

/// Estimates a percentile from histogram buckets.
///
/// Finds the first bucket whose cumulative count reaches
/// `total * percentile / 100` and interpolates linearly inside it. The top
/// bucket has no upper bound, so twice the last explicit bound stands in.
///
/// # Example
///
/// ```
/// use shared::projection::calculate_percentile;
///
/// // 10 observations, all in (0, 10].
/// assert_eq!(calculate_percentile(&[10.0, 20.0], &[10, 0, 0], 50.0), 5.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_percentile(bounds: &[f64], counts: &[u64], percentile: f64) -> f64 {
    let total: u128 = counts.iter().map(|&c| u128::from(c)).sum();
    if total == 0 {
        return 0.0;
    }

    let target = total as f64 * (percentile / 100.0);
    let top_edge = bounds.last().map_or(0.0, |last| last * 2.0);
    let mut cumulative = 0_u128;

    for (i, &count) in counts.iter().enumerate() {
        let count = u128::from(count);
        cumulative += count;
        if cumulative as f64 >= target {
            let lower = if i == 0 { 0.0 } else { bounds.get(i - 1).copied().unwrap_or(top_edge) };
            if count == 0 {
                return lower;
            }
            let upper = bounds.get(i).copied().unwrap_or(top_edge);
            let previous = (cumulative - count) as f64;
            let ratio = (target - previous) / count as f64;
            return lower + (upper - lower) * ratio;
        }
    }

    bounds.last().copied().unwrap_or(0.0)
}

fn timestamp_label(time_ns: i64) -> String {
    DateTime::from_timestamp_millis(nanos_to_millis(time_ns))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_default()
}

/// Builds table rows for every series sharing `selector`'s identity.
///
/// Filtering and accumulation follow [`chart_data`](super::chart_data).
/// Rows are sorted newest first; rows with equal times keep series order.
#[must_use]
pub fn table_data(
    selector: &SeriesSelector,
    metrics: &[Metric],
    resource_key: Option<&str>,
    range: Option<TimeRange>,
) -> Vec<MetricTableRow> {
    let range = range.unwrap_or_default();
    let mut rows: Vec<MetricTableRow> = relevant_metrics(selector, metrics, resource_key)
        .into_iter()
        .flat_map(|metric| {
            let resource = metric.resource.label();
            point_values(metric, &range)
                .into_iter()
                .map(move |(point, value)| {
                    let (p50, p95, p99) = match point {
                        DataPoint::Histogram(h) => (
                            Some(calculate_percentile(&h.explicit_bounds, &h.bucket_counts, 50.0)),
                            Some(calculate_percentile(&h.explicit_bounds, &h.bucket_counts, 95.0)),
                            Some(calculate_percentile(&h.explicit_bounds, &h.bucket_counts, 99.0)),
                        ),
                        DataPoint::Value(_) => (None, None, None),
                    };
                    MetricTableRow {
                        time_ns: point.time_ns(),
                        timestamp: timestamp_label(point.time_ns()),
                        resource: resource.clone(),
                        value,
                        p50,
                        p95,
                        p99,
                        attributes: point.attributes().clone(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect();

    rows.sort_by(|a, b| b.time_ns.cmp(&a.time_ns));
    rows
}
