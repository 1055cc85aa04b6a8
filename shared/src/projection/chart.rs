//! Chart projection: every matching series resampled onto one time axis.

use super::{color_for, point_values, relevant_metrics, SeriesSelector, TimeRange};
use crate::models::{Metric, MetricType};
use crate::time::nanos_to_millis;
use chrono::DateTime;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Curve smoothing used by every dataset.
pub const TENSION: f64 = 0.4;

/// One line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    /// Resource label, with ` (Avg)` appended for histograms.
    pub label: String,
    /// One value per axis timestamp; `None` where the series has no point.
    pub data: Vec<Option<f64>>,
    /// Whether the area under the line is filled.
    pub fill: bool,
    /// Line colour.
    pub border_color: String,
    /// Point colour.
    pub background_color: String,
    /// Curve smoothing.
    pub tension: f64,
    /// Whether the line is drawn across gaps.
    pub span_gaps: bool,
}

/// Chart-ready data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    /// Axis timestamps in milliseconds, ascending and distinct.
    pub timestamps_ms: Vec<i64>,
    /// `HH:MM:SS` (UTC) label of each axis timestamp.
    pub labels: Vec<String>,
    /// One dataset per matching series.
    pub datasets: Vec<ChartDataset>,
}

fn time_label(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Builds chart data for every series sharing `selector`'s identity.
///
/// Gauge and Sum datasets plot raw values, accumulated for non-monotonic
/// delta sums. Histogram datasets plot the per-point average.
#[must_use]
pub fn chart_data(
    selector: &SeriesSelector,
    metrics: &[Metric],
    resource_key: Option<&str>,
    range: Option<TimeRange>,
) -> ChartData {
    let range = range.unwrap_or_default();
    let series = relevant_metrics(selector, metrics, resource_key);

    let mut axis = BTreeSet::new();
    let values: Vec<HashMap<i64, f64>> = series
        .iter()
        .map(|metric| {
            point_values(metric, &range)
                .into_iter()
                .map(|(point, value)| {
                    let ms = nanos_to_millis(point.time_ns());
                    axis.insert(ms);
                    (ms, value)
                })
                .collect()
        })
        .collect();

    let timestamps_ms: Vec<i64> = axis.into_iter().collect();
    let datasets = series
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (metric, by_ms))| {
            let mut label = metric.resource.label();
            if metric.metric_type() == MetricType::Histogram {
                label.push_str(" (Avg)");
            }
            let color = color_for(index).to_string();
            ChartDataset {
                label,
                data: timestamps_ms.iter().map(|ms| by_ms.get(ms).copied()).collect(),
                fill: false,
                border_color: color.clone(),
                background_color: color,
                tension: TENSION,
                span_gaps: true,
            }
        })
        .collect();

    ChartData {
        labels: timestamps_ms.iter().map(|&ms| time_label(ms)).collect(),
        timestamps_ms,
        datasets,
    }
}
