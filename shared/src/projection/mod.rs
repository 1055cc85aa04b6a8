//! Read-side projections computed on demand from the stores.
//!
//! - [`chart`] resamples matching metric series onto a shared time axis.
//! - [`table`] lists raw points with histogram percentile estimates.
//! - [`trace_view`] flattens one trace into timeline rows.

pub mod chart;
pub mod table;
pub mod trace_view;

pub use chart::{chart_data, ChartData, ChartDataset};
pub use table::{calculate_percentile, table_data, MetricTableRow};
pub use trace_view::{RowKind, TraceRow, TraceView};

use crate::models::{DataPoint, Metric, MetricType};
use crate::time::nanos_to_millis;
use serde::{Deserialize, Serialize};

/// Colours assigned to datasets round-robin.
pub const PALETTE: [&str; 10] = [
    "#10b981", "#3b82f6", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
    "#14b8a6", "#f97316",
];

/// Colour of the dataset at `index`.
#[must_use]
pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// The identity shared by all series shown together: name, unit and type.
/// The resource is deliberately left out so one chart compares resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSelector {
    /// Metric name.
    pub name: String,
    /// Unit.
    pub unit: String,
    /// Metric type.
    pub metric_type: MetricType,
}

impl SeriesSelector {
    /// Creates a selector.
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            metric_type,
        }
    }

    /// Returns true if the series shares this name, unit and type.
    #[must_use]
    pub fn matches(&self, metric: &Metric) -> bool {
        metric.name == self.name && metric.unit == self.unit && metric.metric_type() == self.metric_type
    }
}

impl From<&Metric> for SeriesSelector {
    fn from(metric: &Metric) -> Self {
        Self::new(metric.name.clone(), metric.unit.clone(), metric.metric_type())
    }
}

/// Closed time window, compared at millisecond precision. Either end may be
/// open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start, nanoseconds since epoch.
    pub start_ns: Option<i64>,
    /// Inclusive end, nanoseconds since epoch.
    pub end_ns: Option<i64>,
}

impl TimeRange {
    /// Creates a closed window.
    #[must_use]
    pub fn new(start_ns: i64, end_ns: i64) -> Self {
        Self {
            start_ns: Some(start_ns),
            end_ns: Some(end_ns),
        }
    }

    /// Returns true if `time_ns` falls inside the window once all three
    /// values are truncated to milliseconds.
    #[must_use]
    pub fn contains(&self, time_ns: i64) -> bool {
        let ms = nanos_to_millis(time_ns);
        self.start_ns.is_none_or(|start| ms >= nanos_to_millis(start))
            && self.end_ns.is_none_or(|end| ms <= nanos_to_millis(end))
    }
}

/// Series matching the selector, optionally restricted to one resource, in
/// store order.
#[must_use]
pub fn relevant_metrics<'a>(
    selector: &SeriesSelector,
    metrics: &'a [Metric],
    resource_key: Option<&str>,
) -> Vec<&'a Metric> {
    metrics
        .iter()
        .filter(|m| selector.matches(m))
        .filter(|m| resource_key.is_none_or(|key| m.resource.key() == key))
        .collect()
}

/// Points of a series inside the window, ascending by time.
fn points_in_range<'a>(
    metric: &'a Metric,
    range: &'a TimeRange,
) -> impl Iterator<Item = &'a DataPoint> + 'a {
    metric
        .data_points
        .iter()
        .filter(move |point| range.contains(point.time_ns()))
}

/// Display value of each point in order, applying running accumulation to
/// series that need it. The accumulator starts at zero at the window start.
fn point_values<'a>(metric: &'a Metric, range: &'a TimeRange) -> Vec<(&'a DataPoint, f64)> {
    let accumulate = metric.kind.accumulates();
    let mut accumulator = 0.0;

    points_in_range(metric, range)
        .map(|point| {
            let value = match point {
                DataPoint::Histogram(histogram) => histogram.average(),
                DataPoint::Value(number) => {
                    let raw = number.value.unwrap_or(0.0);
                    if accumulate {
                        accumulator += raw;
                        accumulator
                    } else {
                        raw
                    }
                }
            };
            (point, value)
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_time_range_is_closed_at_millisecond_precision() {
        let range = TimeRange::new(2_000_000, 3_000_000);
        assert!(range.contains(2_000_000));
        assert!(range.contains(3_999_999));
        assert!(!range.contains(1_999_999));
        assert!(!range.contains(4_000_000));
        assert!(TimeRange::default().contains(i64::MIN));
    }

    #[test]
    fn test_relevant_metrics_filters_identity_and_resource() {
        let a = number_metric(&gauge(), "svc-a", "1", &[(1, 1.0)]);
        let b = number_metric(&gauge(), "svc-b", "2", &[(1, 1.0)]);
        let other = number_metric(&delta_sum(true), "svc-a", "1", &[(1, 1.0)]);
        let metrics = vec![a, b, other];
        let selector = SeriesSelector::from(&metrics[0]);

        assert_eq!(relevant_metrics(&selector, &metrics, None).len(), 2);
        let only_b = relevant_metrics(&selector, &metrics, Some("|svc-b||2"));
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].resource.service_name(), "svc-b");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(color_for(0), "#10b981");
        assert_eq!(color_for(10), "#10b981");
        assert_eq!(color_for(11), "#3b82f6");
    }
}
