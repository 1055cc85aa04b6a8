//! Metric data model.
//!
//! A metric series is identified by `name|unit|type|resource` and owns an
//! ascending-by-time list of [`DataPoint`]s. Gauge and Sum series carry
//! number points; Histogram series carry bucketed points.

use crate::identity::metric_key;
use crate::models::resource::{Resource, ResourceDto};
use crate::models::wire;
use crate::time::{parse_nano_string, resolve_timestamp, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    /// A sampled value that can go up or down.
    Gauge,
    /// A sum of measurements, delta or cumulative.
    Sum,
    /// A bucketed distribution of measurements.
    Histogram,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gauge => write!(f, "Gauge"),
            Self::Sum => write!(f, "Sum"),
            Self::Histogram => write!(f, "Histogram"),
        }
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gauge" => Ok(Self::Gauge),
            "sum" => Ok(Self::Sum),
            "histogram" => Ok(Self::Histogram),
            _ => Err(format!("Unknown metric type: '{s}'")),
        }
    }
}

/// Whether points report the change since the last report or a running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AggregationTemporality {
    /// Each point is the change since the previous report.
    #[serde(alias = "delta", alias = "AGGREGATION_TEMPORALITY_DELTA")]
    Delta,
    /// Each point is the total since the series start.
    #[default]
    #[serde(alias = "cumulative", alias = "AGGREGATION_TEMPORALITY_CUMULATIVE")]
    Cumulative,
}

/// A sampled raw measurement attached to a data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exemplar {
    /// Measurement time, nanoseconds since epoch.
    pub time_ns: i64,
    /// Trace the measurement was taken in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Span the measurement was taken in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// Measured value.
    pub value: Option<f64>,
}

/// A Gauge or Sum data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberDataPoint {
    /// Start of the aggregation interval (0 when not reported).
    pub start_ns: i64,
    /// Sample time.
    pub time_ns: i64,
    /// Sampled value; absent values chart as 0.
    pub value: Option<f64>,
    /// Point attributes.
    pub attributes: HashMap<String, String>,
    /// Attached exemplars.
    pub exemplars: Vec<Exemplar>,
}

/// A Histogram data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramDataPoint {
    /// Start of the aggregation interval (0 when not reported).
    pub start_ns: i64,
    /// Sample time.
    pub time_ns: i64,
    /// Number of observations.
    pub count: u64,
    /// Sum of observations, when the emitter reports it.
    pub sum: Option<f64>,
    /// Per-bucket observation counts; one more entry than `explicit_bounds`.
    pub bucket_counts: Vec<u64>,
    /// Upper bounds of every bucket but the last.
    pub explicit_bounds: Vec<f64>,
    /// Smallest observation.
    pub min: Option<f64>,
    /// Largest observation.
    pub max: Option<f64>,
    /// Point attributes.
    pub attributes: HashMap<String, String>,
    /// Attached exemplars.
    pub exemplars: Vec<Exemplar>,
}

impl HistogramDataPoint {
    /// `sum / count`, or 0 when either is missing.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::HistogramDataPoint;
    /// use std::collections::HashMap;
    ///
    /// let point = HistogramDataPoint {
    ///     start_ns: 0,
    ///     time_ns: 1,
    ///     count: 10,
    ///     sum: Some(500.0),
    ///     bucket_counts: vec![],
    ///     explicit_bounds: vec![],
    ///     min: None,
    ///     max: None,
    ///     attributes: HashMap::new(),
    ///     exemplars: vec![],
    /// };
    /// assert_eq!(point.average(), 50.0);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        match self.sum {
            Some(sum) if self.count > 0 => sum / self.count as f64,
            _ => 0.0,
        }
    }
}

/// One point of a series, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum DataPoint {
    /// Gauge or Sum point.
    Value(NumberDataPoint),
    /// Histogram point.
    Histogram(HistogramDataPoint),
}

impl DataPoint {
    /// Sample time of the point.
    #[must_use]
    pub fn time_ns(&self) -> i64 {
        match self {
            Self::Value(point) => point.time_ns,
            Self::Histogram(point) => point.time_ns,
        }
    }

    /// Point attributes.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, String> {
        match self {
            Self::Value(point) => &point.attributes,
            Self::Histogram(point) => &point.attributes,
        }
    }
}

/// Type-specific properties of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum MetricKind {
    /// Gauge series.
    Gauge,
    /// Sum series.
    Sum {
        /// Delta or cumulative reporting.
        aggregation_temporality: AggregationTemporality,
        /// Whether the sum only ever increases.
        is_monotonic: bool,
    },
    /// Histogram series.
    Histogram {
        /// Delta or cumulative reporting.
        aggregation_temporality: AggregationTemporality,
    },
}

impl MetricKind {
    /// The metric type this kind belongs to.
    #[must_use]
    pub fn metric_type(&self) -> MetricType {
        match self {
            Self::Gauge => MetricType::Gauge,
            Self::Sum { .. } => MetricType::Sum,
            Self::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Returns true for non-monotonic delta sums, whose values must be
    /// summed over time to yield a running total.
    #[must_use]
    pub fn accumulates(&self) -> bool {
        matches!(
            self,
            Self::Sum {
                aggregation_temporality: AggregationTemporality::Delta,
                is_monotonic: false,
            }
        )
    }
}

/// A metric series.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    /// Series key `name|unit|type|resource_key`.
    pub key: String,
    /// Metric name.
    pub name: String,
    /// Latest reported description.
    pub description: String,
    /// Unit of measurement.
    pub unit: String,
    /// Instrumentation scope name.
    pub scope: String,
    /// Emitting resource.
    pub resource: Resource,
    /// Type-specific properties.
    pub kind: MetricKind,
    /// Points, ascending by `time_ns`.
    pub data_points: Vec<DataPoint>,
}

impl Metric {
    /// Type of the series.
    #[must_use]
    pub fn metric_type(&self) -> MetricType {
        self.kind.metric_type()
    }
}

/// Wire form of an exemplar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExemplarDto {
    /// Measurement time as a decimal nanosecond string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub time_unix_nano: Option<String>,
    /// Trace id.
    #[serde(default)]
    pub trace_id: Option<String>,
    /// Span id.
    #[serde(default)]
    pub span_id: Option<String>,
    /// Value (integer or double on the wire).
    #[serde(default)]
    pub value: Option<f64>,
}

/// Wire form of a number data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberDataPointDto {
    /// Interval start as a decimal nanosecond string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub start_time_unix_nano: Option<String>,
    /// Sample time as a decimal nanosecond string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub time_unix_nano: Option<String>,
    /// Value (integer or double on the wire).
    #[serde(default)]
    pub value: Option<f64>,
    /// Point attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// Exemplars.
    #[serde(default)]
    pub exemplars: Vec<ExemplarDto>,
}

/// Wire form of a histogram data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramDataPointDto {
    /// Interval start as a decimal nanosecond string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub start_time_unix_nano: Option<String>,
    /// Sample time as a decimal nanosecond string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub time_unix_nano: Option<String>,
    /// Number of observations.
    #[serde(default)]
    pub count: u64,
    /// Sum of observations.
    #[serde(default)]
    pub sum: Option<f64>,
    /// Per-bucket counts.
    #[serde(default)]
    pub bucket_counts: Vec<u64>,
    /// Bucket upper bounds.
    #[serde(default)]
    pub explicit_bounds: Vec<f64>,
    /// Exemplars.
    #[serde(default)]
    pub exemplars: Vec<ExemplarDto>,
    /// Smallest observation.
    #[serde(default)]
    pub min: Option<f64>,
    /// Largest observation.
    #[serde(default)]
    pub max: Option<f64>,
    /// Point attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Wire form of the metric payload, tagged by `t`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum MetricDataDto {
    /// Gauge points.
    Gauge {
        /// Points.
        #[serde(default)]
        data_points: Vec<NumberDataPointDto>,
    },
    /// Sum points.
    Sum {
        /// Points.
        #[serde(default)]
        data_points: Vec<NumberDataPointDto>,
        /// Delta or cumulative.
        #[serde(default)]
        aggregation_temporality: AggregationTemporality,
        /// Monotonic flag.
        #[serde(default)]
        is_monotonic: bool,
    },
    /// Histogram points.
    Histogram {
        /// Points.
        #[serde(default)]
        data_points: Vec<HistogramDataPointDto>,
        /// Delta or cumulative.
        #[serde(default)]
        aggregation_temporality: AggregationTemporality,
    },
}

/// A metric as delivered on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDto {
    /// Metric name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Unit.
    #[serde(default)]
    pub unit: String,
    /// Instrumentation scope name.
    #[serde(default)]
    pub scope: String,
    /// Emitting resource.
    #[serde(default)]
    pub resource: ResourceDto,
    /// Payload; absent for empty samples.
    #[serde(default)]
    pub data: Option<MetricDataDto>,
}

fn optional_nanos(value: Option<&str>) -> Result<i64, ParseError> {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => parse_nano_string(v),
        None => Ok(0),
    }
}

impl TryFrom<ExemplarDto> for Exemplar {
    type Error = ParseError;

    fn try_from(dto: ExemplarDto) -> Result<Self, Self::Error> {
        Ok(Self {
            time_ns: optional_nanos(dto.time_unix_nano.as_deref())?,
            trace_id: wire::non_empty(dto.trace_id),
            span_id: wire::non_empty(dto.span_id),
            value: dto.value,
        })
    }
}

fn map_exemplars(exemplars: Vec<ExemplarDto>) -> Result<Vec<Exemplar>, ParseError> {
    exemplars.into_iter().map(Exemplar::try_from).collect()
}

impl TryFrom<NumberDataPointDto> for NumberDataPoint {
    type Error = ParseError;

    fn try_from(dto: NumberDataPointDto) -> Result<Self, Self::Error> {
        Ok(Self {
            start_ns: optional_nanos(dto.start_time_unix_nano.as_deref())?,
            time_ns: resolve_timestamp(dto.time_unix_nano.as_deref(), None, "time_unix_nano")?,
            value: dto.value,
            attributes: dto.attributes,
            exemplars: map_exemplars(dto.exemplars)?,
        })
    }
}

impl TryFrom<HistogramDataPointDto> for HistogramDataPoint {
    type Error = ParseError;

    fn try_from(dto: HistogramDataPointDto) -> Result<Self, Self::Error> {
        Ok(Self {
            start_ns: optional_nanos(dto.start_time_unix_nano.as_deref())?,
            time_ns: resolve_timestamp(dto.time_unix_nano.as_deref(), None, "time_unix_nano")?,
            count: dto.count,
            sum: dto.sum,
            bucket_counts: dto.bucket_counts,
            explicit_bounds: dto.explicit_bounds,
            min: dto.min,
            max: dto.max,
            attributes: dto.attributes,
            exemplars: map_exemplars(dto.exemplars)?,
        })
    }
}

impl MetricDto {
    /// Maps the DTO into a typed series.
    ///
    /// Returns `Ok(None)` when `data` is absent: such samples are valid but
    /// carry nothing to aggregate.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if any point carries a malformed timestamp.
    pub fn into_metric(self) -> Result<Option<Metric>, ParseError> {
        let Some(data) = self.data else {
            return Ok(None);
        };

        let (kind, data_points) = match data {
            MetricDataDto::Gauge { data_points } => (
                MetricKind::Gauge,
                data_points
                    .into_iter()
                    .map(|p| NumberDataPoint::try_from(p).map(DataPoint::Value))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            MetricDataDto::Sum {
                data_points,
                aggregation_temporality,
                is_monotonic,
            } => (
                MetricKind::Sum {
                    aggregation_temporality,
                    is_monotonic,
                },
                data_points
                    .into_iter()
                    .map(|p| NumberDataPoint::try_from(p).map(DataPoint::Value))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            MetricDataDto::Histogram {
                data_points,
                aggregation_temporality,
            } => (
                MetricKind::Histogram {
                    aggregation_temporality,
                },
                data_points
                    .into_iter()
                    .map(|p| HistogramDataPoint::try_from(p).map(DataPoint::Histogram))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        let resource = Resource::from(self.resource);
        let key = metric_key(
            &self.name,
            &self.unit,
            &kind.metric_type().to_string(),
            resource.key(),
        );

        Ok(Some(Metric {
            key,
            name: self.name,
            description: self.description,
            unit: self.unit,
            scope: self.scope,
            resource,
            kind,
            data_points,
        }))
    }
}
