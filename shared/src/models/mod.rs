//! Data models for spans, logs, metrics and the resources that emit them.
//!
//! Each model comes in two forms: a `*Dto` matching the JSON records handed
//! over by the delivery channel, and a normalized type with 64-bit
//! nanosecond timestamps that the stores keep.

pub mod log;
pub mod metric;
pub mod resource;
pub mod trace;
mod wire;

pub use log::{Log, LogDto, SeverityLevel};
pub use metric::{
    AggregationTemporality, DataPoint, Exemplar, ExemplarDto, HistogramDataPoint,
    HistogramDataPointDto, Metric, MetricDataDto, MetricDto, MetricKind, MetricType,
    NumberDataPoint, NumberDataPointDto,
};
pub use resource::{Resource, ResourceDto, INSTANCE_PREFIX_LEN};
pub use trace::{
    Span, SpanDto, SpanEvent, SpanKind, SpanLink, SpanStatus, SpanStatusDto, StatusCode,
};
