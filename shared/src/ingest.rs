//! Ingestion entry point.
//!
//! [`Telemetry`] owns every collection of the core and routes each decoded
//! record to the matching one. Hosts construct one hub and feed it records
//! one at a time; each call applies its record completely before returning.

use crate::config::RetentionConfig;
use crate::models::{LogDto, MetricDto, SpanDto};
use crate::projection::TraceView;
use crate::storage::{LogStore, MetricStore, MetricUpsert, ResourceRegistry, SpanInsert, TraceStore};
use crate::time::ParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A record as published on the push channel.
///
/// ```
/// use shared::ingest::Envelope;
///
/// let json = r#"{"topic": "metrics", "payload": {"name": "cpu"}}"#;
/// let envelope: Envelope = serde_json::from_str(json).unwrap();
/// assert!(matches!(envelope, Envelope::Metrics(_)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload", rename_all = "lowercase")]
pub enum Envelope {
    /// One span.
    Traces(SpanDto),
    /// One log record.
    Logs(LogDto),
    /// One metric sample.
    Metrics(MetricDto),
}

impl Envelope {
    /// Topic name of the envelope.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Traces(_) => "traces",
            Self::Logs(_) => "logs",
            Self::Metrics(_) => "metrics",
        }
    }
}

/// What happened to an ingested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ingested {
    /// A new span was linked into the tree.
    Span,
    /// The span key was already known; nothing changed.
    DuplicateSpan,
    /// A log was stored.
    Log,
    /// Metric points were stored.
    Metric,
    /// A metric sample without data was dropped.
    Ignored,
}

impl Ingested {
    /// Returns true if the record changed the stored state.
    #[must_use]
    pub fn changed_state(self) -> bool {
        matches!(self, Self::Span | Self::Log | Self::Metric)
    }
}

/// Errors raised while ingesting a record. Both are scoped to the record:
/// the hub is unchanged and later records can be ingested normally.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The record is not valid JSON for its topic.
    #[error("Failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    /// The record carries a malformed timestamp.
    #[error("Failed to parse record: {0}")]
    Parse(#[from] ParseError),
}

/// Point-in-time counters over the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetryStats {
    /// Indexed spans.
    pub spans: usize,
    /// Spans on the root list.
    pub roots: usize,
    /// Parents that are named by some span but not seen yet.
    pub pending_parents: usize,
    /// Stored logs.
    pub logs: usize,
    /// Metric series.
    pub metric_series: usize,
    /// Retained metric points over all series.
    pub data_points: usize,
    /// Distinct resources.
    pub resources: usize,
    /// Change counter.
    pub revision: u64,
}

/// The ingestion core: trace tree, log collection, metric engine and
/// resource registry behind one entry point.
#[derive(Debug, Default)]
pub struct Telemetry {
    traces: TraceStore,
    logs: LogStore,
    metrics: MetricStore,
    resources: ResourceRegistry,
    revision: u64,
}

impl Telemetry {
    /// Creates an empty hub.
    #[must_use]
    pub fn new(config: &RetentionConfig) -> Self {
        Self {
            metrics: MetricStore::from_config(config),
            ..Self::default()
        }
    }

    /// Ingests one span.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the span's timestamps are malformed.
    pub fn add_span(&mut self, dto: SpanDto) -> Result<Ingested, ParseError> {
        let outcome = match self.traces.add_span(dto, &mut self.resources)? {
            SpanInsert::Inserted => Ingested::Span,
            SpanInsert::Duplicate => Ingested::DuplicateSpan,
        };
        Ok(self.record(outcome))
    }

    /// Ingests one log record.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the record's timestamp is malformed.
    pub fn add_log(&mut self, dto: LogDto) -> Result<Ingested, ParseError> {
        self.logs.add_log(dto, &mut self.resources)?;
        Ok(self.record(Ingested::Log))
    }

    /// Ingests one metric sample.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if any point's timestamp is malformed.
    pub fn add_metric(&mut self, dto: MetricDto) -> Result<Ingested, ParseError> {
        let outcome = match self.metrics.add_metric(dto, &mut self.resources)? {
            MetricUpsert::Created | MetricUpsert::Merged => Ingested::Metric,
            MetricUpsert::Ignored => Ingested::Ignored,
        };
        Ok(self.record(outcome))
    }

    /// Routes an envelope to the matching collection.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Parse`] if the record is malformed.
    pub fn ingest(&mut self, envelope: Envelope) -> Result<Ingested, IngestError> {
        let outcome = match envelope {
            Envelope::Traces(dto) => self.add_span(dto)?,
            Envelope::Logs(dto) => self.add_log(dto)?,
            Envelope::Metrics(dto) => self.add_metric(dto)?,
        };
        Ok(outcome)
    }

    /// Decodes and ingests one JSON envelope.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Decode`] for invalid JSON and
    /// [`IngestError::Parse`] for malformed timestamps.
    pub fn ingest_json(&mut self, json: &str) -> Result<Ingested, IngestError> {
        let envelope: Envelope = serde_json::from_str(json)?;
        self.ingest(envelope)
    }

    fn record(&mut self, outcome: Ingested) -> Ingested {
        if outcome.changed_state() {
            self.revision += 1;
        }
        outcome
    }

    /// Change counter, bumped once per state-changing record.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The trace tree assembler.
    #[must_use]
    pub fn traces(&self) -> &TraceStore {
        &self.traces
    }

    /// The log collection.
    #[must_use]
    pub fn logs(&self) -> &LogStore {
        &self.logs
    }

    /// The metric engine.
    #[must_use]
    pub fn metrics(&self) -> &MetricStore {
        &self.metrics
    }

    /// The resource registry.
    #[must_use]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Timeline view of one trace.
    #[must_use]
    pub fn trace_view(&self, trace_id: &str, include_logs: bool) -> TraceView {
        TraceView::build(&self.traces, &self.logs, trace_id, include_logs)
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> TelemetryStats {
        TelemetryStats {
            spans: self.traces.len(),
            roots: self.traces.root_keys().len(),
            pending_parents: self.traces.orphans().len(),
            logs: self.logs.len(),
            metric_series: self.metrics.len(),
            data_points: self.metrics.data_point_count(),
            resources: self.resources.len(),
            revision: self.revision,
        }
    }
}
