//! Trace and span data models.
//!
//! A [`SpanDto`] is what the delivery channel hands over; a [`Span`] is the
//! normalized form kept by the trace store, with nanosecond timestamps and
//! a list of child span keys.

use crate::identity::span_key;
use crate::models::resource::{Resource, ResourceDto};
use crate::models::wire;
use crate::time::{resolve_timestamp, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SpanKind {
    /// The kind was not set by the instrumentation.
    #[default]
    Unspecified,
    /// An internal operation.
    Internal,
    /// A server handling a request.
    Server,
    /// A client making a request.
    Client,
    /// A producer sending a message.
    Producer,
    /// A consumer receiving a message.
    Consumer,
}

impl SpanKind {
    /// Maps a wire kind name. Accepts `Server`, `SERVER` and
    /// `SPAN_KIND_SERVER` spellings; anything unknown is `Unspecified`.
    #[must_use]
    pub fn from_wire(kind: &str) -> Self {
        let kind = kind.trim_start_matches("SPAN_KIND_").to_ascii_lowercase();
        match kind.as_str() {
            "internal" => Self::Internal,
            "server" => Self::Server,
            "client" => Self::Client,
            "producer" => Self::Producer,
            "consumer" => Self::Consumer,
            _ => Self::Unspecified,
        }
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::Internal => write!(f, "internal"),
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// Status code of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StatusCode {
    /// No status was recorded.
    #[default]
    Unset,
    /// The operation succeeded.
    Ok,
    /// The operation failed.
    Error,
}

impl StatusCode {
    /// Maps a wire status code name; unknown values are `Unset`.
    #[must_use]
    pub fn from_wire(code: &str) -> Self {
        let code = code.trim_start_matches("STATUS_CODE_").to_ascii_lowercase();
        match code.as_str() {
            "ok" => Self::Ok,
            "error" => Self::Error,
            _ => Self::Unset,
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Status of a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SpanStatus {
    /// Status message (usually set for errors).
    pub message: String,
    /// Status code.
    pub code: StatusCode,
}

/// Wire form of a span status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanStatusDto {
    /// Status message.
    #[serde(default)]
    pub message: String,
    /// Status code name.
    #[serde(default)]
    pub code: String,
}

/// An event within a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEvent {
    /// The name of the event.
    pub name: String,
    /// ISO-8601 timestamp of the event.
    #[serde(default)]
    pub timestamp: String,
    /// Additional attributes for the event.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// A link from a span to another span, possibly in another trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanLink {
    /// Linked trace id.
    #[serde(default)]
    pub trace_id: String,
    /// Linked span id.
    #[serde(default)]
    pub span_id: String,
    /// W3C trace state of the link.
    #[serde(default)]
    pub trace_state: String,
    /// Link attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// A span as delivered on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDto {
    /// ISO-8601 start time (fallback when the nanosecond form is absent).
    #[serde(default)]
    pub start_time: Option<String>,
    /// ISO-8601 end time.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Start time, nanoseconds since epoch as a decimal string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub start_time_unix_nano: Option<String>,
    /// End time, nanoseconds since epoch as a decimal string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub end_time_unix_nano: Option<String>,
    /// Instrumentation scope name.
    #[serde(default)]
    pub scope: String,
    /// Operation name.
    pub name: String,
    /// Trace id (hex).
    pub trace_id: String,
    /// Span id (hex).
    pub span_id: String,
    /// Parent span id; absent or empty for root spans.
    #[serde(default)]
    pub parent_span_id: Option<String>,
    /// Emitting resource.
    #[serde(default)]
    pub resource: ResourceDto,
    /// Span kind name.
    #[serde(default)]
    pub kind: String,
    /// Span status.
    #[serde(default)]
    pub status: SpanStatusDto,
    /// Span attributes.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Span events.
    #[serde(default)]
    pub events: Vec<SpanEvent>,
    /// Span links.
    #[serde(default)]
    pub links: Vec<SpanLink>,
}

impl SpanDto {
    /// The composite key this span will be indexed under.
    #[must_use]
    pub fn key(&self) -> String {
        span_key(&self.trace_id, &self.span_id)
    }
}

/// A span representing a unit of work in a distributed trace.
///
/// Children are held as span keys into the owning
/// [`TraceStore`](crate::storage::TraceStore) index, in arrival order.
#[derive(Debug, Clone, Serialize)]
pub struct Span {
    /// Trace id.
    pub trace_id: String,
    /// Span id.
    pub span_id: String,
    /// Parent span id (`None` for root spans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    /// Operation name.
    pub name: String,
    /// Instrumentation scope name.
    pub scope: String,
    /// Span kind.
    pub kind: SpanKind,
    /// Span status.
    pub status: SpanStatus,
    /// Start, nanoseconds since epoch.
    pub start_ns: i64,
    /// End, nanoseconds since epoch.
    pub end_ns: i64,
    /// `end_ns - start_ns`.
    pub duration_ns: i64,
    /// Emitting resource.
    pub resource: Resource,
    /// Span attributes.
    pub tags: HashMap<String, String>,
    /// Span events, in reported order.
    pub events: Vec<SpanEvent>,
    /// Span links, in reported order.
    pub links: Vec<SpanLink>,
    /// Keys of the child spans, in arrival order.
    pub children: Vec<String>,
}

impl Span {
    /// The composite `trace_id-span_id` key.
    #[must_use]
    pub fn key(&self) -> String {
        span_key(&self.trace_id, &self.span_id)
    }

    /// The key of the declared parent, if any.
    #[must_use]
    pub fn parent_key(&self) -> Option<String> {
        self.parent_span_id
            .as_deref()
            .map(|parent| span_key(&self.trace_id, parent))
    }

    /// Returns true if the span declares no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }
}

impl TryFrom<SpanDto> for Span {
    type Error = ParseError;

    fn try_from(dto: SpanDto) -> Result<Self, Self::Error> {
        let start_ns = resolve_timestamp(
            dto.start_time_unix_nano.as_deref(),
            dto.start_time.as_deref(),
            "start_time",
        )?;
        let end_ns = resolve_timestamp(
            dto.end_time_unix_nano.as_deref(),
            dto.end_time.as_deref(),
            "end_time",
        )?;

        Ok(Self {
            trace_id: dto.trace_id,
            span_id: dto.span_id,
            parent_span_id: wire::non_empty(dto.parent_span_id),
            name: dto.name,
            scope: dto.scope,
            kind: SpanKind::from_wire(&dto.kind),
            status: SpanStatus {
                message: dto.status.message,
                code: StatusCode::from_wire(&dto.status.code),
            },
            start_ns,
            end_ns,
            duration_ns: end_ns.saturating_sub(start_ns),
            resource: Resource::from(dto.resource),
            tags: dto.tags,
            events: dto.events,
            links: dto.links,
            children: Vec::new(),
        })
    }
}
