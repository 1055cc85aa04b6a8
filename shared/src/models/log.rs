//! Log data model.
//!
//! Defines the wire [`LogDto`] and the normalized [`Log`] kept by the log
//! store, ordered newest first by `time_ns`.

use crate::models::resource::{Resource, ResourceDto};
use crate::models::wire;
use crate::time::{resolve_timestamp, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized severity bucket of a log record.
///
/// Emitters spell severities in many ways (`WARNING`, `warn`, `Fatal`...);
/// this folds them into the handful of levels a viewer colours by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// Debug and trace output.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warn,
    /// Error conditions.
    Error,
    /// Critical or fatal conditions.
    Critical,
    /// Anything not recognised, including an empty severity.
    #[default]
    Unknown,
}

impl SeverityLevel {
    /// Folds a free-form severity text into a level. Case-insensitive.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::SeverityLevel;
    ///
    /// assert_eq!(SeverityLevel::from_text("WARNING"), SeverityLevel::Warn);
    /// assert_eq!(SeverityLevel::from_text("fatal"), SeverityLevel::Critical);
    /// assert_eq!(SeverityLevel::from_text("notice"), SeverityLevel::Unknown);
    /// ```
    #[must_use]
    pub fn from_text(severity: &str) -> Self {
        match severity.trim().to_ascii_lowercase().as_str() {
            "info" | "information" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            "critical" | "fatal" => Self::Critical,
            "debug" | "trace" => Self::Debug,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
            Self::Unknown => write!(f, ""),
        }
    }
}

/// A log record as delivered on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogDto {
    /// ISO-8601 timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Nanoseconds since epoch as a decimal string.
    #[serde(default, deserialize_with = "wire::nanos")]
    pub time_unix_nano: Option<String>,
    /// Severity text as emitted.
    #[serde(default)]
    pub severity: String,
    /// Log body.
    #[serde(default)]
    pub message: String,
    /// Instrumentation scope name.
    #[serde(default)]
    pub scope: String,
    /// Correlated trace id.
    #[serde(default)]
    pub trace_id: Option<String>,
    /// Correlated span id.
    #[serde(default)]
    pub span_id: Option<String>,
    /// Event name for event-style logs.
    #[serde(default)]
    pub event_name: Option<String>,
    /// Emitting resource.
    #[serde(default)]
    pub resource: ResourceDto,
    /// Log attributes.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A log record.
#[derive(Debug, Clone, Serialize)]
pub struct Log {
    /// ISO-8601 timestamp as received (empty when only nanoseconds were sent).
    pub timestamp: String,
    /// Nanoseconds since epoch.
    pub time_ns: i64,
    /// Severity text as emitted.
    pub severity: String,
    /// Normalized severity.
    pub level: SeverityLevel,
    /// Log body.
    pub message: String,
    /// Instrumentation scope name.
    pub scope: String,
    /// Correlated trace id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Correlated span id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// Event name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// Emitting resource.
    pub resource: Resource,
    /// Log attributes.
    pub tags: HashMap<String, String>,
}

impl Log {
    /// Returns true if the log is correlated with the given span.
    #[must_use]
    pub fn belongs_to_span(&self, trace_id: &str, span_id: &str) -> bool {
        self.trace_id.as_deref() == Some(trace_id) && self.span_id.as_deref() == Some(span_id)
    }
}

impl TryFrom<LogDto> for Log {
    type Error = ParseError;

    fn try_from(dto: LogDto) -> Result<Self, Self::Error> {
        let time_ns = resolve_timestamp(
            dto.time_unix_nano.as_deref(),
            dto.timestamp.as_deref(),
            "time_unix_nano",
        )?;

        Ok(Self {
            timestamp: dto.timestamp.unwrap_or_default(),
            time_ns,
            level: SeverityLevel::from_text(&dto.severity),
            severity: dto.severity,
            message: dto.message,
            scope: dto.scope,
            trace_id: wire::non_empty(dto.trace_id),
            span_id: wire::non_empty(dto.span_id),
            event_name: wire::non_empty(dto.event_name),
            resource: Resource::from(dto.resource),
            tags: dto.tags,
        })
    }
}
