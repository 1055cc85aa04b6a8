//! Per-trace timeline: the span tree of one trace flattened into rows, with
//! optional correlated logs, and bar geometry relative to the trace's span.

use crate::models::{Log, SeverityLevel, Span};
use crate::storage::{LogStore, TraceStore};
use serde::Serialize;
use std::collections::HashSet;

/// Smallest bar width, in percent, so instant spans stay visible.
pub const MIN_WIDTH_PCT: f64 = 0.5;

/// Whether a row is a span or a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// A span row.
    Span,
    /// A log row nested under its span.
    Log,
}

/// One timeline row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRow {
    /// Nesting depth; roots are 0.
    pub depth: usize,
    /// Span or log.
    pub kind: RowKind,
    /// Span name or log message.
    pub name: String,
    /// The span's id, or the span a log belongs to.
    pub span_id: String,
    /// Start, nanoseconds since epoch.
    pub start_ns: i64,
    /// End, nanoseconds since epoch.
    pub end_ns: i64,
    /// `end_ns - start_ns`; zero for logs.
    pub duration_ns: i64,
    /// Bar offset from the trace start, in percent.
    pub offset_pct: f64,
    /// Bar width, in percent.
    pub width_pct: f64,
    /// Severity of a log row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityLevel>,
}

/// Earliest start and latest end over a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceRange {
    /// Earliest start, nanoseconds since epoch.
    pub start_ns: i64,
    /// Latest end, nanoseconds since epoch.
    pub end_ns: i64,
}

impl TraceRange {
    /// Length of the range in nanoseconds.
    #[must_use]
    pub fn len_ns(&self) -> i128 {
        i128::from(self.end_ns) - i128::from(self.start_ns)
    }

    fn widen(&mut self, time_ns: i64) {
        self.start_ns = self.start_ns.min(time_ns);
        self.end_ns = self.end_ns.max(time_ns);
    }

    /// Bar `(offset, width)` in percent for an interval inside the range.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn geometry(&self, start_ns: i64, duration_ns: i64) -> (f64, f64) {
        let len = self.len_ns();
        if len <= 0 {
            return (0.0, 100.0);
        }
        let len = len as f64;
        let offset = i128::from(start_ns) - i128::from(self.start_ns);
        let offset = (offset as f64 / len * 100.0).clamp(0.0, 100.0);
        let width = (duration_ns as f64 / len * 100.0).max(MIN_WIDTH_PCT);
        (offset, width)
    }
}

/// Trace-details projection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceView {
    /// Trace id.
    pub trace_id: String,
    /// Root-list span keys of the trace (true roots and unresolved orphans).
    pub roots: Vec<String>,
    /// Time range of the trace; `None` when the trace is unknown.
    pub range: Option<TraceRange>,
    /// Depth-first rows.
    pub rows: Vec<TraceRow>,
}

impl TraceView {
    /// Builds the view of `trace_id`.
    ///
    /// With `include_logs`, logs correlated with a span of the trace are
    /// listed right under that span, oldest first, before its children.
    #[must_use]
    pub fn build(traces: &TraceStore, logs: &LogStore, trace_id: &str, include_logs: bool) -> Self {
        let spans = traces.spans_for_trace(trace_id);
        let Some(mut range) = span_range(&spans) else {
            return Self {
                trace_id: trace_id.to_string(),
                ..Self::default()
            };
        };

        if include_logs {
            for log in logs.by_trace(trace_id) {
                range.widen(log.time_ns);
            }
        }

        let roots = traces.roots_for_trace(trace_id);
        let mut builder = RowBuilder {
            traces,
            logs: include_logs.then_some(logs),
            range,
            rows: Vec::new(),
            visited: HashSet::new(),
        };
        for root in &roots {
            builder.visit(root, 0);
        }

        Self {
            trace_id: trace_id.to_string(),
            roots: roots.iter().map(|s| s.key()).collect(),
            range: Some(range),
            rows: builder.rows,
        }
    }

    /// Returns true if no span of the trace is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn span_range(spans: &[&Span]) -> Option<TraceRange> {
    let start_ns = spans.iter().map(|s| s.start_ns).min()?;
    let end_ns = spans.iter().map(|s| s.end_ns).max()?;
    Some(TraceRange { start_ns, end_ns })
}

struct RowBuilder<'a> {
    traces: &'a TraceStore,
    logs: Option<&'a LogStore>,
    range: TraceRange,
    rows: Vec<TraceRow>,
    visited: HashSet<String>,
}

impl RowBuilder<'_> {
    fn visit(&mut self, span: &Span, depth: usize) {
        if !self.visited.insert(span.key()) {
            return;
        }

        let (offset_pct, width_pct) = self.range.geometry(span.start_ns, span.duration_ns);
        self.rows.push(TraceRow {
            depth,
            kind: RowKind::Span,
            name: span.name.clone(),
            span_id: span.span_id.clone(),
            start_ns: span.start_ns,
            end_ns: span.end_ns,
            duration_ns: span.duration_ns,
            offset_pct,
            width_pct,
            severity: None,
        });

        if let Some(logs) = self.logs {
            let mut span_logs: Vec<&Log> = logs.by_span(&span.trace_id, &span.span_id);
            span_logs.sort_by_key(|log| log.time_ns);
            for log in span_logs {
                let (offset_pct, width_pct) = self.range.geometry(log.time_ns, 0);
                self.rows.push(TraceRow {
                    depth: depth + 1,
                    kind: RowKind::Log,
                    name: log.message.clone(),
                    span_id: span.span_id.clone(),
                    start_ns: log.time_ns,
                    end_ns: log.time_ns,
                    duration_ns: 0,
                    offset_pct,
                    width_pct,
                    severity: Some(log.level),
                });
            }
        }

        let traces = self.traces;
        for child in traces.children(span) {
            self.visit(child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogDto, SpanDto};
    use crate::storage::ResourceRegistry;

    fn span(id: &str, parent: Option<&str>, start: i64, end: i64) -> SpanDto {
        serde_json::from_value(serde_json::json!({
            "name": format!("op-{id}"),
            "trace_id": "t",
            "span_id": id,
            "parent_span_id": parent,
            "start_time_unix_nano": start.to_string(),
            "end_time_unix_nano": end.to_string()
        }))
        .unwrap()
    }

    fn log(span_id: &str, time: i64, message: &str) -> LogDto {
        serde_json::from_value(serde_json::json!({
            "time_unix_nano": time.to_string(),
            "severity": "Error",
            "message": message,
            "trace_id": "t",
            "span_id": span_id
        }))
        .unwrap()
    }

    fn fixture() -> (TraceStore, LogStore) {
        let mut traces = TraceStore::new();
        let mut logs = LogStore::new();
        let mut registry = ResourceRegistry::new();

        traces.add_span(span("c", Some("p"), 100, 150), &mut registry).unwrap();
        traces.add_span(span("p", None, 100, 200), &mut registry).unwrap();
        traces.add_span(span("g", Some("c"), 120, 121), &mut registry).unwrap();
        logs.add_log(log("c", 140, "second"), &mut registry).unwrap();
        logs.add_log(log("c", 130, "first"), &mut registry).unwrap();
        logs.add_log(log("p", 250, "late"), &mut registry).unwrap();

        (traces, logs)
    }

    fn names(view: &TraceView) -> Vec<(usize, &str)> {
        view.rows.iter().map(|r| (r.depth, r.name.as_str())).collect()
    }

    #[test]
    fn test_rows_are_depth_first() {
        let (traces, logs) = fixture();
        let view = TraceView::build(&traces, &logs, "t", false);

        assert_eq!(view.roots, vec!["t-p".to_string()]);
        assert_eq!(
            names(&view),
            vec![(0, "op-p"), (1, "op-c"), (2, "op-g")]
        );
        assert_eq!(view.range, Some(TraceRange { start_ns: 100, end_ns: 200 }));
    }

    #[test]
    fn test_geometry_relative_to_trace() {
        let (traces, logs) = fixture();
        let view = TraceView::build(&traces, &logs, "t", false);

        let child = &view.rows[1];
        assert_eq!(child.offset_pct, 0.0);
        assert_eq!(child.width_pct, 50.0);

        let grandchild = &view.rows[2];
        assert_eq!(grandchild.offset_pct, 20.0);
        assert_eq!(grandchild.width_pct, 1.0);
    }

    #[test]
    fn test_logs_nest_under_their_span_oldest_first() {
        let (traces, logs) = fixture();
        let view = TraceView::build(&traces, &logs, "t", true);

        assert_eq!(
            names(&view),
            vec![
                (0, "op-p"),
                (1, "late"),
                (1, "op-c"),
                (2, "first"),
                (2, "second"),
                (2, "op-g"),
            ]
        );
        assert_eq!(view.rows[1].kind, RowKind::Log);
        assert_eq!(view.rows[1].severity, Some(SeverityLevel::Error));
        assert_eq!(view.range, Some(TraceRange { start_ns: 100, end_ns: 250 }));
        assert_eq!(view.rows[1].width_pct, MIN_WIDTH_PCT);
    }

    #[test]
    fn test_unknown_trace_is_empty() {
        let (traces, logs) = fixture();
        let view = TraceView::build(&traces, &logs, "nope", true);

        assert!(view.is_empty());
        assert!(view.roots.is_empty());
        assert!(view.range.is_none());
    }

    #[test]
    fn test_zero_length_trace_fills_width() {
        let mut traces = TraceStore::new();
        let mut registry = ResourceRegistry::new();
        traces.add_span(span("p", None, 5, 5), &mut registry).unwrap();

        let view = TraceView::build(&traces, &LogStore::new(), "t", false);
        assert_eq!(view.rows[0].offset_pct, 0.0);
        assert_eq!(view.rows[0].width_pct, 100.0);
    }

    #[test]
    fn test_range_wider_than_i64_does_not_overflow() {
        let mut traces = TraceStore::new();
        let mut registry = ResourceRegistry::new();
        traces.add_span(span("p", None, -9_000_000_000_000_000_000, 0), &mut registry).unwrap();
        traces.add_span(span("q", None, 0, 9_000_000_000_000_000_000), &mut registry).unwrap();

        let view = TraceView::build(&traces, &LogStore::new(), "t", false);
        let range = view.range.unwrap();
        assert_eq!(range.len_ns(), 18_000_000_000_000_000_000);

        let offsets: Vec<f64> = view.rows.iter().map(|r| r.offset_pct).collect();
        assert_eq!(offsets, vec![0.0, 50.0]);
        assert!(view.rows.iter().all(|r| (r.width_pct - 50.0).abs() < 1e-9));
    }

    #[test]
    fn test_orphans_are_listed_as_roots() {
        let mut traces = TraceStore::new();
        let mut registry = ResourceRegistry::new();
        traces.add_span(span("c", Some("missing"), 0, 10), &mut registry).unwrap();

        let view = TraceView::build(&traces, &LogStore::new(), "t", false);
        assert_eq!(view.roots, vec!["t-c".to_string()]);
        assert_eq!(view.rows[0].depth, 0);
    }
}
