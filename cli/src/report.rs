//! Plain-text reports over a replayed hub.

use shared::chrono::DateTime;
use shared::filter::FilterSet;
use shared::ingest::Telemetry;
use shared::models::{Log, Span};
use shared::projection::{table_data, SeriesSelector};
use shared::storage::SpanNode;
use shared::time::{format_adaptive, format_duration, format_grouped};
use std::io::{self, Write};

const INDENT: &str = "  ";

/// Hub counters, as text or pretty JSON.
pub fn summary(
    telemetry: &Telemetry,
    skipped: usize,
    json: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let stats = telemetry.stats();
    if json {
        serde_json::to_writer_pretty(&mut *out, &stats)?;
        return writeln!(out);
    }

    writeln!(out, "Replayed records (revision {})", stats.revision)?;
    writeln!(out, "{INDENT}spans:        {}", format_grouped(count(stats.spans)))?;
    writeln!(out, "{INDENT}roots:        {}", format_grouped(count(stats.roots)))?;
    writeln!(out, "{INDENT}pending:      {}", format_grouped(count(stats.pending_parents)))?;
    writeln!(out, "{INDENT}logs:         {}", format_grouped(count(stats.logs)))?;
    writeln!(out, "{INDENT}series:       {}", format_grouped(count(stats.metric_series)))?;
    writeln!(out, "{INDENT}data points:  {}", format_grouped(count(stats.data_points)))?;
    writeln!(out, "{INDENT}skipped:      {}", format_grouped(count(skipped)))
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Registered resources in first-seen order.
pub fn resources(telemetry: &Telemetry, out: &mut impl Write) -> io::Result<()> {
    let resources = telemetry.resources().resources();
    writeln!(out, "\nResources ({})", resources.len())?;
    for resource in resources {
        writeln!(out, "{INDENT}{}  [{}]", resource.label(), resource.key())?;
    }
    Ok(())
}

/// Span trees, optionally limited to one trace and to roots passing `filters`.
pub fn traces(
    telemetry: &Telemetry,
    trace_id: Option<&str>,
    filters: &FilterSet,
    out: &mut impl Write,
) -> io::Result<()> {
    let store = telemetry.traces();
    let roots: Vec<&Span> = match trace_id {
        Some(trace_id) => store.roots_for_trace(trace_id),
        None => store.roots(),
    }
    .into_iter()
    .filter(|span| filters.matches(span))
    .collect();

    writeln!(out, "\nTraces ({} roots)", roots.len())?;
    for node in store.trees(&roots) {
        write_node(&node, 1, out)?;
    }
    Ok(())
}

fn write_node(node: &SpanNode<'_>, depth: usize, out: &mut impl Write) -> io::Result<()> {
    let span = node.span;
    let mut line = format!("{}{} [{}]", INDENT.repeat(depth), span.name, span.kind);
    let duration = format_duration(span.duration_ns);
    if !duration.is_empty() {
        line.push(' ');
        line.push_str(&duration);
    }
    if span.status.code != shared::models::StatusCode::Unset {
        line.push_str(&format!(" status={}", span.status.code));
    }
    line.push_str(&format!(" ({})", span.resource.label()));
    writeln!(out, "{line}")?;

    for child in &node.children {
        write_node(child, depth + 1, out)?;
    }
    Ok(())
}

/// Logs newest first, optionally limited to one trace and to `filters`.
pub fn logs(
    telemetry: &Telemetry,
    trace_id: Option<&str>,
    filters: &FilterSet,
    out: &mut impl Write,
) -> io::Result<()> {
    let store = telemetry.logs();
    let logs: Vec<&Log> = match trace_id {
        Some(trace_id) => store.by_trace(trace_id),
        None => store.logs().iter().collect(),
    }
    .into_iter()
    .filter(|log| filters.matches(log))
    .collect();

    writeln!(out, "\nLogs ({})", logs.len())?;
    for log in logs {
        let level = log.level.to_string();
        let level = if level.is_empty() { &log.severity } else { &level };
        writeln!(
            out,
            "{INDENT}{} {:<8} {} {}",
            log_time(log),
            level,
            log.resource.service_name(),
            log.message
        )?;
    }
    Ok(())
}

fn log_time(log: &Log) -> String {
    if !log.timestamp.is_empty() {
        return log.timestamp.clone();
    }
    DateTime::from_timestamp_nanos(log.time_ns)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Table rows of every series named `name`, one table per unit and type.
pub fn metric_tables(telemetry: &Telemetry, name: &str, out: &mut impl Write) -> io::Result<()> {
    let metrics = telemetry.metrics().metrics();
    let mut selectors: Vec<SeriesSelector> = Vec::new();
    for metric in metrics.iter().filter(|m| m.name == name) {
        let selector = SeriesSelector::from(metric);
        if !selectors.contains(&selector) {
            selectors.push(selector);
        }
    }

    if selectors.is_empty() {
        return writeln!(out, "\nNo metric named '{name}'");
    }

    for selector in &selectors {
        let rows = table_data(selector, metrics, None, None);
        let mut ticks: Vec<f64> = rows.iter().map(|r| r.value).collect();
        ticks.sort_by(f64::total_cmp);

        writeln!(
            out,
            "\n{} ({}) {} - {} rows",
            selector.name,
            if selector.unit.is_empty() { "-" } else { &selector.unit },
            selector.metric_type,
            rows.len()
        )?;
        for row in &rows {
            let mut line = format!(
                "{INDENT}{}  {}  {}",
                row.timestamp,
                row.resource,
                format_adaptive(row.value, &ticks)
            );
            if let (Some(p50), Some(p95), Some(p99)) = (row.p50, row.p95, row.p99) {
                line.push_str(&format!(
                    "  p50={} p95={} p99={}",
                    format_adaptive(p50, &ticks),
                    format_adaptive(p95, &ticks),
                    format_adaptive(p99, &ticks)
                ));
            }
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(lines: &[&str]) -> Telemetry {
        let mut telemetry = Telemetry::default();
        for line in lines {
            telemetry.ingest_json(line).unwrap();
        }
        telemetry
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    const ROOT: &str = r#"{"topic": "traces", "payload": {"name": "GET /", "trace_id": "t", "span_id": "p", "kind": "SPAN_KIND_SERVER", "start_time_unix_nano": "0", "end_time_unix_nano": "1234567890", "resource": {"service_name": "api", "service_instance_id": "0123456789"}}}"#;
    const CHILD: &str = r#"{"topic": "traces", "payload": {"name": "SELECT", "trace_id": "t", "span_id": "c", "parent_span_id": "p", "kind": "SPAN_KIND_CLIENT", "status": {"code": "STATUS_CODE_ERROR"}, "start_time_unix_nano": "10", "end_time_unix_nano": "510", "resource": {"service_name": "api", "service_instance_id": "0123456789"}}}"#;

    #[test]
    fn test_traces_are_indented_trees() {
        let telemetry = hub(&[CHILD, ROOT]);

        let text = render(|out| traces(&telemetry, None, &FilterSet::new(), out));

        assert!(text.contains("Traces (1 roots)"));
        assert!(text.contains("\n  GET / [server] 1,234ms 567,890ns (api (01234567))\n"));
        assert!(text.contains("\n    SELECT [client] 500ns status=error (api (01234567))\n"));
    }

    #[test]
    fn test_traces_filtered_by_trace_and_attribute() {
        let telemetry = hub(&[ROOT]);

        let text = render(|out| traces(&telemetry, Some("other"), &FilterSet::new(), out));
        assert!(text.contains("Traces (0 roots)"));

        let mut filters = FilterSet::new();
        filters.add("name", "GET /");
        let text = render(|out| traces(&telemetry, None, &filters, out));
        assert!(text.contains("Traces (1 roots)"));
    }

    #[test]
    fn test_logs_newest_first() {
        let telemetry = hub(&[
            r#"{"topic": "logs", "payload": {"time_unix_nano": "1000", "severity": "INFO", "message": "first"}}"#,
            r#"{"topic": "logs", "payload": {"time_unix_nano": "2000", "severity": "custom", "message": "second"}}"#,
        ]);

        let text = render(|out| logs(&telemetry, None, &FilterSet::new(), out));

        let second = text.find("second").unwrap();
        let first = text.find("first").unwrap();
        assert!(second < first);
        assert!(text.contains("custom"));
        assert!(text.contains("info"));
        assert!(text.contains("1970-01-01 00:00:00.000"));
    }

    #[test]
    fn test_metric_table_uses_adaptive_values() {
        let telemetry = hub(&[
            r#"{"topic": "metrics", "payload": {"name": "bytes", "unit": "By", "data": {"t": "Gauge", "data_points": [{"time_unix_nano": "1000000000", "value": 1500}, {"time_unix_nano": "2000000000", "value": 2500}]}}}"#,
        ]);

        let text = render(|out| metric_tables(&telemetry, "bytes", out));

        assert!(text.contains("bytes (By) Gauge - 2 rows"));
        assert!(text.contains("1.5K"));
        assert!(text.contains("2.5K"));
        assert!(text.find("2.5K").unwrap() < text.find("1.5K").unwrap());

        let text = render(|out| metric_tables(&telemetry, "missing", out));
        assert!(text.contains("No metric named 'missing'"));
    }

    #[test]
    fn test_summary_json() {
        let telemetry = hub(&[ROOT]);

        let text = render(|out| summary(&telemetry, 2, true, out));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["spans"], 1);

        let text = render(|out| summary(&telemetry, 2, false, out));
        assert!(text.contains("skipped:      2"));
    }

    #[test]
    fn test_resources_list() {
        let telemetry = hub(&[ROOT]);

        let text = render(|out| resources(&telemetry, out));
        assert!(text.contains("Resources (1)"));
        assert!(text.contains("api (01234567)  [|api||0123456789]"));
    }
}
