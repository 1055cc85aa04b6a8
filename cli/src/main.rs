//! OTel Inspect CLI
//!
//! Command-line interface for replaying captured telemetry through the
//! ingestion core and printing what it assembles.
//!
//! # Usage
//!
//! ```bash
//! otel-inspect --help
//! otel-inspect replay capture.ndjson --logs
//! otel-inspect replay capture.ndjson --trace-id 5b8aa5a2 --filter tags.http.method=GET
//! otel-inspect replay capture.ndjson --metric http.server.duration
//! otel-inspect format si 1500000
//! otel-inspect format duration 1234567890
//! ```

#![deny(unsafe_code)]

mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shared::config::RetentionConfig;
use shared::filter::FilterSet;
use shared::ingest::Telemetry;
use shared::storage::DEFAULT_MAX_DATA_POINTS;
use shared::time::{format_duration, format_si};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// OTel Inspect CLI - replay and inspect OpenTelemetry captures
#[derive(Parser)]
#[command(name = "otel-inspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a newline-delimited JSON capture of envelopes
    Replay(ReplayArgs),
    /// Format numbers the way the projections do
    Format {
        #[command(subcommand)]
        what: FormatCommand,
    },
}

#[derive(Args)]
struct ReplayArgs {
    /// Capture file, one `{"topic": ..., "payload": ...}` envelope per line
    file: PathBuf,

    /// Only print the trees of this trace
    #[arg(long)]
    trace_id: Option<String>,

    /// Also print the log list
    #[arg(long)]
    logs: bool,

    /// Print the table rows of every series with this name
    #[arg(long)]
    metric: Option<String>,

    /// Only print spans and logs matching KEY=VALUE (repeatable, any match)
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Points kept per metric series
    #[arg(
        long,
        env = "OTEL_INSPECT_MAX_DATA_POINTS",
        default_value_t = DEFAULT_MAX_DATA_POINTS
    )]
    max_data_points: usize,

    /// Print the summary counters as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum FormatCommand {
    /// Format a number with an SI suffix
    Si {
        /// Value to format
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Fraction digits before trailing zeros are stripped
        #[arg(long, default_value_t = 2)]
        precision: usize,
    },
    /// Format a span duration given in nanoseconds
    Duration {
        /// Duration in nanoseconds
        nanos: i64,
    },
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::Replay(args)) => replay(&args, &mut out)?,
        Some(Commands::Format { what }) => match what {
            FormatCommand::Si { value, precision } => {
                writeln!(out, "{}", format_si(value, precision))?;
            }
            FormatCommand::Duration { nanos } => writeln!(out, "{}", format_duration(nanos))?,
        },
        None => {
            writeln!(out, "OTel Inspect CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Use --help for usage information")?;
        }
    }

    Ok(())
}

fn replay(args: &ReplayArgs, out: &mut impl Write) -> Result<()> {
    let retention = RetentionConfig::new(args.max_data_points);
    retention.validate_config()?;

    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let mut telemetry = Telemetry::new(&retention);
    let skipped = replay_lines(&mut telemetry, BufReader::new(file))?;

    let mut filters = FilterSet::new();
    for (key, value) in &args.filters {
        filters.add(key.as_str(), value.as_str());
    }

    report::summary(&telemetry, skipped, args.json, out)?;
    report::resources(&telemetry, out)?;
    report::traces(&telemetry, args.trace_id.as_deref(), &filters, out)?;
    if args.logs {
        report::logs(&telemetry, args.trace_id.as_deref(), &filters, out)?;
    }
    if let Some(name) = &args.metric {
        report::metric_tables(&telemetry, name, out)?;
    }
    Ok(())
}

/// Feeds every non-blank line into the hub; bad lines are logged and
/// skipped. Returns the number of skipped lines.
fn replay_lines(telemetry: &mut Telemetry, reader: impl BufRead) -> Result<usize> {
    let mut skipped = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read capture")?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = telemetry.ingest_json(&line) {
            tracing::warn!(line = index + 1, error = %e, "Skipping record");
            skipped += 1;
        }
    }
    tracing::info!(skipped, revision = telemetry.revision(), "Replay finished");
    Ok(skipped)
}
