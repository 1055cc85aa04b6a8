//! Time normalization and number formatting.
//!
//! All timestamps in the core are `i64` nanoseconds since the Unix epoch.
//! Realistic values (~1.7e18) are beyond the exact range of `f64`, so no
//! `*_ns` value ever passes through floating point.

use chrono::DateTime;
use thiserror::Error;

/// Nanoseconds per millisecond.
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

const SI_SUFFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];

/// Errors raised while normalizing wire timestamps.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The value is not a decimal nanosecond count.
    #[error("Invalid nanosecond timestamp: '{0}'")]
    InvalidNanos(String),

    /// The value is not an ISO-8601 timestamp.
    #[error("Invalid ISO-8601 timestamp: '{0}'")]
    InvalidIso(String),

    /// The ISO-8601 timestamp has no fractional-seconds segment.
    #[error("Timestamp has no fractional seconds: '{0}'")]
    MissingFraction(String),

    /// Neither the nanosecond nor the ISO form of a field was present.
    #[error("Missing timestamp field: {0}")]
    MissingField(&'static str),

    /// The timestamp does not fit in 64 bits of nanoseconds.
    #[error("Timestamp out of range: '{0}'")]
    OutOfRange(String),
}

/// Parses a decimal string of nanoseconds since the epoch.
///
/// # Errors
///
/// Returns [`ParseError::InvalidNanos`] if the string is not a decimal integer
/// that fits in an `i64`.
///
/// # Example
///
/// ```
/// use shared::time::parse_nano_string;
///
/// assert_eq!(parse_nano_string("1704067200000000000").unwrap(), 1_704_067_200_000_000_000);
/// assert!(parse_nano_string("soon").is_err());
/// ```
pub fn parse_nano_string(s: &str) -> Result<i64, ParseError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidNanos(s.to_string()))
}

/// Parses an ISO-8601 timestamp with fractional seconds into nanoseconds.
///
/// The whole-second prefix is parsed as a date-time (UTC unless the suffix
/// carries an offset); the fractional digits are right-padded with zeros or
/// truncated to exactly nine digits.
///
/// # Errors
///
/// Returns [`ParseError::MissingFraction`] when there is no `.` segment,
/// [`ParseError::InvalidIso`] when either part is malformed and
/// [`ParseError::OutOfRange`] when the result overflows `i64`.
///
/// # Example
///
/// ```
/// use shared::time::parse_iso_with_nanos;
///
/// let ns = parse_iso_with_nanos("2024-01-01T00:00:01.5Z").unwrap();
/// assert_eq!(ns, 1_704_067_201_500_000_000);
/// ```
pub fn parse_iso_with_nanos(s: &str) -> Result<i64, ParseError> {
    let (whole, rest) = s
        .split_once('.')
        .ok_or_else(|| ParseError::MissingFraction(s.to_string()))?;

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, offset) = rest.split_at(digits_end);
    if digits.is_empty() {
        return Err(ParseError::InvalidIso(s.to_string()));
    }

    let offset = if offset.is_empty() { "Z" } else { offset };
    let seconds = DateTime::parse_from_rfc3339(&format!("{whole}{offset}"))
        .map_err(|_| ParseError::InvalidIso(s.to_string()))?
        .timestamp();

    let mut fraction: String = digits.chars().take(9).collect();
    while fraction.len() < 9 {
        fraction.push('0');
    }
    let nanos = fraction
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidIso(s.to_string()))?;

    seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|ns| ns.checked_add(nanos))
        .ok_or_else(|| ParseError::OutOfRange(s.to_string()))
}

/// Resolves a timestamp field that may arrive in either wire form.
///
/// The nanosecond string wins when present and non-empty; the ISO form is the
/// fallback.
///
/// # Errors
///
/// Propagates the parse error of whichever form was used, or
/// [`ParseError::MissingField`] when neither is present.
pub fn resolve_timestamp(
    nanos: Option<&str>,
    iso: Option<&str>,
    field: &'static str,
) -> Result<i64, ParseError> {
    match (nanos.filter(|n| !n.is_empty()), iso.filter(|i| !i.is_empty())) {
        (Some(n), _) => parse_nano_string(n),
        (None, Some(i)) => parse_iso_with_nanos(i),
        (None, None) => Err(ParseError::MissingField(field)),
    }
}

/// Truncates nanoseconds to whole milliseconds.
#[must_use]
pub const fn nanos_to_millis(ns: i64) -> i64 {
    ns / NANOS_PER_MILLI
}

/// Formats an integer with `,` thousands separators.
///
/// ```
/// use shared::time::format_grouped;
///
/// assert_eq!(format_grouped(1234567), "1,234,567");
/// assert_eq!(format_grouped(-1000), "-1,000");
/// ```
#[must_use]
pub fn format_grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a span duration as `"<ms>ms <ns>ns"`.
///
/// Zero renders as an empty string; durations under a millisecond omit the
/// millisecond part.
///
/// ```
/// use shared::time::format_duration;
///
/// assert_eq!(format_duration(0), "");
/// assert_eq!(format_duration(999), "999ns");
/// assert_eq!(format_duration(1_234_567_890), "1,234ms 567,890ns");
/// ```
#[must_use]
pub fn format_duration(ns: i64) -> String {
    if ns == 0 {
        return String::new();
    }
    let ms = ns / NANOS_PER_MILLI;
    let remainder = ns % NANOS_PER_MILLI;
    if ms > 0 {
        format!("{}ms {}ns", format_grouped(ms), format_grouped(remainder))
    } else {
        format!("{}ns", format_grouped(remainder))
    }
}

fn strip_trailing_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

const SI_FACTORS: [f64; 8] = [1e3, 1e6, 1e9, 1e12, 1e15, 1e18, 1e21, 1e24];

/// Index into [`SI_SUFFIXES`] for a non-negative magnitude, capped at `Y`.
fn si_exponent(magnitude: f64) -> usize {
    SI_FACTORS.iter().take_while(|f| magnitude >= **f).count()
}

fn si_factor(exponent: usize) -> f64 {
    if exponent == 0 {
        1.0
    } else {
        SI_FACTORS[exponent - 1]
    }
}

/// Formats a number with an SI suffix (`K`, `M`, `G`, ... `Y`).
///
/// Magnitudes below 1000 are returned unscaled. Trailing fractional zeros
/// are stripped. Magnitudes beyond `Y` stay in `Y`.
///
/// ```
/// use shared::time::format_si;
///
/// assert_eq!(format_si(1500.0, 2), "1.5K");
/// assert_eq!(format_si(-1000.0, 2), "-1K");
/// assert_eq!(format_si(999.0, 2), "999");
/// ```
#[must_use]
pub fn format_si(n: f64, precision: usize) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    let exponent = si_exponent(n.abs());
    if exponent == 0 {
        return n.to_string();
    }
    let scaled = n / si_factor(exponent);
    format!(
        "{}{}",
        strip_trailing_zeros(format!("{scaled:.precision$}")),
        SI_SUFFIXES[exponent]
    )
}

/// Formats an axis value, choosing between raw and SI display.
///
/// When the smallest non-zero gap between adjacent ticks is below 1% of the
/// SI unit implied by the largest tick, SI labels would collapse into
/// duplicates, so the raw value (two decimals, zeros stripped) is used.
///
/// ```
/// use shared::time::format_adaptive;
///
/// assert_eq!(format_adaptive(1001.0, &[1000.0, 1001.0, 1002.0]), "1001");
/// assert_eq!(format_adaptive(1100.0, &[1000.0, 1100.0]), "1.1K");
/// ```
#[must_use]
pub fn format_adaptive(value: f64, ticks: &[f64]) -> String {
    if ticks.len() < 2 {
        return format_si(value, 2);
    }

    let min_gap = ticks
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .filter(|gap| *gap > 0.0)
        .fold(f64::INFINITY, f64::min);
    if min_gap.is_infinite() {
        return format_si(value, 2);
    }

    let max_magnitude = ticks.iter().map(|t| t.abs()).fold(0.0, f64::max);
    if max_magnitude == 0.0 {
        return format_si(value, 2);
    }

    let exponent = si_exponent(max_magnitude);
    if exponent > 0 && min_gap < si_factor(exponent) * 0.01 {
        strip_trailing_zeros(format!("{value:.2}"))
    } else {
        format_si(value, 2)
    }
}
