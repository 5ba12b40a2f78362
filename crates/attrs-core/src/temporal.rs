//! # Temporal Parsing — UTC-Normalized Dates and Date/Times
//!
//! Text-to-date conversions used by the `date` and `datetime` primitive
//! kinds, and the matching output formats used when flattening.
//!
//! ## Normalization
//!
//! Every date/time held by an attribute is UTC. Inputs with an explicit
//! offset (`+05:30`, `-04:00`) are converted; naive inputs
//! (`2026-01-15 12:00:00`) are assumed to already be UTC. Output uses the
//! `Z` suffix and omits sub-second digits when they are zero, so that
//! `format_datetime(parse_datetime(s)?)` is stable under repetition.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a calendar date from `YYYY-MM-DD` or from any RFC 3339 date/time
/// (taking its UTC date).
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(d);
    }
    parse_datetime(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("invalid date {s:?}"))
}

/// Parse an instant, normalizing to UTC.
///
/// Accepts RFC 3339 with any offset, naive `YYYY-MM-DD[T ]HH:MM:SS[.f]`
/// (assumed UTC), and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(midnight_utc(d));
    }
    Err(format!("invalid date/time {s:?}"))
}

/// Create an instant from a Unix epoch timestamp (seconds).
pub fn from_epoch_secs(secs: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("invalid Unix timestamp: {secs}"))
}

/// Midnight UTC at the start of a date.
pub fn midnight_utc(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Render an instant as RFC 3339 with `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
