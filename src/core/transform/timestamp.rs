//! Timestamp normalization
//!
//! Loosely-typed timestamp values are parsed into an absolute instant and
//! rendered as RFC3339 with an explicit offset and second precision in the
//! target zone of the flow.

use crate::domain::FieldValue;
use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Utc,
};
use chrono_tz::Tz;

/// Epoch values at or above this magnitude are milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%d %H:%M:%S%.f %#z",
    "%Y-%m-%d %H:%M:%S %#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Zone timestamps are rendered in, and naive timestamps are assumed to be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampZone {
    /// Coordinated universal time
    Utc,
    /// A named IANA zone
    Named(Tz),
}

impl TimestampZone {
    /// Zone used by the order flow
    pub const ORDERS: TimestampZone = TimestampZone::Named(chrono_tz::America::Santiago);

    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, String> {
        match self {
            TimestampZone::Utc => Ok(naive.and_utc()),
            TimestampZone::Named(tz) => match tz.from_local_datetime(&naive) {
                LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                // DST fold: the earlier instant
                LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
                LocalResult::None => Err(format!("{naive} does not exist in {tz}")),
            },
        }
    }

    fn render(&self, instant: DateTime<Utc>) -> String {
        let fixed: DateTime<FixedOffset> = match self {
            TimestampZone::Utc => instant.fixed_offset(),
            TimestampZone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
        };
        fixed.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

/// Parses a timestamp value and renders it in `zone`
///
/// Accepts zoned and naive native timestamps, Unix epoch integers (seconds,
/// or milliseconds for large magnitudes) and the text forms:
///
/// - RFC3339
/// - `YYYY-MM-DD HH:MM:SS[.f]` with an optional `±HH[:MM]` or ` UTC` suffix
/// - `YYYY-MM-DDTHH:MM:SS[.f]`
/// - `YYYY-MM-DD` (midnight)
///
/// # Errors
///
/// Returns a human-readable reason when the value is blank or unparseable.
pub fn normalize_timestamp(value: &FieldValue, zone: TimestampZone) -> Result<String, String> {
    parse_instant(value, zone).map(|instant| zone.render(instant))
}

/// Parses a timestamp value into an absolute instant
pub fn parse_instant(value: &FieldValue, zone: TimestampZone) -> Result<DateTime<Utc>, String> {
    match value {
        FieldValue::Timestamp(dt) => Ok(dt.with_timezone(&Utc)),
        FieldValue::NaiveTimestamp(naive) => zone.localize(*naive),
        FieldValue::Integer(epoch) => from_epoch(*epoch),
        FieldValue::Float(f) if f.is_finite() => from_float_epoch(*f),
        FieldValue::Text(text) if !text.trim().is_empty() => parse_text(text.trim(), zone),
        FieldValue::Bool(_) => Err("boolean is not a timestamp".to_string()),
        _ => Err("value is blank".to_string()),
    }
}

fn from_float_epoch(epoch: f64) -> Result<DateTime<Utc>, String> {
    let floored = epoch.floor();
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if !(i64::MIN as f64..i64::MAX as f64).contains(&floored) {
        return Err(format!("epoch value {epoch} out of range"));
    }
    from_epoch(floored as i64)
}

fn from_epoch(epoch: i64) -> Result<DateTime<Utc>, String> {
    let parsed = if epoch.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    };
    parsed.ok_or_else(|| format!("epoch value {epoch} out of range"))
}

fn parse_text(text: &str, zone: TimestampZone) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(naive_part) = strip_utc_suffix(text) {
        return parse_naive(naive_part)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| unparseable(text));
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    if let Some(naive) = parse_naive(text) {
        return zone.localize(naive);
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return zone.localize(date.and_time(NaiveTime::MIN));
    }

    Err(unparseable(text))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn strip_utc_suffix(text: &str) -> Option<&str> {
    let split = text.len().checked_sub(4)?;
    let tail = text.get(split..)?;
    tail.eq_ignore_ascii_case(" utc")
        .then(|| text[..split].trim_end())
}

fn unparseable(text: &str) -> String {
    format!("unparseable timestamp '{text}'")
}
