//! Conversions between calendar time and the Unix epoch seconds used on the wire

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Whole seconds since the Unix epoch, truncating sub-second precision.
pub fn epoch_seconds<Tz: TimeZone>(ts: &DateTime<Tz>) -> i64 {
    ts.timestamp()
}

/// Inverse of [`epoch_seconds`]. Fractional seconds are kept to nanosecond
/// precision.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
}

/// Interprets a timestamp without zone information as local time.
///
/// Ambiguous local times (clocks turned back) resolve to the earlier instant;
/// nonexistent ones (clocks turned forward) give `None`.
pub fn local_to_utc(naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(naive)
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Parses `%Y-%m-%d %H:%M:%S` as local time, RFC 3339 as given, or a bare
/// number as epoch seconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return local_to_utc(&naive);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_to_utc(&date.and_hms_opt(0, 0, 0)?);
    }
    s.parse::<f64>().ok().and_then(from_epoch_seconds)
}
