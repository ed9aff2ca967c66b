use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::HistoryError;

/// Render a byte count with a binary unit suffix.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Render a timestamp for table output. Sub-second digits only appear when
/// the instant carries them.
pub fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// Parse a caller-supplied timestamp. Accepts RFC 3339, a space-separated
/// date-time (UTC assumed), or a bare date (midnight UTC).
pub fn parse_time(input: &str) -> Result<DateTime<Utc>, HistoryError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(input) {
        return Ok(t.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(HistoryError::Validation(format!(
        "unrecognized timestamp '{input}', expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'"
    )))
}
