//! Per-channel scan cursor: the creation time of the last processed message.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Format the cursor is written in, e.g. `2024-06-01 12:00:00.123000+0000`.
pub const CURSOR_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%z";

const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%z";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized cursor timestamp {value:?}")]
pub struct CursorError {
    /// The stored value.
    pub value: String,
}

/// Where a channel without a stored cursor starts: 2024-01-01T00:00:00Z.
#[must_use]
pub fn default_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parses a stored cursor. Missing or empty values yield [`default_start`].
///
/// Accepted, most specific first: `YYYY-MM-DD HH:MM:SS.ffffff±HHMM`,
/// `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`; the last two are UTC.
///
/// # Errors
/// Returns error for any other shape.
pub fn parse_cursor(stored: Option<&str>) -> Result<DateTime<Utc>, CursorError> {
    let Some(value) = stored.filter(|s| !s.is_empty()) else {
        return Ok(default_start());
    };

    if let Ok(dt) = DateTime::parse_from_str(value, OFFSET_FORMAT) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(CursorError {
        value: value.to_string(),
    })
}

/// Formats a message creation time for storage.
#[must_use]
pub fn format_cursor(time: DateTime<Utc>) -> String {
    time.format(CURSOR_FORMAT).to_string()
}
