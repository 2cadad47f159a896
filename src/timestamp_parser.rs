use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Handles the timestamp and date formats found in session logs
pub struct TimestampParser;

impl TimestampParser {
    /// Convert unix epoch seconds into a UTC datetime
    pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(secs, 0)
    }

    /// UTC calendar date of a unix epoch timestamp
    pub fn unix_date(secs: i64) -> Option<NaiveDate> {
        Self::from_unix(secs).map(|dt| dt.date_naive())
    }

    /// Parse a date cell into a calendar date.
    /// Accepts plain dates as well as datetimes, keeping only the date part.
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        let value = value.trim();

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(date);
        }

        // RFC 3339 carries an offset, normalise to UTC first
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc).date_naive());
        }

        for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(naive.date());
            }
        }

        anyhow::bail!("Failed to parse date: {}", value)
    }
}
