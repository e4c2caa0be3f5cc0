//! Time arithmetic and wire-format parsing shared by the resolver, the slot
//! calculator and the conflict checker.
//!
//! Everything runs in one implicit local zone: dates are `YYYY-MM-DD`, rule
//! times `HH:MM:SS` and timestamps ISO 8601. A timestamp carrying an offset is
//! converted to the local zone and the offset dropped.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// A half-open interval `[start, end)` of local timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Weekday index with Sunday = 0, matching how weekly hours are keyed.
pub fn day_of_week(date: NaiveDate) -> u8 {
    // num_days_from_sunday() is always in 0..=6
    date.weekday().num_days_from_sunday() as u8
}

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| BookingError::Validation(format!("invalid date '{}': {}", s, e)))
}

/// Parse a time of day as `HH:MM:SS`, or `HH:MM`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| BookingError::Validation(format!("invalid time of day '{}': {}", s, e)))
}

/// Parse an ISO 8601 timestamp into local time.
///
/// Accepts RFC 3339 (with offset, converted to the local zone) and naive
/// `YYYY-MM-DDTHH:MM[:SS]`, which is taken as already local.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|e| BookingError::Validation(format!("invalid timestamp '{}': {}", s, e)))
}

/// Render a timestamp the way it goes out on the wire.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Render a rule time of day as `HH:MM:SS`.
pub fn format_time_of_day(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}
