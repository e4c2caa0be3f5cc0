//! Resolve the effective opening window of a calendar date.
//!
//! Three rule sources can apply to a date. Precedence is fixed:
//! a [`BlockedDate`](crate::model::BlockedDate) closes the day outright, a
//! [`SpecialDate`](crate::model::SpecialDate) overrides the weekly hours, and
//! [`RegularHours`](crate::model::RegularHours) for the weekday apply
//! otherwise. A weekday with no rule at all is closed, and so is every date
//! before today.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BookingError, Result};
use crate::model::OpeningWindow;
use crate::store::BookingStore;
use crate::time::day_of_week;

/// Longest span [`resolve_range`] will resolve in one call.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Which rule decided a day's availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySource {
    Past,
    Blocked,
    Special,
    Regular,
    NoRule,
}

/// The effective window for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<OpeningWindow>,
    pub source: DaySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

impl DayAvailability {
    fn closed(date: NaiveDate, source: DaySource) -> Self {
        Self {
            date,
            available: false,
            window: None,
            source,
            blocked_reason: None,
        }
    }

    fn from_rule(date: NaiveDate, source: DaySource, window: Option<OpeningWindow>) -> Self {
        Self {
            date,
            available: window.is_some(),
            window,
            source,
            blocked_reason: None,
        }
    }

    pub fn open_start(&self) -> Option<NaiveTime> {
        self.window.map(|w| w.open)
    }

    pub fn open_end(&self) -> Option<NaiveTime> {
        self.window.map(|w| w.close)
    }
}

/// Resolve `date` against the store, with `today` as the first bookable day.
///
/// A rule flagged available whose end is not after its start yields a closed
/// day.
///
/// # Errors
/// Returns `BookingError::Store` when a store read fails.
pub fn resolve_day<S: BookingStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<DayAvailability> {
    if date < today {
        return Ok(DayAvailability::closed(date, DaySource::Past));
    }

    if let Some(blocked) = store.find_blocked_date(date)? {
        debug!(%date, reason = ?blocked.reason, "date blocked");
        return Ok(DayAvailability {
            blocked_reason: blocked.reason,
            ..DayAvailability::closed(date, DaySource::Blocked)
        });
    }

    let resolved = if let Some(special) = store.find_special_date(date)? {
        DayAvailability::from_rule(date, DaySource::Special, special.window())
    } else if let Some(regular) = store.find_regular_hours(day_of_week(date))? {
        DayAvailability::from_rule(date, DaySource::Regular, regular.window())
    } else {
        DayAvailability::closed(date, DaySource::NoRule)
    };

    debug!(%date, source = ?resolved.source, available = resolved.available, "day resolved");
    Ok(resolved)
}

/// Resolve every date from `from` to `to` inclusive, for calendar views.
///
/// # Errors
/// Returns `BookingError::Validation` if `to` is before `from` or the range
/// spans more than [`MAX_RANGE_DAYS`] days, and `BookingError::Store` when a
/// store read fails.
pub fn resolve_range<S: BookingStore + ?Sized>(
    store: &S,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<DayAvailability>> {
    if to < from {
        return Err(BookingError::Validation(format!(
            "range end {} is before range start {}",
            to, from
        )));
    }
    let span = (to - from).num_days() + 1;
    if span > MAX_RANGE_DAYS {
        return Err(BookingError::Validation(format!(
            "range of {} days exceeds the maximum of {}",
            span, MAX_RANGE_DAYS
        )));
    }

    from.iter_days()
        .take_while(|date| *date <= to)
        .map(|date| resolve_day(store, date, today))
        .collect()
}
