//! Enumerate bookable slots for a service on a date.
//!
//! Candidate start times are laid on a fixed grid starting at the opening
//! time. A candidate survives when the whole service fits before closing and
//! it does not overlap a confirmed booking under [`crate::conflict::overlaps`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SlotStep;
use crate::conflict::find_conflict;
use crate::error::{BookingError, Result};
use crate::model::ServiceId;
use crate::resolver::resolve_day;
use crate::store::BookingStore;
use crate::time::TimeRange;

/// A bookable `[start, end)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

impl From<TimeRange> for Slot {
    fn from(range: TimeRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// List the open slots for `service_id` on `date`, in chronological order.
///
/// A closed day yields an empty list, not an error. On the current day,
/// candidates starting before `now` are left out so every listed slot also
/// passes [`crate::conflict::check_slot`]. Results are computed fresh on every
/// call.
///
/// # Errors
/// Returns `BookingError::NotFound` if the service is missing or inactive, and
/// `BookingError::Store` when a store read fails.
pub fn list_slots<S: BookingStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    service_id: ServiceId,
    step: SlotStep,
    now: NaiveDateTime,
) -> Result<Vec<Slot>> {
    let service = store
        .find_active_service(service_id)?
        .ok_or_else(|| BookingError::service_not_found(service_id))?;

    let day = resolve_day(store, date, now.date())?;
    let window = match day.window {
        Some(window) if day.available => window.on(date),
        _ => return Ok(Vec::new()),
    };

    let taken = store.find_confirmed_bookings(date)?;
    let duration = service.duration();
    let step = step.duration();

    let mut slots = Vec::new();
    let mut cursor = window.start;
    while cursor < window.end {
        let candidate = TimeRange::new(cursor, cursor + duration);
        // Later candidates only end later.
        if candidate.end > window.end {
            break;
        }
        if candidate.start >= now && find_conflict(&candidate, &taken).is_none() {
            slots.push(Slot::from(candidate));
        }
        cursor += step;
    }

    debug!(%date, service_id, count = slots.len(), "slots listed");
    Ok(slots)
}
