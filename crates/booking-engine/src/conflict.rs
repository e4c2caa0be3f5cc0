//! The overlap predicate and single-slot validation.
//!
//! [`overlaps`] is the one definition of "taken" used both when listing slots
//! and when validating a booking, so the two can never disagree. Adjacent
//! ranges (one ends exactly when the other starts) are NOT conflicts.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{ConflictReason, Result};
use crate::model::ServiceId;
use crate::resolver::{resolve_day, DaySource};
use crate::store::BookingStore;
use crate::time::TimeRange;

/// Half-open overlap: `[a1, a2)` and `[b1, b2)` overlap iff `a1 < b2 && b1 < a2`.
pub fn overlaps(a: &TimeRange, b: &TimeRange) -> bool {
    a.start < b.end && b.start < a.end
}

/// First range in `taken` that overlaps `candidate`, if any.
pub fn find_conflict<'a>(candidate: &TimeRange, taken: &'a [TimeRange]) -> Option<&'a TimeRange> {
    taken.iter().find(|busy| overlaps(candidate, busy))
}

/// Outcome of validating one proposed start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCheck {
    Available { end_time: NaiveDateTime },
    Unavailable { reason: ConflictReason },
}

impl SlotCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Validate booking `service_id` at `start`, as seen at `now`.
///
/// Checks run in a fixed order and the first failing one decides the reason:
/// past date, unknown service, blocked date, closed day, start outside the
/// opening window, end after closing, overlap with a confirmed booking.
///
/// The result is advisory. Only the store's insert guard makes it binding.
///
/// # Errors
/// Returns `BookingError::Store` when a store read fails.
pub fn check_slot<S: BookingStore + ?Sized>(
    store: &S,
    start: NaiveDateTime,
    service_id: ServiceId,
    now: NaiveDateTime,
) -> Result<SlotCheck> {
    let reject = |reason: ConflictReason| {
        debug!(%start, service_id, %reason, "slot rejected");
        Ok(SlotCheck::Unavailable { reason })
    };

    if start < now {
        return reject(ConflictReason::PastDate);
    }

    let Some(service) = store.find_active_service(service_id)? else {
        return reject(ConflictReason::ServiceNotFound);
    };

    let date = start.date();
    let day = resolve_day(store, date, now.date())?;
    let window = match (day.source, day.window) {
        (DaySource::Blocked, _) => return reject(ConflictReason::DateBlocked),
        (DaySource::Past, _) => return reject(ConflictReason::PastDate),
        (_, Some(window)) if day.available => window.on(date),
        _ => return reject(ConflictReason::OutsideAvailableHours),
    };

    let candidate = TimeRange::new(start, start + service.duration());
    if candidate.start < window.start || candidate.start >= window.end {
        return reject(ConflictReason::StartsOutsideOpeningHours);
    }
    if candidate.end > window.end {
        return reject(ConflictReason::EndsAfterClosing);
    }

    let taken = store.find_confirmed_bookings(date)?;
    if find_conflict(&candidate, &taken).is_some() {
        return reject(ConflictReason::OverlapsExistingBooking);
    }

    Ok(SlotCheck::Available {
        end_time: candidate.end,
    })
}
