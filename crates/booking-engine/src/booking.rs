//! Booking lifecycle: create, cancel, complete, fetch.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::conflict::{check_slot, SlotCheck};
use crate::error::{BookingError, ConflictReason, Result};
use crate::model::{Booking, BookingId, BookingStatus, Customer, NewBooking, ServiceId};
use crate::store::{BookingStore, StoreError};

/// Reject customer details the back office could not act on.
///
/// # Errors
/// Returns `BookingError::Validation` for a blank name or a malformed e-mail.
pub fn validate_customer(customer: &Customer) -> Result<()> {
    if customer.name.trim().is_empty() {
        return Err(BookingError::Validation(
            "customer name must not be empty".to_string(),
        ));
    }
    let email = customer.email.trim();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !well_formed {
        return Err(BookingError::Validation(format!(
            "invalid e-mail address '{}'",
            customer.email
        )));
    }
    Ok(())
}

/// Validate and persist a booking for `service_id` starting at `start`.
///
/// The slot goes through [`check_slot`] first; the store's overlap guard then
/// decides races between concurrent requests. Losing that race is reported as
/// `Conflict(OverlapsExistingBooking)`, the same as a conflict found by the
/// check.
///
/// # Errors
/// - `BookingError::Validation` for bad customer details.
/// - `BookingError::NotFound` if the service is missing or inactive.
/// - `BookingError::Conflict` if the slot is not bookable.
/// - `BookingError::Store` if the store fails. No booking exists in that case.
pub fn create_booking<S: BookingStore + ?Sized>(
    store: &S,
    start: NaiveDateTime,
    service_id: ServiceId,
    customer: Customer,
    now: NaiveDateTime,
) -> Result<Booking> {
    validate_customer(&customer)?;

    let end_time = match check_slot(store, start, service_id, now)? {
        SlotCheck::Available { end_time } => end_time,
        SlotCheck::Unavailable {
            reason: ConflictReason::ServiceNotFound,
        } => return Err(BookingError::service_not_found(service_id)),
        SlotCheck::Unavailable { reason } => return Err(BookingError::Conflict(reason)),
    };

    let new_booking = NewBooking {
        service_id,
        start_time: start,
        end_time,
        customer,
        created_at: now,
    };

    match store.insert_booking(new_booking) {
        Ok(booking) => {
            info!(
                booking_id = booking.id,
                service_id,
                start = %booking.start_time,
                end = %booking.end_time,
                "booking created"
            );
            Ok(booking)
        }
        Err(StoreError::Conflict) => {
            warn!(%start, service_id, "store rejected overlapping booking after check");
            Err(StoreError::Conflict.into())
        }
        Err(err) => Err(BookingError::Store(err)),
    }
}

/// Fetch a booking by id.
///
/// # Errors
/// Returns `BookingError::NotFound` when no booking has `id`.
pub fn get_booking<S: BookingStore + ?Sized>(store: &S, id: BookingId) -> Result<Booking> {
    store
        .find_booking(id)?
        .ok_or_else(|| BookingError::booking_not_found(id))
}

/// Cancel a booking, freeing its slot for subsequent reads.
///
/// Cancelling an already cancelled booking returns it unchanged.
///
/// # Errors
/// Returns `BookingError::NotFound` for an unknown id and
/// `BookingError::Validation` for a completed booking.
pub fn cancel_booking<S: BookingStore + ?Sized>(store: &S, id: BookingId) -> Result<Booking> {
    transition(store, id, BookingStatus::Cancelled)
}

/// Mark a confirmed booking as completed.
///
/// # Errors
/// Returns `BookingError::NotFound` for an unknown id and
/// `BookingError::Validation` for a cancelled booking.
pub fn complete_booking<S: BookingStore + ?Sized>(store: &S, id: BookingId) -> Result<Booking> {
    transition(store, id, BookingStatus::Completed)
}

fn transition<S: BookingStore + ?Sized>(
    store: &S,
    id: BookingId,
    target: BookingStatus,
) -> Result<Booking> {
    let current = get_booking(store, id)?;
    if current.status == target {
        return Ok(current);
    }
    if current.status != BookingStatus::Confirmed {
        return Err(BookingError::Validation(format!(
            "booking {} is {} and cannot become {}",
            id, current.status, target
        )));
    }

    let updated = store
        .update_booking_status(id, BookingStatus::Confirmed, target)?
        .ok_or_else(|| BookingError::booking_not_found(id))?;
    if updated.status != target {
        // Another request changed the booking between the read and the write.
        return Err(BookingError::Validation(format!(
            "booking {} is {} and cannot become {}",
            id, updated.status, target
        )));
    }
    info!(booking_id = id, status = %target, "booking status changed");
    Ok(updated)
}
