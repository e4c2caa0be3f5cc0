//! Data-access port consumed by the engine.
//!
//! The engine never talks to a database directly; it reads opening-hours
//! rules, services and bookings through [`BookingStore`] and writes bookings
//! back through it. [`crate::memory::InMemoryStore`] is the bundled adapter.
//!
//! Checking a slot and inserting the booking are two separate calls, so two
//! concurrent requests can both pass the check. Implementations close that
//! race: `insert_booking` must refuse a confirmed booking that overlaps
//! another confirmed booking on the same date, returning
//! [`StoreError::Conflict`], and that check and the write must be atomic.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{
    BlockedDate, Booking, BookingId, BookingStatus, NewBooking, RegularHours, Service, ServiceId,
    SpecialDate,
};
use crate::time::TimeRange;

/// Errors raised by store adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The insert would overlap an existing confirmed booking.
    #[error("booking overlaps an existing confirmed booking")]
    Conflict,

    /// The store could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// A query or mutation failed while executing.
    #[error("store query failed: {message}")]
    Query { message: String },

    /// Stored or loaded records break a data-model invariant.
    #[error("invalid store data: {message}")]
    Invalid { message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Port for reading opening-hours rules and reading/writing bookings.
#[cfg_attr(test, mockall::automock)]
pub trait BookingStore: Send + Sync {
    fn find_blocked_date(&self, date: NaiveDate) -> StoreResult<Option<BlockedDate>>;

    fn find_special_date(&self, date: NaiveDate) -> StoreResult<Option<SpecialDate>>;

    /// Weekly hours for `day_of_week` (0 = Sunday).
    fn find_regular_hours(&self, day_of_week: u8) -> StoreResult<Option<RegularHours>>;

    /// The service with `id`, only when it is active.
    fn find_active_service(&self, id: ServiceId) -> StoreResult<Option<Service>>;

    /// Windows of all confirmed bookings on `date`.
    fn find_confirmed_bookings(&self, date: NaiveDate) -> StoreResult<Vec<TimeRange>>;

    /// Persist a confirmed booking, failing with [`StoreError::Conflict`] when
    /// it overlaps another confirmed booking.
    fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking>;

    fn find_booking(&self, id: BookingId) -> StoreResult<Option<Booking>>;

    /// Set the status of a booking to `status` only if it is still
    /// `expected`, atomically. Returns the row as it stands afterwards, which
    /// keeps its old status when `expected` no longer held, or `None` when no
    /// booking has that id.
    fn update_booking_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> StoreResult<Option<Booking>>;
}
