//! Error types for booking-engine operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Why a proposed booking slot cannot be taken.
///
/// The `Display` strings double as the diagnostic reason handed back to
/// callers; every variant is reported to the customer as the same "slot
/// unavailable" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    PastDate,
    ServiceNotFound,
    DateBlocked,
    OutsideAvailableHours,
    StartsOutsideOpeningHours,
    EndsAfterClosing,
    OverlapsExistingBooking,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::PastDate => "past date",
            Self::ServiceNotFound => "service not found",
            Self::DateBlocked => "date blocked",
            Self::OutsideAvailableHours => "outside available hours",
            Self::StartsOutsideOpeningHours => "starts outside opening hours",
            Self::EndsAfterClosing => "ends after closing",
            Self::OverlapsExistingBooking => "conflicts with existing booking",
        };
        f.write_str(reason)
    }
}

/// Errors surfaced by the engine to its callers.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Unknown service or booking.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed date/time input or otherwise invalid request data.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The requested slot cannot be booked.
    #[error("Slot unavailable: {0}")]
    Conflict(ConflictReason),

    /// The data store failed. Never retried by the engine.
    #[error("Store failure: {0}")]
    Store(StoreError),
}

impl BookingError {
    pub(crate) fn service_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: "service",
            id: id.to_string(),
        }
    }

    pub(crate) fn booking_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: "booking",
            id: id.to_string(),
        }
    }
}

/// Store conflicts at insert time are reported exactly like an overlap found
/// by the checker; everything else is a store failure.
impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict(ConflictReason::OverlapsExistingBooking),
            other => Self::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
