//! # booking-engine
//!
//! Appointment availability for a single-location small business.
//!
//! Given opening-hours rules (weekly hours, date-specific overrides and
//! blocked dates), a service with a fixed duration and the bookings already
//! confirmed, the engine lists the bookable slots of a day and validates a
//! proposed booking with the same overlap rule, so listing and booking never
//! disagree about what is free.
//!
//! ## Modules
//!
//! - [`resolver`] — effective opening window of a date (blocked > special > regular)
//! - [`slots`] — candidate grid walk producing the open slots of a day
//! - [`conflict`] — half-open overlap predicate and single-slot validation
//! - [`booking`] — create / cancel / complete bookings
//! - [`engine`] — [`BookingEngine`] facade with an injected clock
//! - [`store`] — data-access port; [`memory`] — in-memory adapter and schedule file
//! - [`model`], [`time`], [`config`], [`error`] — records, time helpers, tunables, errors

pub mod booking;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod memory;
pub mod model;
pub mod resolver;
pub mod slots;
pub mod store;
pub mod time;

pub use config::{EngineConfig, SlotStep};
pub use conflict::{check_slot, overlaps, SlotCheck};
pub use engine::BookingEngine;
pub use error::{BookingError, ConflictReason};
pub use memory::{InMemoryStore, Schedule};
pub use model::{
    BlockedDate, Booking, BookingStatus, Customer, OpeningWindow, RegularHours, Service,
    SpecialDate,
};
pub use resolver::{resolve_day, resolve_range, DayAvailability, DaySource};
pub use slots::{list_slots, Slot};
pub use store::{BookingStore, StoreError};
pub use time::TimeRange;
