//! [`BookingEngine`]: the store, a clock and configuration bundled behind the
//! operations callers use.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mockable::Clock;

use crate::booking;
use crate::config::{EngineConfig, SlotStep};
use crate::conflict::{self, SlotCheck};
use crate::error::Result;
use crate::model::{Booking, BookingId, Customer, ServiceId};
use crate::resolver::{self, DayAvailability};
use crate::slots::{self, Slot};
use crate::store::BookingStore;

/// Entry point for resolving days, listing slots and managing bookings.
///
/// "Now" and "today" come from the injected clock, read in the local zone.
///
/// ```rust
/// use std::sync::Arc;
/// use booking_engine::{BookingEngine, EngineConfig, InMemoryStore};
///
/// let store = Arc::new(InMemoryStore::new());
/// let clock = Arc::new(mockable::DefaultClock);
/// let engine = BookingEngine::new(store, clock, EngineConfig::default());
/// let today = engine.now().date();
/// assert!(!engine.resolve_day(today).unwrap().available);
/// ```
pub struct BookingEngine<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S: ?Sized> Clone for BookingEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<S: BookingStore + ?Sized> BookingEngine<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Current local wall-clock time.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.local().naive_local()
    }

    pub fn resolve_day(&self, date: NaiveDate) -> Result<DayAvailability> {
        resolver::resolve_day(self.store.as_ref(), date, self.now().date())
    }

    pub fn resolve_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DayAvailability>> {
        resolver::resolve_range(self.store.as_ref(), from, to, self.now().date())
    }

    /// List slots with the configured step.
    pub fn list_slots(&self, date: NaiveDate, service_id: ServiceId) -> Result<Vec<Slot>> {
        self.list_slots_with_step(date, service_id, self.config.slot_step)
    }

    pub fn list_slots_with_step(
        &self,
        date: NaiveDate,
        service_id: ServiceId,
        step: SlotStep,
    ) -> Result<Vec<Slot>> {
        slots::list_slots(self.store.as_ref(), date, service_id, step, self.now())
    }

    pub fn check_slot(&self, start: NaiveDateTime, service_id: ServiceId) -> Result<SlotCheck> {
        conflict::check_slot(self.store.as_ref(), start, service_id, self.now())
    }

    pub fn create_booking(
        &self,
        start: NaiveDateTime,
        service_id: ServiceId,
        customer: Customer,
    ) -> Result<Booking> {
        booking::create_booking(self.store.as_ref(), start, service_id, customer, self.now())
    }

    pub fn get_booking(&self, id: BookingId) -> Result<Booking> {
        booking::get_booking(self.store.as_ref(), id)
    }

    pub fn cancel_booking(&self, id: BookingId) -> Result<Booking> {
        booking::cancel_booking(self.store.as_ref(), id)
    }

    pub fn complete_booking(&self, id: BookingId) -> Result<Booking> {
        booking::complete_booking(self.store.as_ref(), id)
    }
}
