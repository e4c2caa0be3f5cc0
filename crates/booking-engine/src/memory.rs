//! In-memory [`BookingStore`] backed by a JSON-serializable [`Schedule`].
//!
//! Rules and bookings live in separate `RwLock`ed tables. The overlap guard
//! for inserts runs under the bookings write lock, so at most one of several
//! concurrent overlapping inserts succeeds.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::conflict::overlaps;
use crate::model::{
    BlockedDate, Booking, BookingId, BookingStatus, NewBooking, RegularHours, Service, ServiceId,
    SpecialDate,
};
use crate::store::{BookingStore, StoreError, StoreResult};
use crate::time::TimeRange;

/// Everything the store holds, in the shape it is saved to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub regular_hours: Vec<RegularHours>,
    #[serde(default)]
    pub special_dates: Vec<SpecialDate>,
    #[serde(default)]
    pub blocked_dates: Vec<BlockedDate>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl Schedule {
    /// Parse a schedule from JSON.
    ///
    /// # Errors
    /// Returns `StoreError::Invalid` when the JSON does not match the schema.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| invalid(format!("schedule JSON: {}", e)))
    }

    /// Render the schedule as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `StoreError::Invalid` if serialization fails.
    pub fn to_json_pretty(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| invalid(format!("schedule JSON: {}", e)))
    }
}

fn invalid(message: String) -> StoreError {
    StoreError::Invalid { message }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        message: "store lock poisoned".to_string(),
    }
}

#[derive(Debug, Default)]
struct Rules {
    services: BTreeMap<ServiceId, Service>,
    regular_hours: BTreeMap<u8, RegularHours>,
    special_dates: BTreeMap<NaiveDate, SpecialDate>,
    blocked_dates: BTreeMap<NaiveDate, BlockedDate>,
}

#[derive(Debug, Default)]
struct Bookings {
    rows: BTreeMap<BookingId, Booking>,
    next_id: BookingId,
}

impl Bookings {
    fn overlapping_confirmed(
        &self,
        date: NaiveDate,
        range: &TimeRange,
        skip: Option<BookingId>,
    ) -> bool {
        self.rows.values().any(|b| {
            Some(b.id) != skip && b.is_confirmed() && b.date == date && overlaps(&b.range(), range)
        })
    }
}

/// A [`BookingStore`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rules: RwLock<Rules>,
    bookings: RwLock<Bookings>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a schedule, validating every record.
    ///
    /// # Errors
    /// Returns `StoreError::Invalid` for duplicate keys, weekdays outside
    /// 0-6, available rules whose end is not after their start, zero-length
    /// services, inverted booking windows, or overlapping confirmed bookings.
    pub fn from_schedule(schedule: Schedule) -> StoreResult<Self> {
        let store = Self::new();
        for service in schedule.services {
            if store.find_service(service.id)?.is_some() {
                return Err(invalid(format!("duplicate service id {}", service.id)));
            }
            store.upsert_service(service)?;
        }
        for hours in schedule.regular_hours {
            if store.read_rules()?.regular_hours.contains_key(&hours.day_of_week) {
                return Err(invalid(format!(
                    "more than one regular hours row for day {}",
                    hours.day_of_week
                )));
            }
            store.set_regular_hours(hours)?;
        }
        for special in schedule.special_dates {
            if store.read_rules()?.special_dates.contains_key(&special.date) {
                return Err(invalid(format!("duplicate special date {}", special.date)));
            }
            store.set_special_date(special)?;
        }
        for blocked in schedule.blocked_dates {
            if store.read_rules()?.blocked_dates.contains_key(&blocked.date) {
                return Err(invalid(format!("duplicate blocked date {}", blocked.date)));
            }
            store.block_date(blocked)?;
        }
        for booking in schedule.bookings {
            store.load_booking(booking)?;
        }
        Ok(store)
    }

    /// Copy the current contents out as a [`Schedule`].
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if a lock is poisoned.
    pub fn snapshot(&self) -> StoreResult<Schedule> {
        let rules = self.read_rules()?;
        let bookings = self.read_bookings()?;
        Ok(Schedule {
            services: rules.services.values().cloned().collect(),
            regular_hours: rules.regular_hours.values().cloned().collect(),
            special_dates: rules.special_dates.values().cloned().collect(),
            blocked_dates: rules.blocked_dates.values().cloned().collect(),
            bookings: bookings.rows.values().cloned().collect(),
        })
    }

    /// Look a service up regardless of its active flag.
    pub fn find_service(&self, id: ServiceId) -> StoreResult<Option<Service>> {
        Ok(self.read_rules()?.services.get(&id).cloned())
    }

    pub fn upsert_service(&self, service: Service) -> StoreResult<()> {
        if service.duration_minutes == 0 {
            return Err(invalid(format!("service {} has zero duration", service.id)));
        }
        self.write_rules()?.services.insert(service.id, service);
        Ok(())
    }

    /// Replace the weekly hours for one weekday.
    pub fn set_regular_hours(&self, hours: RegularHours) -> StoreResult<()> {
        if hours.day_of_week > 6 {
            return Err(invalid(format!(
                "day of week {} outside 0-6",
                hours.day_of_week
            )));
        }
        if hours.is_available && hours.window().is_none() {
            return Err(invalid(format!(
                "regular hours for day {} end at or before they start",
                hours.day_of_week
            )));
        }
        self.write_rules()?
            .regular_hours
            .insert(hours.day_of_week, hours);
        Ok(())
    }

    pub fn set_special_date(&self, special: SpecialDate) -> StoreResult<()> {
        if special.is_available && special.window().is_none() {
            return Err(invalid(format!(
                "special hours for {} end at or before they start",
                special.date
            )));
        }
        self.write_rules()?.special_dates.insert(special.date, special);
        Ok(())
    }

    pub fn remove_special_date(&self, date: NaiveDate) -> StoreResult<bool> {
        Ok(self.write_rules()?.special_dates.remove(&date).is_some())
    }

    pub fn block_date(&self, blocked: BlockedDate) -> StoreResult<()> {
        self.write_rules()?.blocked_dates.insert(blocked.date, blocked);
        Ok(())
    }

    pub fn unblock_date(&self, date: NaiveDate) -> StoreResult<bool> {
        Ok(self.write_rules()?.blocked_dates.remove(&date).is_some())
    }

    /// Every booking on `date`, any status, ordered by start.
    pub fn bookings_on(&self, date: NaiveDate) -> StoreResult<Vec<Booking>> {
        let mut rows: Vec<Booking> = self
            .read_bookings()?
            .rows
            .values()
            .filter(|b| b.date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.start_time, b.id));
        Ok(rows)
    }

    fn load_booking(&self, booking: Booking) -> StoreResult<()> {
        if booking.end_time <= booking.start_time {
            return Err(invalid(format!("booking {} ends before it starts", booking.id)));
        }
        if booking.start_time.date() != booking.date {
            return Err(invalid(format!(
                "booking {} starts outside its date {}",
                booking.id, booking.date
            )));
        }
        let mut table = self.write_bookings()?;
        if table.rows.contains_key(&booking.id) {
            return Err(invalid(format!("duplicate booking id {}", booking.id)));
        }
        if booking.is_confirmed()
            && table.overlapping_confirmed(booking.date, &booking.range(), None)
        {
            return Err(invalid(format!(
                "booking {} overlaps another confirmed booking",
                booking.id
            )));
        }
        let after = booking.id.checked_add(1).ok_or_else(|| {
            invalid(format!("booking id {} leaves no room for new ids", booking.id))
        })?;
        table.next_id = table.next_id.max(after);
        table.rows.insert(booking.id, booking);
        Ok(())
    }

    fn read_rules(&self) -> StoreResult<RwLockReadGuard<'_, Rules>> {
        self.rules.read().map_err(|_| poisoned())
    }

    fn write_rules(&self) -> StoreResult<RwLockWriteGuard<'_, Rules>> {
        self.rules.write().map_err(|_| poisoned())
    }

    fn read_bookings(&self) -> StoreResult<RwLockReadGuard<'_, Bookings>> {
        self.bookings.read().map_err(|_| poisoned())
    }

    fn write_bookings(&self) -> StoreResult<RwLockWriteGuard<'_, Bookings>> {
        self.bookings.write().map_err(|_| poisoned())
    }
}

impl BookingStore for InMemoryStore {
    fn find_blocked_date(&self, date: NaiveDate) -> StoreResult<Option<BlockedDate>> {
        Ok(self.read_rules()?.blocked_dates.get(&date).cloned())
    }

    fn find_special_date(&self, date: NaiveDate) -> StoreResult<Option<SpecialDate>> {
        Ok(self.read_rules()?.special_dates.get(&date).cloned())
    }

    fn find_regular_hours(&self, day_of_week: u8) -> StoreResult<Option<RegularHours>> {
        Ok(self.read_rules()?.regular_hours.get(&day_of_week).cloned())
    }

    fn find_active_service(&self, id: ServiceId) -> StoreResult<Option<Service>> {
        Ok(self
            .read_rules()?
            .services
            .get(&id)
            .filter(|s| s.is_active)
            .cloned())
    }

    fn find_confirmed_bookings(&self, date: NaiveDate) -> StoreResult<Vec<TimeRange>> {
        let mut ranges: Vec<TimeRange> = self
            .read_bookings()?
            .rows
            .values()
            .filter(|b| b.date == date && b.is_confirmed())
            .map(Booking::range)
            .collect();
        ranges.sort();
        Ok(ranges)
    }

    fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        if booking.end_time <= booking.start_time {
            return Err(invalid("booking must end after it starts".to_string()));
        }
        let date = booking.start_time.date();

        let mut table = self.write_bookings()?;
        if table.overlapping_confirmed(date, &booking.range(), None) {
            return Err(StoreError::Conflict);
        }

        let id = table.next_id.max(1);
        let next_id = id.checked_add(1).ok_or_else(|| StoreError::Query {
            message: "booking ids exhausted".to_string(),
        })?;
        let row = Booking {
            id,
            service_id: booking.service_id,
            date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: BookingStatus::Confirmed,
            customer: booking.customer,
            created_at: booking.created_at,
        };
        match table.rows.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
            }
            Entry::Occupied(_) => {
                return Err(StoreError::Query {
                    message: format!("booking id {} already taken", id),
                });
            }
        }
        table.next_id = next_id;
        Ok(row)
    }

    fn find_booking(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        Ok(self.read_bookings()?.rows.get(&id).cloned())
    }

    fn update_booking_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> StoreResult<Option<Booking>> {
        let mut table = self.write_bookings()?;
        let Some(current) = table.rows.get(&id) else {
            return Ok(None);
        };
        if current.status != expected {
            return Ok(Some(current.clone()));
        }
        let (date, range) = (current.date, current.range());
        // Reconfirming must respect the same guard as inserting.
        if status == BookingStatus::Confirmed
            && table.overlapping_confirmed(date, &range, Some(id))
        {
            return Err(StoreError::Conflict);
        }
        Ok(table.rows.get_mut(&id).map(|row| {
            row.status = status;
            row.clone()
        }))
    }
}
