//! Shared fixtures for booking-engine integration tests.
//!
//! The reference "now" is Friday 2025-05-30 12:00 local time. The standard
//! schedule is open Monday-Friday 09:00-17:00 and Saturday 10:00-14:00, with
//! no Sunday hours.

#![allow(dead_code)]

use std::sync::Arc;

use booking_engine::{
    BookingEngine, Customer, EngineConfig, InMemoryStore, RegularHours, Schedule, Service,
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use mockable::Clock;

pub const NOW: &str = "2025-05-30T12:00:00";

/// Haircut, 60 minutes.
pub const HAIRCUT: u64 = 1;
/// Beard trim, 30 minutes.
pub const TRIM: u64 = 2;
/// Colouring, 45 minutes, inactive.
pub const RETIRED: u64 = 3;

pub struct FixedClock(DateTime<Local>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

pub fn clock_at(ts: &str) -> Arc<dyn Clock> {
    let local = Local
        .from_local_datetime(&at(ts))
        .earliest()
        .expect("fixture time exists in the local zone");
    Arc::new(FixedClock(local))
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid fixture date")
}

pub fn at(s: &str) -> NaiveDateTime {
    s.parse().expect("valid fixture timestamp")
}

pub fn hm(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("valid fixture time")
}

pub fn hours(day_of_week: u8, open: &str, close: &str) -> RegularHours {
    RegularHours {
        day_of_week,
        start_time: hm(open),
        end_time: hm(close),
        is_available: true,
    }
}

pub fn service(id: u64, duration_minutes: u32, is_active: bool) -> Service {
    Service {
        id,
        name: format!("service-{}", id),
        duration_minutes,
        is_active,
    }
}

pub fn standard_schedule() -> Schedule {
    Schedule {
        services: vec![
            service(HAIRCUT, 60, true),
            service(TRIM, 30, true),
            service(RETIRED, 45, false),
        ],
        regular_hours: (1..=5)
            .map(|day| hours(day, "09:00", "17:00"))
            .chain(std::iter::once(hours(6, "10:00", "14:00")))
            .collect(),
        ..Schedule::default()
    }
}

pub fn store_with(schedule: Schedule) -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::from_schedule(schedule).expect("fixture schedule is valid"))
}

pub fn engine_at(store: Arc<InMemoryStore>, now: &str) -> BookingEngine<InMemoryStore> {
    BookingEngine::new(store, clock_at(now), EngineConfig::default())
}

pub fn engine(store: Arc<InMemoryStore>) -> BookingEngine<InMemoryStore> {
    engine_at(store, NOW)
}

pub fn customer(name: &str) -> Customer {
    Customer {
        name: name.to_string(),
        email: format!("{}@example.fi", name.to_lowercase()),
        phone: None,
        notes: None,
    }
}

/// Start times of `slots` formatted as `HH:MM`.
pub fn starts(slots: &[booking_engine::Slot]) -> Vec<String> {
    slots
        .iter()
        .map(|s| s.start.format("%H:%M").to_string())
        .collect()
}
