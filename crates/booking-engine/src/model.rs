//! Records the engine reads from and writes to the data store.
//!
//! Opening-hours rules are keyed by weekday ([`RegularHours`]) or by calendar
//! date ([`SpecialDate`], [`BlockedDate`]). Times of day are plain
//! [`NaiveTime`]s and timestamps are [`NaiveDateTime`]s in the single local
//! zone the business operates in.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::time::TimeRange;

pub type ServiceId = u64;
pub type BookingId = u64;

/// A single contiguous opening interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningWindow {
    /// Build a window, returning `None` when it would be empty or inverted.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Option<Self> {
        (open < close).then_some(Self { open, close })
    }

    /// Anchor the window on a concrete date.
    pub fn on(&self, date: NaiveDate) -> TimeRange {
        TimeRange {
            start: date.and_time(self.open),
            end: date.and_time(self.close),
        }
    }
}

/// Weekly opening hours for one weekday (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularHours {
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl RegularHours {
    pub fn window(&self) -> Option<OpeningWindow> {
        if self.is_available {
            OpeningWindow::new(self.start_time, self.end_time)
        } else {
            None
        }
    }
}

/// Opening hours for one exact date, overriding [`RegularHours`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDate {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl SpecialDate {
    pub fn window(&self) -> Option<OpeningWindow> {
        if self.is_available {
            OpeningWindow::new(self.start_time, self.end_time)
        } else {
            None
        }
    }
}

/// A date on which nothing can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedDate {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A bookable service. Only the duration and active flag matter for
/// availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    #[serde(default)]
    pub name: String,
    pub duration_minutes: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        })
    }
}

/// Contact details captured with a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A persisted booking. Its window is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub service_id: ServiceId,
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    pub customer: Customer,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Insert payload for [`crate::store::BookingStore::insert_booking`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub service_id: ServiceId,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub customer: Customer,
    pub created_at: NaiveDateTime,
}

impl NewBooking {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }
}
