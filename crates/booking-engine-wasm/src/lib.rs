//! WASM bindings for booking-engine.
//!
//! Lets the site's booking widget resolve days, list free slots and pre-check
//! a chosen time in the browser from a published schedule snapshot. All
//! complex types cross the boundary as JSON strings. The caller passes "now"
//! explicitly, as a local ISO 8601 timestamp.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/pkg \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```
//!
//! A check done here is only a hint for the UI; the server's check and the
//! store's insert guard decide.

use booking_engine::time::{format_timestamp, parse_date, parse_timestamp};
use booking_engine::{InMemoryStore, Schedule, SlotCheck, SlotStep};
use chrono::NaiveDateTime;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SlotDto {
    start: String,
    end: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CheckDto {
    Available {
        available: bool,
        end_time: String,
    },
    Unavailable {
        available: bool,
        reason: String,
    },
}

impl From<SlotCheck> for CheckDto {
    fn from(check: SlotCheck) -> Self {
        match check {
            SlotCheck::Available { end_time } => Self::Available {
                available: true,
                end_time: format_timestamp(end_time),
            },
            SlotCheck::Unavailable { reason } => Self::Unavailable {
                available: false,
                reason: reason.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_store(schedule_json: &str) -> Result<InMemoryStore, String> {
    let schedule = Schedule::from_json(schedule_json).map_err(|e| e.to_string())?;
    InMemoryStore::from_schedule(schedule).map_err(|e| e.to_string())
}

fn parse_now(now: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(now).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn resolve_day_json(schedule_json: &str, date: &str, now: &str) -> Result<String, String> {
    let store = load_store(schedule_json)?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    let today = parse_now(now)?.date();
    let day = booking_engine::resolve_day(&store, date, today).map_err(|e| e.to_string())?;
    to_json(&day)
}

fn list_slots_json(
    schedule_json: &str,
    date: &str,
    service_id: u32,
    step_minutes: u32,
    now: &str,
) -> Result<String, String> {
    let store = load_store(schedule_json)?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    let step = SlotStep::try_from(step_minutes).map_err(|e| e.to_string())?;
    let slots = booking_engine::list_slots(
        &store,
        date,
        u64::from(service_id),
        step,
        parse_now(now)?,
    )
    .map_err(|e| e.to_string())?;

    let dtos: Vec<SlotDto> = slots
        .iter()
        .map(|s| SlotDto {
            start: format_timestamp(s.start),
            end: format_timestamp(s.end),
        })
        .collect();
    to_json(&dtos)
}

fn check_slot_json(
    schedule_json: &str,
    start: &str,
    service_id: u32,
    now: &str,
) -> Result<String, String> {
    let store = load_store(schedule_json)?;
    let start = parse_timestamp(start).map_err(|e| e.to_string())?;
    let check = booking_engine::check_slot(&store, start, u64::from(service_id), parse_now(now)?)
        .map_err(|e| e.to_string())?;
    to_json(&CheckDto::from(check))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Resolve the effective opening hours of `date` (`YYYY-MM-DD`).
///
/// Returns a JSON object with `date`, `available`, `source`, and `window`
/// (`{open, close}`) when open.
#[wasm_bindgen(js_name = "resolveDay")]
pub fn resolve_day(schedule_json: &str, date: &str, now: &str) -> Result<String, JsValue> {
    resolve_day_json(schedule_json, date, now).map_err(|e| JsValue::from_str(&e))
}

/// List free slots for a service on `date`.
///
/// `step_minutes` must be 15 or 30. Returns a JSON array of `{start, end}`
/// objects with local ISO 8601 timestamps.
#[wasm_bindgen(js_name = "listSlots")]
pub fn list_slots(
    schedule_json: &str,
    date: &str,
    service_id: u32,
    step_minutes: u32,
    now: &str,
) -> Result<String, JsValue> {
    list_slots_json(schedule_json, date, service_id, step_minutes, now)
        .map_err(|e| JsValue::from_str(&e))
}

/// Check whether a service can start at `start`.
///
/// Returns `{"available": true, "end_time": ...}` or
/// `{"available": false, "reason": ...}`.
#[wasm_bindgen(js_name = "checkSlot")]
pub fn check_slot(
    schedule_json: &str,
    start: &str,
    service_id: u32,
    now: &str,
) -> Result<String, JsValue> {
    check_slot_json(schedule_json, start, service_id, now).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE: &str = r#"{
        "services": [{ "id": 1, "duration_minutes": 60 }],
        "regular_hours": [
            { "day_of_week": 1, "start_time": "09:00:00", "end_time": "12:00:00", "is_available": true }
        ],
        "blocked_dates": [{ "date": "2025-06-09" }],
        "bookings": [{
            "id": 1, "service_id": 1, "date": "2025-06-02",
            "start_time": "2025-06-02T10:00:00", "end_time": "2025-06-02T11:00:00",
            "status": "confirmed",
            "customer": { "name": "Aino", "email": "aino@example.fi" },
            "created_at": "2025-05-01T09:00:00"
        }]
    }"#;
    const NOW: &str = "2025-05-30T12:00:00";

    #[test]
    fn slots_come_back_as_json() {
        let json = list_slots_json(SCHEDULE, "2025-06-02", 1, 30, NOW).unwrap();

        assert_eq!(
            json,
            r#"[{"start":"2025-06-02T09:00:00","end":"2025-06-02T10:00:00"},{"start":"2025-06-02T11:00:00","end":"2025-06-02T12:00:00"}]"#
        );
    }

    #[test]
    fn check_reports_reason() {
        let json = check_slot_json(SCHEDULE, "2025-06-09T09:00:00", 1, NOW).unwrap();
        assert_eq!(json, r#"{"available":false,"reason":"date blocked"}"#);

        let json = check_slot_json(SCHEDULE, "2025-06-02T11:00:00", 1, NOW).unwrap();
        assert_eq!(json, r#"{"available":true,"end_time":"2025-06-02T12:00:00"}"#);
    }

    #[test]
    fn day_resolution_names_its_source() {
        let json = resolve_day_json(SCHEDULE, "2025-06-09", NOW).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["available"], false);
        assert_eq!(value["source"], "blocked");
    }

    #[test]
    fn bad_step_is_an_error() {
        let err = list_slots_json(SCHEDULE, "2025-06-02", 1, 45, NOW).unwrap_err();
        assert!(err.contains("15 or 30"));
    }
}
