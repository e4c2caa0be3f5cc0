//! Tests for the booking lifecycle and the double-booking guard.

mod common;

use std::sync::Barrier;

use booking_engine::{BookingError, BookingStatus, ConflictReason, Customer};
use common::*;

#[test]
fn booking_takes_its_window_from_the_service() {
    let engine = engine(store_with(standard_schedule()));

    let booking = engine
        .create_booking(at("2025-06-02T10:00:00"), HAIRCUT, customer("Aino"))
        .unwrap();

    assert_eq!(booking.service_id, HAIRCUT);
    assert_eq!(booking.date, date("2025-06-02"));
    assert_eq!(booking.start_time, at("2025-06-02T10:00:00"));
    assert_eq!(booking.end_time, at("2025-06-02T11:00:00"));
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.created_at, at(NOW));
    assert_eq!(engine.get_booking(booking.id).unwrap(), booking);
}

#[test]
fn booking_ids_are_distinct() {
    let engine = engine(store_with(standard_schedule()));

    let a = engine
        .create_booking(at("2025-06-02T09:00:00"), TRIM, customer("Aino"))
        .unwrap();
    let b = engine
        .create_booking(at("2025-06-02T09:30:00"), TRIM, customer("Eero"))
        .unwrap();

    assert_ne!(a.id, b.id);
}

#[test]
fn second_overlapping_booking_is_a_conflict() {
    let engine = engine(store_with(standard_schedule()));
    engine
        .create_booking(at("2025-06-02T10:00:00"), HAIRCUT, customer("Aino"))
        .unwrap();

    let err = engine
        .create_booking(at("2025-06-02T10:30:00"), TRIM, customer("Eero"))
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::Conflict(ConflictReason::OverlapsExistingBooking)
    ));
}

#[test]
fn unbookable_slot_reports_its_reason() {
    let engine = engine(store_with(standard_schedule()));

    let err = engine
        .create_booking(at("2025-06-02T16:30:00"), HAIRCUT, customer("Aino"))
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::Conflict(ConflictReason::EndsAfterClosing)
    ));
}

#[test]
fn booking_an_unknown_service_is_not_found() {
    let engine = engine(store_with(standard_schedule()));

    let err = engine
        .create_booking(at("2025-06-02T10:00:00"), RETIRED, customer("Aino"))
        .unwrap_err();

    assert!(matches!(err, BookingError::NotFound { entity: "service", .. }));
}

#[test]
fn customer_details_are_validated_first() {
    let engine = engine(store_with(standard_schedule()));
    let cases = [
        Customer {
            name: "  ".to_string(),
            ..customer("Aino")
        },
        Customer {
            email: "aino.example.fi".to_string(),
            ..customer("Aino")
        },
        Customer {
            email: "aino@localhost".to_string(),
            ..customer("Aino")
        },
        Customer {
            email: "@example.fi".to_string(),
            ..customer("Aino")
        },
    ];

    for bad in cases {
        // Even a past slot reports the validation problem
        let err = engine
            .create_booking(at("2025-05-01T10:00:00"), HAIRCUT, bad.clone())
            .unwrap_err();
        assert!(
            matches!(err, BookingError::Validation(_)),
            "{:?} should be rejected, got {:?}",
            bad,
            err
        );
    }
}

#[test]
fn cancel_then_rebook_same_slot() {
    let engine = engine(store_with(standard_schedule()));
    let first = engine
        .create_booking(at("2025-06-02T10:00:00"), HAIRCUT, customer("Aino"))
        .unwrap();

    let cancelled = engine.cancel_booking(first.id).unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let second = engine
        .create_booking(at("2025-06-02T10:00:00"), HAIRCUT, customer("Eero"))
        .unwrap();
    assert_eq!(second.status, BookingStatus::Confirmed);
    assert_eq!(
        engine.get_booking(first.id).unwrap().status,
        BookingStatus::Cancelled
    );
}

#[test]
fn cancelling_twice_is_harmless() {
    let engine = engine(store_with(standard_schedule()));
    let booking = engine
        .create_booking(at("2025-06-02T10:00:00"), HAIRCUT, customer("Aino"))
        .unwrap();

    engine.cancel_booking(booking.id).unwrap();
    let again = engine.cancel_booking(booking.id).unwrap();

    assert_eq!(again.status, BookingStatus::Cancelled);
}

#[test]
fn finished_bookings_cannot_flip_state() {
    let engine = engine(store_with(standard_schedule()));
    let done = engine
        .create_booking(at("2025-06-02T10:00:00"), HAIRCUT, customer("Aino"))
        .unwrap();
    let dropped = engine
        .create_booking(at("2025-06-02T12:00:00"), HAIRCUT, customer("Eero"))
        .unwrap();
    engine.complete_booking(done.id).unwrap();
    engine.cancel_booking(dropped.id).unwrap();

    assert!(matches!(
        engine.cancel_booking(done.id).unwrap_err(),
        BookingError::Validation(_)
    ));
    assert!(matches!(
        engine.complete_booking(dropped.id).unwrap_err(),
        BookingError::Validation(_)
    ));
}

#[test]
fn unknown_booking_is_not_found() {
    let engine = engine(store_with(standard_schedule()));

    for err in [
        engine.get_booking(77).unwrap_err(),
        engine.cancel_booking(77).unwrap_err(),
        engine.complete_booking(77).unwrap_err(),
    ] {
        assert!(matches!(err, BookingError::NotFound { entity: "booking", .. }));
    }
}

#[test]
fn concurrent_overlapping_requests_yield_one_booking() {
    const CONTENDERS: usize = 8;
    let store = store_with(standard_schedule());
    let engine = engine(store.clone());
    let barrier = Barrier::new(CONTENDERS);

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let engine = engine.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    // Staggered starts, all overlapping 10:00-11:00
                    let start = if i % 2 == 0 {
                        at("2025-06-02T10:00:00")
                    } else {
                        at("2025-06-02T10:30:00")
                    };
                    engine.create_booking(start, HAIRCUT, customer(&format!("Guest{}", i)))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("booking thread panicked"))
            .collect()
    });

    let won = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(won, 1, "exactly one contender should win: {:?}", outcomes);
    for lost in outcomes.iter().filter_map(|o| o.as_ref().err()) {
        assert!(matches!(
            lost,
            BookingError::Conflict(ConflictReason::OverlapsExistingBooking)
        ));
    }
    assert_eq!(store.bookings_on(date("2025-06-02")).unwrap().len(), 1);
}

#[test]
fn racing_cancel_and_complete_settle_on_one_status() {
    const ROUNDS: usize = 32;
    let store = store_with(standard_schedule());
    let engine = engine(store.clone());

    for round in 0..ROUNDS {
        // Eight half-hour bookings a day across Monday to Thursday
        let day = 2 + round / 8;
        let minute = (round % 8) * 60;
        let start = at(&format!(
            "2025-06-{:02}T{:02}:{:02}:00",
            day,
            9 + minute / 60,
            minute % 60
        ));
        let booking = engine
            .create_booking(start, TRIM, customer("Aino"))
            .unwrap();
        let barrier = Barrier::new(2);

        let (cancelled, completed) = std::thread::scope(|scope| {
            let cancel = scope.spawn(|| {
                barrier.wait();
                engine.cancel_booking(booking.id)
            });
            let complete = scope.spawn(|| {
                barrier.wait();
                engine.complete_booking(booking.id)
            });
            (
                cancel.join().expect("cancel thread panicked"),
                complete.join().expect("complete thread panicked"),
            )
        });

        let stored = engine.get_booking(booking.id).unwrap().status;
        match (cancelled, completed) {
            (Ok(row), Err(BookingError::Validation(_))) => {
                assert_eq!(row.status, BookingStatus::Cancelled);
                assert_eq!(stored, BookingStatus::Cancelled);
            }
            (Err(BookingError::Validation(_)), Ok(row)) => {
                assert_eq!(row.status, BookingStatus::Completed);
                assert_eq!(stored, BookingStatus::Completed);
            }
            other => panic!("exactly one transition should win: {:?}", other),
        }
    }
}

#[test]
fn opening_hours_change_does_not_touch_existing_bookings() {
    let store = store_with(standard_schedule());
    let engine = engine(store.clone());
    let booking = engine
        .create_booking(at("2025-06-02T16:00:00"), HAIRCUT, customer("Aino"))
        .unwrap();

    store
        .set_regular_hours(hours(1, "09:00", "12:00"))
        .unwrap();

    let kept = engine.get_booking(booking.id).unwrap();
    assert_eq!(kept.status, BookingStatus::Confirmed);
    assert_eq!(kept.end_time, at("2025-06-02T17:00:00"));
}
