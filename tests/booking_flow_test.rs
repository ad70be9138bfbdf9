//! Booking engine invariants that live in SQL: the row lock plus partial
//! unique index admit exactly one active claim per slot, cancel and delete
//! release the slot, and a booked slot cannot be removed.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mindwell::auth::{ApiError, UserRole};
use mindwell::models::{BookingCreate, BookingStatus, BookingUpdate, CoachSlot, CoachSlotCreate};
use mindwell::services::{BookingService, SlotService};

async fn seed_slot(pool: &PgPool, coach_id: Uuid, days_from_now: i64) -> CoachSlot {
    let date = (Utc::now() + Duration::days(days_from_now))
        .date_naive()
        .to_string();

    SlotService::new(pool.clone())
        .create_slot(
            coach_id,
            CoachSlotCreate {
                date,
                start_time: "14:00".to_string(),
                end_time: "15:00".to_string(),
                price: Some(50.0),
            },
        )
        .await
        .expect("seed slot")
}

fn booking_request(slot_id: Uuid) -> BookingCreate {
    BookingCreate {
        slot_id,
        notes: None,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn concurrent_bookings_have_exactly_one_winner() {
    let pool = common::pool().await;
    let coach = common::seed_user(&pool, UserRole::Coach).await;
    let first = common::seed_user(&pool, UserRole::User).await;
    let second = common::seed_user(&pool, UserRole::User).await;
    let slot = seed_slot(&pool, coach, 30).await;

    let bookings = BookingService::new(pool.clone());
    let (a, b) = tokio::join!(
        bookings.create_booking(first, booking_request(slot.id)),
        bookings.create_booking(second, booking_request(slot.id)),
    );

    let winners = [&a, &b].iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1, "exactly one booking may claim the slot");

    let loser = if a.is_err() {
        a.unwrap_err()
    } else {
        b.unwrap_err()
    };
    assert!(matches!(loser, ApiError::Conflict(_)));

    let slot = SlotService::new(pool.clone())
        .get_slot(slot.id)
        .await
        .unwrap();
    assert!(slot.is_booked);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn cancelling_releases_the_slot_for_rebooking() {
    let pool = common::pool().await;
    let coach = common::seed_user(&pool, UserRole::Coach).await;
    let first = common::seed_user(&pool, UserRole::User).await;
    let second = common::seed_user(&pool, UserRole::User).await;
    let slot = seed_slot(&pool, coach, 30).await;

    let bookings = BookingService::new(pool.clone());
    let booking = bookings
        .create_booking(first, booking_request(slot.id))
        .await
        .unwrap();

    let cancelled = bookings
        .update_booking(
            booking.id,
            first,
            BookingUpdate {
                status: Some(BookingStatus::Cancelled),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let slots = SlotService::new(pool.clone());
    assert!(!slots.get_slot(slot.id).await.unwrap().is_booked);

    // The cancelled row keeps its slot_id without blocking the new claim.
    let rebooked = bookings
        .create_booking(second, booking_request(slot.id))
        .await
        .unwrap();
    assert_eq!(rebooked.slot_id, Some(slot.id));
    assert!(slots.get_slot(slot.id).await.unwrap().is_booked);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn deleting_a_booking_releases_the_slot() {
    let pool = common::pool().await;
    let coach = common::seed_user(&pool, UserRole::Coach).await;
    let user = common::seed_user(&pool, UserRole::User).await;
    let slot = seed_slot(&pool, coach, 30).await;

    let bookings = BookingService::new(pool.clone());
    let booking = bookings
        .create_booking(user, booking_request(slot.id))
        .await
        .unwrap();

    bookings.delete_booking(booking.id, user).await.unwrap();

    let slot = SlotService::new(pool.clone())
        .get_slot(slot.id)
        .await
        .unwrap();
    assert!(!slot.is_booked);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn booked_slots_cannot_be_deleted() {
    let pool = common::pool().await;
    let coach = common::seed_user(&pool, UserRole::Coach).await;
    let user = common::seed_user(&pool, UserRole::User).await;
    let slot = seed_slot(&pool, coach, 30).await;

    BookingService::new(pool.clone())
        .create_booking(user, booking_request(slot.id))
        .await
        .unwrap();

    let err = SlotService::new(pool.clone())
        .delete_slot(slot.id, coach)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn upcoming_filter_hides_past_bookings() {
    let pool = common::pool().await;
    let coach = common::seed_user(&pool, UserRole::Coach).await;
    let user = common::seed_user(&pool, UserRole::User).await;
    let past_slot = seed_slot(&pool, coach, -30).await;

    let bookings = BookingService::new(pool.clone());
    bookings
        .create_booking(user, booking_request(past_slot.id))
        .await
        .unwrap();

    let upcoming = bookings
        .get_user_bookings(user, None, true, Utc::now())
        .await
        .unwrap();
    assert!(upcoming.is_empty());

    let all = bookings
        .get_user_bookings(user, None, false, Utc::now())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}
