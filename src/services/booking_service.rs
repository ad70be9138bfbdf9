use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::errors::conflict_on_unique;
use crate::auth::ApiError;
use crate::models::{Booking, BookingCreate, BookingStatus, BookingUpdate, CoachSlot};

const BOOKING_COLUMNS: &str =
    "id, user_id, coach_id, slot_id, start_time, end_time, status, notes, price, created_at";
const SLOT_COLUMNS: &str = "id, coach_id, start_time, end_time, price, is_booked";

/// The booking engine: claims and releases slots, enforcing at most one
/// active booking per slot. Every multi-row mutation (booking write + slot
/// flip) runs inside a single transaction.
pub struct BookingService {
    db: PgPool,
}

impl BookingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Atomically claim a slot. The slot row is locked for the duration of
    /// the check-then-act so concurrent requests serialize; the partial
    /// unique index on scheduled bookings backstops the invariant.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        payload: BookingCreate,
    ) -> Result<Booking, ApiError> {
        let mut tx = self.db.begin().await?;

        let slot = sqlx::query_as::<_, CoachSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM coach_slots WHERE id = $1 FOR UPDATE"
        ))
        .bind(payload.slot_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Slot not found for this coach"))?;

        if slot.is_booked {
            return Err(ApiError::conflict("This slot is already booked"));
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings
                 (id, user_id, coach_id, slot_id, start_time, end_time, status, notes, price)
             VALUES ($1, $2, $3, $4, $5, $6, 'scheduled', $7, $8)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(slot.coach_id)
        .bind(slot.id)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(payload.notes)
        .bind(slot.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| conflict_on_unique(err, "This slot is already booked"))?;

        sqlx::query("UPDATE coach_slots SET is_booked = TRUE WHERE id = $1")
            .bind(slot.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(booking_id = %booking.id, slot_id = %slot.id, user_id = %user_id, "slot booked");
        Ok(booking)
    }

    pub async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Booking, ApiError> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))
    }

    /// A user's own bookings, optionally narrowed by status and to windows
    /// starting strictly after `now`.
    pub async fn get_user_bookings(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
        upcoming: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, ApiError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE user_id = $1
               AND ($2::booking_status IS NULL OR status = $2)
               AND (NOT $3 OR start_time > $4)
             ORDER BY start_time"
        ))
        .bind(user_id)
        .bind(status)
        .bind(upcoming)
        .bind(now)
        .fetch_all(&self.db)
        .await?;

        Ok(bookings)
    }

    /// Owner-only update. Cancelling releases the slot in the same
    /// transaction; transitions out of a terminal status are rejected.
    pub async fn update_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        payload: BookingUpdate,
    ) -> Result<Booking, ApiError> {
        let booking = self.get_booking_by_id(booking_id).await?;

        if booking.user_id != user_id {
            return Err(ApiError::forbidden("You cannot update this booking"));
        }

        let next_status = match payload.status {
            Some(next) if next != booking.status => {
                if !booking.status.can_transition_to(next) {
                    return Err(ApiError::validation(
                        "Completed or cancelled bookings cannot change status",
                    ));
                }
                Some(next)
            }
            _ => None,
        };

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET status = COALESCE($2, status), notes = COALESCE($3, notes)
             WHERE id = $1
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(next_status)
        .bind(payload.notes)
        .fetch_one(&mut *tx)
        .await?;

        if next_status == Some(BookingStatus::Cancelled) {
            if let Some(slot_id) = updated.slot_id {
                sqlx::query("UPDATE coach_slots SET is_booked = FALSE WHERE id = $1")
                    .bind(slot_id)
                    .execute(&mut *tx)
                    .await?;
                tracing::info!(booking_id = %booking_id, slot_id = %slot_id, "booking cancelled, slot released");
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Owner-only delete. The slot is released unless the booking already
    /// ran to completion.
    pub async fn delete_booking(&self, booking_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        let booking = self.get_booking_by_id(booking_id).await?;

        if booking.user_id != user_id {
            return Err(ApiError::forbidden("You cannot delete this booking"));
        }

        let mut tx = self.db.begin().await?;

        if let Some(slot_id) = booking.slot_id {
            if booking.status != BookingStatus::Completed {
                sqlx::query("UPDATE coach_slots SET is_booked = FALSE WHERE id = $1")
                    .bind(slot_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(booking_id = %booking_id, user_id = %user_id, "booking deleted");
        Ok(())
    }

    // Coach read paths

    pub async fn coach_list_bookings(
        &self,
        coach_id: Uuid,
        status: Option<BookingStatus>,
        upcoming: bool,
        now: DateTime<Utc>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Booking>, ApiError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE coach_id = $1
               AND ($2::booking_status IS NULL OR status = $2)
               AND (NOT $3 OR start_time > $4)
             ORDER BY start_time
             OFFSET $5 LIMIT $6"
        ))
        .bind(coach_id)
        .bind(status)
        .bind(upcoming)
        .bind(now)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(bookings)
    }

    pub async fn get_coach_booking(
        &self,
        coach_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Booking, ApiError> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND coach_id = $2"
        ))
        .bind(booking_id)
        .bind(coach_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found or not authorized"))
    }

    // Admin read paths

    pub async fn admin_list_bookings(
        &self,
        status: Option<BookingStatus>,
        coach_id: Option<Uuid>,
        user_id: Option<Uuid>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Booking>, ApiError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE ($1::booking_status IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR coach_id = $2)
               AND ($3::uuid IS NULL OR user_id = $3)
             ORDER BY created_at DESC
             OFFSET $4 LIMIT $5"
        ))
        .bind(status)
        .bind(coach_id)
        .bind(user_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(bookings)
    }

    /// Live slot for a booking's display views, if the slot still exists.
    pub async fn slot_for(&self, booking: &Booking) -> Result<Option<CoachSlot>, ApiError> {
        let Some(slot_id) = booking.slot_id else {
            return Ok(None);
        };

        let slot = sqlx::query_as::<_, CoachSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM coach_slots WHERE id = $1"
        ))
        .bind(slot_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(slot)
    }
}
