use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::ApiError;
use crate::models::{CoachSlot, CoachSlotCreate, CoachSlotUpdate};

const SLOT_COLUMNS: &str = "id, coach_id, start_time, end_time, price, is_booked";

/// Manages a coach's bookable time windows. Booking state itself is owned by
/// the booking engine; this service only ever creates, reshapes, and removes
/// windows.
pub struct SlotService {
    db: PgPool,
}

impl SlotService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_slot(
        &self,
        coach_id: Uuid,
        payload: CoachSlotCreate,
    ) -> Result<CoachSlot, ApiError> {
        let (start_dt, end_dt) =
            resolve_window(&payload.date, &payload.start_time, &payload.end_time)?;

        if let Some(price) = payload.price {
            if price < 0.0 {
                return Err(ApiError::validation("price must not be negative"));
            }
        }

        let slot = sqlx::query_as::<_, CoachSlot>(&format!(
            "INSERT INTO coach_slots (id, coach_id, start_time, end_time, price, is_booked)
             VALUES ($1, $2, $3, $4, $5, FALSE)
             RETURNING {SLOT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(coach_id)
        .bind(start_dt)
        .bind(end_dt)
        .bind(payload.price)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(slot_id = %slot.id, coach_id = %coach_id, "slot created");
        Ok(slot)
    }

    pub async fn get_slot(&self, slot_id: Uuid) -> Result<CoachSlot, ApiError> {
        sqlx::query_as::<_, CoachSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM coach_slots WHERE id = $1"
        ))
        .bind(slot_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Slot not found"))
    }

    pub async fn list_slots_for_coach(&self, coach_id: Uuid) -> Result<Vec<CoachSlot>, ApiError> {
        let slots = sqlx::query_as::<_, CoachSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM coach_slots WHERE coach_id = $1 ORDER BY start_time"
        ))
        .bind(coach_id)
        .fetch_all(&self.db)
        .await?;

        Ok(slots)
    }

    /// Future, unbooked slots for a coach, soonest first, capped at `limit`.
    pub async fn list_available_slots(
        &self,
        coach_id: Uuid,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<CoachSlot>, ApiError> {
        let slots = sqlx::query_as::<_, CoachSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM coach_slots
             WHERE coach_id = $1 AND start_time > $2 AND is_booked = FALSE
             ORDER BY start_time
             LIMIT $3"
        ))
        .bind(coach_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(slots)
    }

    pub async fn update_slot(
        &self,
        slot_id: Uuid,
        coach_id: Uuid,
        payload: CoachSlotUpdate,
    ) -> Result<CoachSlot, ApiError> {
        let slot = self.get_slot(slot_id).await?;

        if slot.coach_id != coach_id {
            return Err(ApiError::forbidden("You cannot update this slot"));
        }

        // Supplying any of date/start/end recomputes the whole window,
        // falling back to the stored values for omitted parts.
        let (start_dt, end_dt) = if payload.date.is_some()
            || payload.start_time.is_some()
            || payload.end_time.is_some()
        {
            let date = match &payload.date {
                Some(date) => parse_date(date)?,
                None => slot.start_time.date_naive(),
            };
            let start = match &payload.start_time {
                Some(start) => parse_clock(start)?,
                None => slot.start_time.time(),
            };
            let end = match &payload.end_time {
                Some(end) => parse_clock(end)?,
                None => slot.end_time.time(),
            };
            validate_window(combine_utc(date, start), combine_utc(date, end))?
        } else {
            (slot.start_time, slot.end_time)
        };

        if let Some(price) = payload.price {
            if price < 0.0 {
                return Err(ApiError::validation("price must not be negative"));
            }
        }

        let updated = sqlx::query_as::<_, CoachSlot>(&format!(
            "UPDATE coach_slots
             SET start_time = $2, end_time = $3, price = COALESCE($4, price)
             WHERE id = $1
             RETURNING {SLOT_COLUMNS}"
        ))
        .bind(slot_id)
        .bind(start_dt)
        .bind(end_dt)
        .bind(payload.price)
        .fetch_one(&self.db)
        .await?;

        Ok(updated)
    }

    pub async fn delete_slot(&self, slot_id: Uuid, coach_id: Uuid) -> Result<(), ApiError> {
        let slot = self.get_slot(slot_id).await?;

        if slot.coach_id != coach_id {
            return Err(ApiError::forbidden("You cannot delete this slot"));
        }

        if slot.is_booked {
            return Err(ApiError::conflict("Cannot delete a booked slot"));
        }

        sqlx::query("DELETE FROM coach_slots WHERE id = $1")
            .bind(slot_id)
            .execute(&self.db)
            .await?;

        tracing::info!(slot_id = %slot_id, coach_id = %coach_id, "slot deleted");
        Ok(())
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

fn parse_clock(s: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| ApiError::validation(format!("invalid time '{s}', expected HH:MM")))
}

fn combine_utc(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

fn validate_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    if end <= start {
        return Err(ApiError::validation("End time must be after start time"));
    }
    Ok((start, end))
}

/// Parse a calendar date plus two HH:MM wall-clock times into a validated
/// UTC-anchored window.
pub fn resolve_window(
    date: &str,
    start: &str,
    end: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let date = parse_date(date)?;
    let start = parse_clock(start)?;
    let end = parse_clock(end)?;
    validate_window(combine_utc(date, start), combine_utc(date, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parses_to_utc() {
        let (start, end) = resolve_window("2025-08-30", "14:00", "15:00").unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 8, 30, 14, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 8, 30, 15, 0, 0).unwrap());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = resolve_window("2025-08-30", "15:00", "14:00").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn zero_length_window_is_rejected() {
        let err = resolve_window("2025-08-30", "14:00", "14:00").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn malformed_inputs_are_validation_errors() {
        assert!(matches!(
            resolve_window("30-08-2025", "14:00", "15:00").unwrap_err(),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            resolve_window("2025-08-30", "2pm", "15:00").unwrap_err(),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            resolve_window("2025-08-30", "14:00", "25:00").unwrap_err(),
            ApiError::Validation(_)
        ));
    }
}
