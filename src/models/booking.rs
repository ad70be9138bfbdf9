use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::coach::{CoachAccountView, SlotPublicView};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Completed and cancelled are terminal; only scheduled bookings move.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        match self {
            BookingStatus::Scheduled => {
                matches!(next, BookingStatus::Completed | BookingStatus::Cancelled)
            }
            BookingStatus::Completed | BookingStatus::Cancelled => false,
        }
    }
}

/// A user's claim on a coach slot. The start/end/price columns are an audit
/// snapshot taken at booking time; display views re-read the live slot.
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coach_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BookingCreate {
    pub slot_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

/// Base booking response: the audit snapshot columns as stored.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: Option<f64>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            coach_id: booking.coach_id,
            slot_id: booking.slot_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            price: booking.price,
            status: booking.status,
            notes: booking.notes.clone(),
            created_at: booking.created_at,
        }
    }
}

/// Booking with coach info and the live slot projection, for the booker.
#[derive(Debug, Serialize)]
pub struct BookingDetailedView {
    #[serde(flatten)]
    pub booking: BookingView,
    pub coach: Option<CoachAccountView>,
    pub slot: Option<SlotPublicView>,
}

/// Coach-facing booking view; omits the coach's own account block.
#[derive(Debug, Serialize)]
pub struct CoachBookingView {
    #[serde(flatten)]
    pub booking: BookingView,
    pub slot: Option<SlotPublicView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_can_complete_or_cancel() {
        assert!(BookingStatus::Scheduled.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Scheduled.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Scheduled.can_transition_to(BookingStatus::Scheduled));
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [BookingStatus::Completed, BookingStatus::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(BookingStatus::Scheduled));
            assert!(!terminal.can_transition_to(BookingStatus::Completed));
            assert!(!terminal.can_transition_to(BookingStatus::Cancelled));
        }
        assert!(!BookingStatus::Scheduled.is_terminal());
    }
}
