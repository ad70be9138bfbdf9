//! Pure projection functions shaping persisted entities into role-specific
//! views. All slot-derived fields (HH:MM times, ISO date, duration) are
//! computed in exactly one place, `slot_public_view`.

use crate::models::{
    Booking, BookingDetailedView, BookingView, CoachAccountView, CoachBookingView, CoachSlot,
    SlotOwnerView, SlotPublicView,
};

pub fn slot_public_view(slot: &CoachSlot) -> SlotPublicView {
    SlotPublicView {
        slot_id: slot.id,
        date: slot.start_time.date_naive().to_string(),
        start_time: slot.start_time.format("%H:%M").to_string(),
        end_time: slot.end_time.format("%H:%M").to_string(),
        price: slot.price,
        duration_minutes: (slot.end_time - slot.start_time).num_seconds() / 60,
    }
}

pub fn slot_owner_view(slot: &CoachSlot) -> SlotOwnerView {
    let public = slot_public_view(slot);
    SlotOwnerView {
        id: slot.id,
        coach_id: slot.coach_id,
        date: public.date,
        start_time: public.start_time,
        end_time: public.end_time,
        price: slot.price,
        is_booked: slot.is_booked,
    }
}

/// Base booking view. When the live slot is present its times and price win
/// over the booking row's snapshot; the snapshot is only an audit copy of
/// what was booked.
fn booking_view(booking: &Booking, slot: Option<&CoachSlot>) -> BookingView {
    let mut view = BookingView::from(booking);
    if let Some(slot) = slot {
        view.slot_id = Some(slot.id);
        view.start_time = slot.start_time;
        view.end_time = slot.end_time;
        view.price = slot.price;
    }
    view
}

pub fn booking_detailed_view(
    booking: &Booking,
    slot: Option<&CoachSlot>,
    coach: Option<CoachAccountView>,
) -> BookingDetailedView {
    BookingDetailedView {
        booking: booking_view(booking, slot),
        coach,
        slot: slot.map(slot_public_view),
    }
}

pub fn coach_booking_view(booking: &Booking, slot: Option<&CoachSlot>) -> CoachBookingView {
    CoachBookingView {
        booking: booking_view(booking, slot),
        slot: slot.map(slot_public_view),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn slot(start: (u32, u32), end: (u32, u32), price: Option<f64>) -> CoachSlot {
        CoachSlot {
            id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            start_time: Utc
                .with_ymd_and_hms(2025, 8, 30, start.0, start.1, 0)
                .unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 8, 30, end.0, end.1, 0).unwrap(),
            price,
            is_booked: false,
        }
    }

    #[test]
    fn public_view_formats_date_times_and_duration() {
        let view = slot_public_view(&slot((14, 0), (15, 0), Some(50.0)));

        assert_eq!(view.date, "2025-08-30");
        assert_eq!(view.start_time, "14:00");
        assert_eq!(view.end_time, "15:00");
        assert_eq!(view.duration_minutes, 60);
        assert_eq!(view.price, Some(50.0));
    }

    #[test]
    fn duration_floors_partial_minutes() {
        let mut s = slot((9, 0), (9, 45), None);
        s.end_time += chrono::Duration::seconds(59);
        assert_eq!(slot_public_view(&s).duration_minutes, 45);
    }

    #[test]
    fn owner_view_carries_booked_state() {
        let mut s = slot((10, 0), (11, 30), Some(25.0));
        s.is_booked = true;

        let view = slot_owner_view(&s);
        assert!(view.is_booked);
        assert_eq!(view.coach_id, s.coach_id);
        assert_eq!(view.start_time, "10:00");
    }

    // The booking row keeps price/time copied at creation, but display
    // always reflects the current slot record. This pins that behaviour.
    #[test]
    fn booking_views_read_live_slot_over_row_snapshot() {
        let s = slot((14, 0), (15, 0), Some(70.0));
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            coach_id: s.coach_id,
            slot_id: Some(s.id),
            start_time: Utc.with_ymd_and_hms(2025, 8, 30, 13, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 8, 30, 14, 0, 0).unwrap(),
            status: BookingStatus::Scheduled,
            notes: None,
            price: Some(50.0), // snapshot diverged from the slot
            created_at: Utc::now(),
        };

        let detailed = booking_detailed_view(&booking, Some(&s), None);
        assert_eq!(detailed.booking.price, Some(70.0));
        assert_eq!(detailed.booking.start_time, s.start_time);

        // Without the slot relationship the snapshot is all we have.
        let bare = booking_detailed_view(&booking, None, None);
        assert_eq!(bare.booking.price, Some(50.0));
        assert!(bare.slot.is_none());
    }
}
