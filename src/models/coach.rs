use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::UserProfileView;

#[derive(Debug, Clone, FromRow)]
pub struct CoachProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub qualifications: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub charges_per_slot: Option<f64>,
    pub availability_status: bool,
}

/// Create and update share one payload; the profile endpoint is an upsert.
#[derive(Debug, Deserialize)]
pub struct CoachProfileUpsert {
    pub qualifications: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub charges_per_slot: Option<f64>,
    pub availability_status: Option<bool>,
}

impl CoachProfileUpsert {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(years) = self.experience_years {
            if !(1..60).contains(&years) {
                return Err("experience_years must be between 1 and 59".to_string());
            }
        }
        if let Some(charge) = self.charges_per_slot {
            if charge <= 0.0 {
                return Err("charges_per_slot must be positive".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachProfileView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub qualifications: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub charges_per_slot: Option<f64>,
    pub availability_status: bool,
}

impl From<&CoachProfile> for CoachProfileView {
    fn from(profile: &CoachProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            qualifications: profile.qualifications.clone(),
            specialization: profile.specialization.clone(),
            experience_years: profile.experience_years,
            charges_per_slot: profile.charges_per_slot,
            availability_status: profile.availability_status,
        }
    }
}

/// Combined coach account + profile, as the client sees it.
#[derive(Debug, Serialize)]
pub struct CoachAccountView {
    #[serde(flatten)]
    pub user: UserProfileView,
    pub coach_profile: Option<CoachProfileView>,
}

/// Public browse listing: coach account plus their soonest bookable slots.
#[derive(Debug, Serialize)]
pub struct CoachBrowseView {
    #[serde(flatten)]
    pub coach: CoachAccountView,
    pub available_slots: Vec<SlotPublicView>,
}

/// A coach-owned bookable time window `[start_time, end_time)`.
#[derive(Debug, Clone, FromRow)]
pub struct CoachSlot {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: Option<f64>,
    pub is_booked: bool,
}

#[derive(Debug, Deserialize)]
pub struct CoachSlotCreate {
    pub date: String,       // YYYY-MM-DD
    pub start_time: String, // HH:MM
    pub end_time: String,   // HH:MM
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CoachSlotUpdate {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub price: Option<f64>,
}

/// Client-facing slot projection: calendar date plus wall-clock times.
#[derive(Debug, Clone, Serialize)]
pub struct SlotPublicView {
    pub slot_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub price: Option<f64>,
    pub duration_minutes: i64,
}

/// Slot projection for the owning coach; includes booked state.
#[derive(Debug, Clone, Serialize)]
pub struct SlotOwnerView {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub price: Option<f64>,
    pub is_booked: bool,
}
