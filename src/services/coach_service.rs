use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{ApiError, UserRole};
use crate::models::{
    CoachAccountView, CoachBrowseView, CoachProfile, CoachProfileUpsert, CoachProfileView, User,
    UserProfileView,
};
use crate::services::format::slot_public_view;
use crate::services::slot_service::SlotService;

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, role, phone_number, \
     password_hash, is_verified, is_active, age, gender, location, profile_photo, \
     created_at, updated_at";
const PROFILE_COLUMNS: &str =
    "id, user_id, qualifications, specialization, experience_years, charges_per_slot, \
     availability_status";

/// Number of upcoming slots attached to each public browse entry.
const BROWSE_SLOT_PREVIEW: i64 = 5;

pub struct CoachService {
    db: PgPool,
}

impl CoachService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Account + profile for the authenticated coach.
    pub async fn get_coach_me(&self, user_id: Uuid) -> Result<CoachAccountView, ApiError> {
        let user = self.get_coach_user(user_id).await?;
        let profile = self.get_profile(user_id).await?;
        Ok(coach_account_view(&user, profile.as_ref()))
    }

    /// Create-or-update of the coach's professional profile. Absent fields
    /// keep their stored values.
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        payload: CoachProfileUpsert,
    ) -> Result<CoachProfileView, ApiError> {
        payload.validate().map_err(ApiError::validation)?;
        self.get_coach_user(user_id).await?;

        let profile = sqlx::query_as::<_, CoachProfile>(&format!(
            "INSERT INTO coach_profiles
                 (id, user_id, qualifications, specialization, experience_years,
                  charges_per_slot, availability_status)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE))
             ON CONFLICT (user_id) DO UPDATE SET
                 qualifications = COALESCE($3, coach_profiles.qualifications),
                 specialization = COALESCE($4, coach_profiles.specialization),
                 experience_years = COALESCE($5, coach_profiles.experience_years),
                 charges_per_slot = COALESCE($6, coach_profiles.charges_per_slot),
                 availability_status = COALESCE($7, coach_profiles.availability_status)
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(payload.qualifications)
        .bind(payload.specialization)
        .bind(payload.experience_years)
        .bind(payload.charges_per_slot)
        .bind(payload.availability_status)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, "coach profile saved");
        Ok(CoachProfileView::from(&profile))
    }

    /// Flip whether the coach appears in public browse results.
    pub async fn set_availability(
        &self,
        user_id: Uuid,
        available: bool,
    ) -> Result<CoachProfileView, ApiError> {
        let profile = sqlx::query_as::<_, CoachProfile>(&format!(
            "UPDATE coach_profiles SET availability_status = $2 WHERE user_id = $1
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(available)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Coach profile not found"))?;

        Ok(CoachProfileView::from(&profile))
    }

    /// Public directory of coaches, optionally filtered by specialization
    /// substring and by whether they currently accept bookings. Each entry
    /// carries the coach's next few open slots.
    pub async fn browse(
        &self,
        specialization: Option<String>,
        available_only: bool,
        now: DateTime<Utc>,
        slot_service: &SlotService,
    ) -> Result<Vec<CoachBrowseView>, ApiError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u
             WHERE u.role = 'coach' AND u.is_active AND u.is_verified
               AND ($1::text IS NULL OR EXISTS (
                   SELECT 1 FROM coach_profiles p
                   WHERE p.user_id = u.id AND p.specialization ILIKE '%' || $1 || '%'))
               AND (NOT $2 OR EXISTS (
                   SELECT 1 FROM coach_profiles p
                   WHERE p.user_id = u.id AND p.availability_status))
             ORDER BY u.username"
        ))
        .bind(specialization)
        .bind(available_only)
        .fetch_all(&self.db)
        .await?;

        let mut entries = Vec::with_capacity(users.len());
        for user in &users {
            let profile = self.get_profile(user.id).await?;
            let slots = slot_service
                .list_available_slots(user.id, BROWSE_SLOT_PREVIEW, now)
                .await?;
            entries.push(CoachBrowseView {
                coach: coach_account_view(user, profile.as_ref()),
                available_slots: slots.iter().map(slot_public_view).collect(),
            });
        }

        Ok(entries)
    }

    /// Public detail view of a single coach.
    pub async fn get_public_coach(&self, coach_id: Uuid) -> Result<CoachAccountView, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = 'coach' AND is_active"
        ))
        .bind(coach_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Coach not found"))?;

        let profile = self.get_profile(coach_id).await?;
        Ok(coach_account_view(&user, profile.as_ref()))
    }

    /// Coach account + profile for display inside booking details. `None`
    /// when the coach account no longer exists.
    pub async fn coach_account_for(
        &self,
        coach_id: Uuid,
    ) -> Result<Option<CoachAccountView>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = 'coach'"
        ))
        .bind(coach_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let profile = self.get_profile(user.id).await?;
        Ok(Some(coach_account_view(&user, profile.as_ref())))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<CoachProfile>, ApiError> {
        let profile = sqlx::query_as::<_, CoachProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM coach_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    // Admins share the coach account surface, so both roles pass here; the
    // route gate has already rejected everyone else.
    async fn get_coach_user(&self, user_id: Uuid) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Coach not found"))?;

        if user.role == UserRole::User {
            return Err(ApiError::not_found("Coach not found"));
        }

        Ok(user)
    }
}

pub fn coach_account_view(user: &User, profile: Option<&CoachProfile>) -> CoachAccountView {
    CoachAccountView {
        user: UserProfileView::from(user),
        coach_profile: profile.map(CoachProfileView::from),
    }
}
