use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::ApiError;
use crate::models::{User, UserProfileUpdate, UserProfileView};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, role, phone_number, \
     password_hash, is_verified, is_active, age, gender, location, profile_photo, \
     created_at, updated_at";

/// Profile reads and writes for end-user accounts. Coach and admin accounts
/// manage their profiles through their own surfaces.
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_me(&self, user_id: Uuid) -> Result<UserProfileView, ApiError> {
        let user = self.get_end_user(user_id).await?;
        Ok(UserProfileView::from(&user))
    }

    /// Partial update; absent fields keep their stored values.
    pub async fn update_me(
        &self,
        user_id: Uuid,
        payload: UserProfileUpdate,
    ) -> Result<UserProfileView, ApiError> {
        payload.validate().map_err(ApiError::validation)?;
        self.get_end_user(user_id).await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                 first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 phone_number = COALESCE($4, phone_number),
                 age = COALESCE($5, age),
                 gender = COALESCE($6, gender),
                 location = COALESCE($7, location),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(payload.first_name)
        .bind(payload.last_name)
        .bind(payload.phone_number)
        .bind(payload.age)
        .bind(payload.gender)
        .bind(payload.location)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, "user profile updated");
        Ok(UserProfileView::from(&user))
    }

    async fn get_end_user(&self, user_id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = 'user'"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found or role mismatch"))
    }
}
