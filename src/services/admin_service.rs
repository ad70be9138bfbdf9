use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::errors::conflict_on_unique;
use crate::auth::password::hash_password;
use crate::auth::{ApiError, UserRole};
use crate::models::{User, UserCreateByAdmin, UserProfileUpdate, UserProfileView};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, role, phone_number, \
     password_hash, is_verified, is_active, age, gender, location, profile_photo, \
     created_at, updated_at";

/// Admin account management. Admin accounts themselves are never managed
/// through this surface; they are provisioned out of band.
pub struct AdminService {
    db: PgPool,
}

impl AdminService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a user or coach account. Admin-created accounts skip email
    /// verification; a coach gets an empty profile row so the profile upsert
    /// and public browse both find one.
    pub async fn create_user(
        &self,
        payload: UserCreateByAdmin,
    ) -> Result<UserProfileView, ApiError> {
        if payload.role == UserRole::Admin {
            return Err(ApiError::forbidden("Cannot create admin accounts"));
        }

        let password_hash = hash_password(&payload.password)?;
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users
                 (id, email, username, first_name, last_name, role, phone_number,
                  password_hash, is_verified, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, TRUE)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.email)
        .bind(payload.username)
        .bind(payload.first_name)
        .bind(payload.last_name)
        .bind(payload.role)
        .bind(payload.phone_number)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| conflict_on_unique(err, "Username or email already registered"))?;

        if user.role == UserRole::Coach {
            sqlx::query("INSERT INTO coach_profiles (id, user_id) VALUES ($1, $2)")
                .bind(Uuid::new_v4())
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = %user.role, "account created by admin");
        Ok(UserProfileView::from(&user))
    }

    pub async fn list_profiles(
        &self,
        role: Option<UserRole>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UserProfileView>, ApiError> {
        if role == Some(UserRole::Admin) {
            return Err(ApiError::forbidden("Cannot list admin accounts"));
        }

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role <> 'admin' AND ($1::user_role IS NULL OR role = $1)
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        ))
        .bind(role)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(users.iter().map(UserProfileView::from).collect())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfileView, ApiError> {
        let user = self.get_managed_user(user_id).await?;
        Ok(UserProfileView::from(&user))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: UserProfileUpdate,
    ) -> Result<UserProfileView, ApiError> {
        payload.validate().map_err(ApiError::validation)?;
        self.get_managed_user(user_id).await?;

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

        Ok(UserProfileView::from(&user))
    }

    /// Hard delete. Dependent rows fall away via cascades; bookings keep
    /// their audit snapshot with the slot reference nulled.
    pub async fn delete_profile(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.get_managed_user(user_id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        tracing::info!(user_id = %user_id, "account deleted by admin");
        Ok(())
    }

    async fn get_managed_user(&self, user_id: Uuid) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

        if user.role == UserRole::Admin {
            return Err(ApiError::forbidden("Cannot manage admin accounts"));
        }

        Ok(user)
    }
}
