use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::errors::conflict_on_unique;
use crate::auth::jwt::JwtService;
use crate::auth::models::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResendVerificationRequest,
    ResetPasswordRequest, TokenResponse, VerifyEmailRequest,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{ApiError, UserRole};
use crate::models::{User, UserProfileView};
use crate::services::EmailService;

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, role, phone_number, \
     password_hash, is_verified, is_active, age, gender, location, profile_photo, \
     created_at, updated_at";

/// Registration, login, email verification, and password reset.
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtService,
    mailer: EmailService,
}

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtService, mailer: EmailService) -> Self {
        Self { db, jwt, mailer }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Self-registration for user and coach roles. The account starts
    /// unverified; a verification link goes out by email.
    pub async fn register(&self, payload: RegisterRequest) -> Result<UserProfileView, ApiError> {
        if !payload.role.self_registrable() {
            return Err(ApiError::validation(
                "Only user and coach accounts can self-register",
            ));
        }
        if payload.password.len() < 8 {
            return Err(ApiError::validation(
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = hash_password(&payload.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users
                 (id, email, username, first_name, last_name, role, phone_number,
                  password_hash, is_verified, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, TRUE)
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
        .fetch_one(&self.db)
        .await
        .map_err(|err| conflict_on_unique(err, "Username or email already registered"))?;

        let token = self.jwt.create_email_verification_token(&user.email)?;
        self.mailer.send_verification_email(&user.email, &token)?;

        tracing::info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(UserProfileView::from(&user))
    }

    /// Password login. Unknown usernames and wrong passwords fail with the
    /// same message so the endpoint does not leak which accounts exist.
    pub async fn login(&self, payload: LoginRequest) -> Result<TokenResponse, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(&payload.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

        if !verify_password(&payload.password, &user.password_hash)? {
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
        if !user.is_active {
            return Err(ApiError::forbidden("Account is deactivated"));
        }
        if !user.is_verified {
            return Err(ApiError::forbidden("Email address is not verified"));
        }

        let access_token =
            self.jwt
                .create_access_token(user.id, &user.username, &user.email, user.role)?;

        tracing::info!(user_id = %user.id, "login");
        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt.access_token_expires_in_seconds(),
        })
    }

    /// The authenticated account behind a token. Admin accounts do not use
    /// this surface.
    pub async fn get_me(&self, user_id: Uuid) -> Result<UserProfileView, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

        Ok(UserProfileView::from(&user))
    }

    pub async fn verify_email(&self, payload: VerifyEmailRequest) -> Result<(), ApiError> {
        let email = self
            .jwt
            .verify_email_verification_token(&payload.token)
            .ok_or_else(|| ApiError::validation("Invalid or expired verification token"))?;

        let result = sqlx::query("UPDATE users SET is_verified = TRUE WHERE email = $1")
            .bind(&email)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("User not found"));
        }

        tracing::info!(email = %email, "email verified");
        Ok(())
    }

    pub async fn resend_verification(
        &self,
        payload: ResendVerificationRequest,
    ) -> Result<(), ApiError> {
        let user = self.get_by_email(&payload.email).await?;

        if user.is_verified {
            return Err(ApiError::validation("Email is already verified"));
        }

        let token = self.jwt.create_email_verification_token(&user.email)?;
        self.mailer.send_verification_email(&user.email, &token)?;
        Ok(())
    }

    /// Start a password reset. Admin accounts are excluded from the email
    /// reset flow entirely.
    pub async fn forgot_password(&self, payload: ForgotPasswordRequest) -> Result<(), ApiError> {
        let user = self.get_by_email(&payload.email).await?;

        if user.role == UserRole::Admin {
            return Err(ApiError::forbidden("Invalid action"));
        }
        if !user.is_verified {
            return Err(ApiError::forbidden("Email address is not verified"));
        }

        let token = self.jwt.create_reset_token(&user.email)?;
        self.mailer.send_password_reset_email(&user.email, &token)?;

        tracing::info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    pub async fn reset_password(&self, payload: ResetPasswordRequest) -> Result<(), ApiError> {
        let email = self
            .jwt
            .verify_reset_token(&payload.token)
            .ok_or_else(|| ApiError::validation("Invalid or expired reset token"))?;

        if payload.new_password.len() < 8 {
            return Err(ApiError::validation(
                "Password must be at least 8 characters",
            ));
        }

        let user = self.get_by_email(&email).await?;

        if verify_password(&payload.new_password, &user.password_hash)? {
            return Err(ApiError::validation(
                "New password must differ from the current password",
            ));
        }

        let password_hash = hash_password(&payload.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;

        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("No account with this email"))
    }
}
