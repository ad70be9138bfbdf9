use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles for role-based access control
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    User,
    Coach,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Coach => "coach",
            UserRole::Admin => "admin",
        }
    }

    /// Case-insensitive role lookup. Unknown strings are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(UserRole::User),
            "coach" => Some(UserRole::Coach),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Roles a visitor may register themselves as. Admin accounts are only
    /// ever created by another admin.
    pub fn self_registrable(&self) -> bool {
        matches!(self, UserRole::User | UserRole::Coach)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub username: String, // Login name
    pub email: String,    // User email
    pub role: UserRole,   // User role
    pub exp: usize,       // Expiration time
    pub iat: usize,       // Issued at
}

/// Authenticated principal, decoded from the bearer token and attached to
/// the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> Result<Self, uuid::Error> {
        Ok(Self {
            id: Uuid::parse_str(&claims.sub)?,
            username: claims.username.clone(),
            email: claims.email.clone(),
            role: claims.role,
        })
    }
}

/// Authentication request models
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Authentication response models
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(UserRole::parse("coach"), Some(UserRole::Coach));
        assert_eq!(UserRole::parse("Coach"), Some(UserRole::Coach));
        assert_eq!(UserRole::parse("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("uSeR"), Some(UserRole::User));
        assert_eq!(UserRole::parse("athlete"), None);
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn only_user_and_coach_may_self_register() {
        assert!(UserRole::User.self_registrable());
        assert!(UserRole::Coach.self_registrable());
        assert!(!UserRole::Admin.self_registrable());
    }
}
