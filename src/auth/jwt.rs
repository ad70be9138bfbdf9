use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{ApiError, AuthUser, Claims, UserRole};

const VERIFY_PURPOSE: &str = "verify-email";
const RESET_PURPOSE: &str = "reset-password";

/// Claims for single-purpose tokens (email verification, password reset).
/// The purpose tag keeps a reset token from doubling as a verification one.
#[derive(Debug, Serialize, Deserialize)]
struct PurposeClaims {
    sub: String, // email
    purpose: String,
    exp: usize,
}

/// JWT token service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: Duration,
    verification_token_expires_in: Duration,
    reset_token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: Duration::minutes(30),
            verification_token_expires_in: Duration::minutes(60),
            reset_token_expires_in: Duration::minutes(15),
        }
    }

    /// Create an access token for a user
    pub fn create_access_token(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        role: UserRole,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + self.access_token_expires_in;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(ApiError::Jwt)
    }

    /// Validate and decode an access token
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::unauthorized("Could not validate credentials"),
            })
    }

    /// Extract the authenticated principal from an access token
    pub fn extract_auth_user(&self, token: &str) -> Result<AuthUser, ApiError> {
        let claims = self.validate_token(token)?;
        AuthUser::from_claims(&claims)
            .map_err(|_| ApiError::unauthorized("Could not validate credentials"))
    }

    /// Get access token expiration time in seconds
    pub fn access_token_expires_in_seconds(&self) -> usize {
        self.access_token_expires_in.num_seconds() as usize
    }

    pub fn create_email_verification_token(&self, email: &str) -> Result<String, ApiError> {
        self.create_purpose_token(email, VERIFY_PURPOSE, self.verification_token_expires_in)
    }

    /// Returns the email the token was issued for, or None when the token
    /// is invalid, expired, or issued for another purpose.
    pub fn verify_email_verification_token(&self, token: &str) -> Option<String> {
        self.verify_purpose_token(token, VERIFY_PURPOSE)
    }

    pub fn create_reset_token(&self, email: &str) -> Result<String, ApiError> {
        self.create_purpose_token(email, RESET_PURPOSE, self.reset_token_expires_in)
    }

    pub fn verify_reset_token(&self, token: &str) -> Option<String> {
        self.verify_purpose_token(token, RESET_PURPOSE)
    }

    fn create_purpose_token(
        &self,
        email: &str,
        purpose: &str,
        expires_in: Duration,
    ) -> Result<String, ApiError> {
        let claims = PurposeClaims {
            sub: email.to_string(),
            purpose: purpose.to_string(),
            exp: (Utc::now() + expires_in).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(ApiError::Jwt)
    }

    fn verify_purpose_token(&self, token: &str, purpose: &str) -> Option<String> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<PurposeClaims>(token, &self.decoding_key, &validation)
            .ok()?
            .claims;

        (claims.purpose == purpose).then_some(claims.sub)
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, ApiError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header format"))?;

    if token.is_empty() {
        return Err(ApiError::unauthorized(
            "Invalid authorization header format",
        ));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let jwt_service = JwtService::new("test_secret");
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_access_token(user_id, "maria", "maria@example.com", UserRole::Coach)
            .unwrap();

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, UserRole::Coach);

        let principal = jwt_service.extract_auth_user(&token).unwrap();
        assert_eq!(principal.id, user_id);
        assert_eq!(principal.role, UserRole::Coach);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");

        let token = issuer
            .create_access_token(Uuid::new_v4(), "sam", "sam@example.com", UserRole::User)
            .unwrap();

        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn purpose_tokens_do_not_cross_over() {
        let jwt_service = JwtService::new("test_secret");

        let verify = jwt_service
            .create_email_verification_token("sam@example.com")
            .unwrap();
        let reset = jwt_service.create_reset_token("sam@example.com").unwrap();

        assert_eq!(
            jwt_service.verify_email_verification_token(&verify).as_deref(),
            Some("sam@example.com")
        );
        assert_eq!(
            jwt_service.verify_reset_token(&reset).as_deref(),
            Some("sam@example.com")
        );

        // A reset token must not verify an email, and vice versa.
        assert!(jwt_service.verify_email_verification_token(&reset).is_none());
        assert!(jwt_service.verify_reset_token(&verify).is_none());
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(
            extract_bearer_token("Bearer test_token").unwrap(),
            "test_token"
        );

        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }
}
