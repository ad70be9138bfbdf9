use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::UserRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender_type", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account projection without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfileView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
}

impl From<&User> for UserProfileView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            phone_number: user.phone_number.clone(),
            age: user.age,
            gender: user.gender,
            location: user.location.clone(),
            profile_photo: user.profile_photo.clone(),
            is_verified: user.is_verified,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
}

impl UserProfileUpdate {
    /// Age limits from the public registration form.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(age) = self.age {
            if !(1..120).contains(&age) {
                return Err("age must be between 1 and 119".to_string());
            }
        }
        Ok(())
    }
}

/// Admin-created account request. Admin-created users skip email verification.
#[derive(Debug, Deserialize)]
pub struct UserCreateByAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_update() -> UserProfileUpdate {
        UserProfileUpdate {
            first_name: None,
            last_name: None,
            phone_number: None,
            age: None,
            gender: None,
            location: None,
        }
    }

    #[test]
    fn age_bounds_are_enforced() {
        let mut update = base_update();
        update.age = Some(30);
        assert!(update.validate().is_ok());

        update.age = Some(0);
        assert!(update.validate().is_err());

        update.age = Some(120);
        assert!(update.validate().is_err());
    }
}
