use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's private diary entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Journal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct JournalCreate {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JournalUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub mood: Option<String>,
}
