use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PsychTest {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PsychQuestion {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PsychOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PsychUserResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub question_id: Uuid,
    pub option_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// Admin create/update payloads

#[derive(Debug, Deserialize)]
pub struct PsychOptionCreate {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct PsychOptionUpdate {
    pub text: Option<String>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PsychQuestionCreate {
    pub text: String,
    pub options: Vec<PsychOptionCreate>,
}

#[derive(Debug, Deserialize)]
pub struct PsychQuestionUpdate {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PsychTestCreate {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PsychQuestionCreate>,
}

#[derive(Debug, Deserialize)]
pub struct PsychTestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PsychUserResponseCreate {
    pub question_id: Uuid,
    pub option_id: Uuid,
}

// Views

/// Option as shown to a test taker or an admin. `is_correct` is only
/// populated for admins; the user projection drops it from the payload.
#[derive(Debug, Serialize)]
pub struct PsychOptionView {
    pub id: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PsychQuestionView {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<PsychOptionView>,
}

#[derive(Debug, Serialize)]
pub struct PsychTestView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PsychQuestionView>,
}
