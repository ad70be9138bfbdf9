use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::ApiError;
use crate::models::{Journal, JournalCreate, JournalUpdate};

const JOURNAL_COLUMNS: &str =
    "id, user_id, title, content, image_url, mood, created_at, updated_at";

/// Journal entries are strictly owner-scoped; admins get a separate
/// read-only window for moderation.
pub struct JournalService {
    db: PgPool,
}

impl JournalService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_journal(
        &self,
        user_id: Uuid,
        payload: JournalCreate,
    ) -> Result<Journal, ApiError> {
        if payload.title.trim().is_empty() {
            return Err(ApiError::validation("title must not be empty"));
        }

        let journal = sqlx::query_as::<_, Journal>(&format!(
            "INSERT INTO journals (id, user_id, title, content, image_url, mood)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {JOURNAL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(payload.title)
        .bind(payload.content)
        .bind(payload.image_url)
        .bind(payload.mood)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(journal_id = %journal.id, user_id = %user_id, "journal created");
        Ok(journal)
    }

    /// The caller's own entries, newest first, optionally restricted to one
    /// calendar date of creation.
    pub async fn list_journals(
        &self,
        user_id: Uuid,
        on_date: Option<NaiveDate>,
    ) -> Result<Vec<Journal>, ApiError> {
        let journals = sqlx::query_as::<_, Journal>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals
             WHERE user_id = $1 AND ($2::date IS NULL OR created_at::date = $2)
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .bind(on_date)
        .fetch_all(&self.db)
        .await?;

        Ok(journals)
    }

    pub async fn get_journal(&self, journal_id: Uuid, user_id: Uuid) -> Result<Journal, ApiError> {
        let journal = self.fetch(journal_id).await?;
        if journal.user_id != user_id {
            return Err(ApiError::forbidden("You cannot access this journal"));
        }
        Ok(journal)
    }

    pub async fn update_journal(
        &self,
        journal_id: Uuid,
        user_id: Uuid,
        payload: JournalUpdate,
    ) -> Result<Journal, ApiError> {
        self.get_journal(journal_id, user_id).await?;

        let journal = sqlx::query_as::<_, Journal>(&format!(
            "UPDATE journals SET
                 title = COALESCE($2, title),
                 content = COALESCE($3, content),
                 image_url = COALESCE($4, image_url),
                 mood = COALESCE($5, mood),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {JOURNAL_COLUMNS}"
        ))
        .bind(journal_id)
        .bind(payload.title)
        .bind(payload.content)
        .bind(payload.image_url)
        .bind(payload.mood)
        .fetch_one(&self.db)
        .await?;

        Ok(journal)
    }

    pub async fn delete_journal(&self, journal_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        self.get_journal(journal_id, user_id).await?;

        sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(journal_id)
            .execute(&self.db)
            .await?;

        tracing::info!(journal_id = %journal_id, user_id = %user_id, "journal deleted");
        Ok(())
    }

    // Admin moderation window

    pub async fn admin_list_journals(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Journal>, ApiError> {
        let journals = sqlx::query_as::<_, Journal>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals
             WHERE ($1::uuid IS NULL OR user_id = $1)
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(journals)
    }

    pub async fn admin_get_journal(&self, journal_id: Uuid) -> Result<Journal, ApiError> {
        self.fetch(journal_id).await
    }

    async fn fetch(&self, journal_id: Uuid) -> Result<Journal, ApiError> {
        sqlx::query_as::<_, Journal>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = $1"
        ))
        .bind(journal_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Journal not found"))
    }
}
