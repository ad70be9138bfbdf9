use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::ApiError;
use crate::models::{
    PsychOption, PsychOptionCreate, PsychOptionUpdate, PsychOptionView, PsychQuestion,
    PsychQuestionCreate, PsychQuestionUpdate, PsychQuestionView, PsychTest, PsychTestCreate,
    PsychTestPatch, PsychTestView, PsychUserResponse, PsychUserResponseCreate,
};

const TEST_COLUMNS: &str = "id, title, description";
const QUESTION_COLUMNS: &str = "id, test_id, text";
const OPTION_COLUMNS: &str = "id, question_id, text, is_correct";
const RESPONSE_COLUMNS: &str = "id, user_id, test_id, question_id, option_id, created_at";

/// Psychometric catalogue (admin-authored tests, questions, options) and
/// user answer submission. User-facing views never reveal which option is
/// marked correct.
pub struct PsychService {
    db: PgPool,
}

impl PsychService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // Admin catalogue management

    /// Create a test together with its nested questions and options in one
    /// transaction, so a half-written test is never visible.
    pub async fn create_test(&self, payload: PsychTestCreate) -> Result<PsychTestView, ApiError> {
        if payload.title.trim().is_empty() {
            return Err(ApiError::validation("title must not be empty"));
        }

        let mut tx = self.db.begin().await?;

        let test = sqlx::query_as::<_, PsychTest>(&format!(
            "INSERT INTO psych_tests (id, title, description)
             VALUES ($1, $2, $3)
             RETURNING {TEST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.title)
        .bind(payload.description)
        .fetch_one(&mut *tx)
        .await?;

        for question in payload.questions {
            insert_question(&mut tx, test.id, question).await?;
        }

        tx.commit().await?;

        tracing::info!(test_id = %test.id, "psych test created");
        self.get_test(test.id, true).await
    }

    pub async fn patch_test(
        &self,
        test_id: Uuid,
        payload: PsychTestPatch,
    ) -> Result<PsychTestView, ApiError> {
        let updated = sqlx::query_as::<_, PsychTest>(&format!(
            "UPDATE psych_tests SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {TEST_COLUMNS}"
        ))
        .bind(test_id)
        .bind(payload.title)
        .bind(payload.description)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Test not found"))?;

        self.get_test(updated.id, true).await
    }

    /// Deletes cascade to questions, options, and recorded responses.
    pub async fn delete_test(&self, test_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM psych_tests WHERE id = $1")
            .bind(test_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Test not found"));
        }

        tracing::info!(test_id = %test_id, "psych test deleted");
        Ok(())
    }

    pub async fn add_question(
        &self,
        test_id: Uuid,
        payload: PsychQuestionCreate,
    ) -> Result<PsychQuestionView, ApiError> {
        self.require_test(test_id).await?;

        let mut tx = self.db.begin().await?;
        let question = insert_question(&mut tx, test_id, payload).await?;
        tx.commit().await?;

        self.question_view(&question, true).await
    }

    pub async fn update_question(
        &self,
        question_id: Uuid,
        payload: PsychQuestionUpdate,
    ) -> Result<PsychQuestionView, ApiError> {
        let question = sqlx::query_as::<_, PsychQuestion>(&format!(
            "UPDATE psych_questions SET text = COALESCE($2, text)
             WHERE id = $1
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(question_id)
        .bind(payload.text)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Question not found"))?;

        self.question_view(&question, true).await
    }

    pub async fn delete_question(&self, question_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM psych_questions WHERE id = $1")
            .bind(question_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Question not found"));
        }
        Ok(())
    }

    pub async fn add_option(
        &self,
        question_id: Uuid,
        payload: PsychOptionCreate,
    ) -> Result<PsychOptionView, ApiError> {
        sqlx::query_as::<_, PsychQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM psych_questions WHERE id = $1"
        ))
        .bind(question_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Question not found"))?;

        let option = sqlx::query_as::<_, PsychOption>(&format!(
            "INSERT INTO psych_options (id, question_id, text, is_correct)
             VALUES ($1, $2, $3, $4)
             RETURNING {OPTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(payload.text)
        .bind(payload.is_correct)
        .fetch_one(&self.db)
        .await?;

        Ok(option_view(&option, true))
    }

    pub async fn update_option(
        &self,
        option_id: Uuid,
        payload: PsychOptionUpdate,
    ) -> Result<PsychOptionView, ApiError> {
        let option = sqlx::query_as::<_, PsychOption>(&format!(
            "UPDATE psych_options SET
                 text = COALESCE($2, text),
                 is_correct = COALESCE($3, is_correct)
             WHERE id = $1
             RETURNING {OPTION_COLUMNS}"
        ))
        .bind(option_id)
        .bind(payload.text)
        .bind(payload.is_correct)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Option not found"))?;

        Ok(option_view(&option, true))
    }

    pub async fn delete_option(&self, option_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM psych_options WHERE id = $1")
            .bind(option_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Option not found"));
        }
        Ok(())
    }

    // Shared reads

    pub async fn list_tests(&self, reveal_answers: bool) -> Result<Vec<PsychTestView>, ApiError> {
        let tests = sqlx::query_as::<_, PsychTest>(&format!(
            "SELECT {TEST_COLUMNS} FROM psych_tests ORDER BY title"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut views = Vec::with_capacity(tests.len());
        for test in &tests {
            views.push(self.test_view(test, reveal_answers).await?);
        }
        Ok(views)
    }

    pub async fn get_test(
        &self,
        test_id: Uuid,
        reveal_answers: bool,
    ) -> Result<PsychTestView, ApiError> {
        let test = self.require_test(test_id).await?;
        self.test_view(&test, reveal_answers).await
    }

    // User answers

    /// Record an answer. The question must belong to the test and the option
    /// to the question; repeat submissions are allowed and recorded anew.
    pub async fn submit_response(
        &self,
        user_id: Uuid,
        test_id: Uuid,
        payload: PsychUserResponseCreate,
    ) -> Result<PsychUserResponse, ApiError> {
        let question = sqlx::query_as::<_, PsychQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM psych_questions WHERE id = $1 AND test_id = $2"
        ))
        .bind(payload.question_id)
        .bind(test_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::validation("Question does not belong to this test"))?;

        sqlx::query_as::<_, PsychOption>(&format!(
            "SELECT {OPTION_COLUMNS} FROM psych_options WHERE id = $1 AND question_id = $2"
        ))
        .bind(payload.option_id)
        .bind(question.id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::validation("Option does not belong to this question"))?;

        let response = sqlx::query_as::<_, PsychUserResponse>(&format!(
            "INSERT INTO psych_user_responses (id, user_id, test_id, question_id, option_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {RESPONSE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(test_id)
        .bind(question.id)
        .bind(payload.option_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, test_id = %test_id, "psych response recorded");
        Ok(response)
    }

    pub async fn user_responses(
        &self,
        user_id: Uuid,
        test_id: Uuid,
    ) -> Result<Vec<PsychUserResponse>, ApiError> {
        self.require_test(test_id).await?;

        let responses = sqlx::query_as::<_, PsychUserResponse>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM psych_user_responses
             WHERE user_id = $1 AND test_id = $2
             ORDER BY created_at"
        ))
        .bind(user_id)
        .bind(test_id)
        .fetch_all(&self.db)
        .await?;

        Ok(responses)
    }

    async fn require_test(&self, test_id: Uuid) -> Result<PsychTest, ApiError> {
        sqlx::query_as::<_, PsychTest>(&format!(
            "SELECT {TEST_COLUMNS} FROM psych_tests WHERE id = $1"
        ))
        .bind(test_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Test not found"))
    }

    async fn test_view(
        &self,
        test: &PsychTest,
        reveal_answers: bool,
    ) -> Result<PsychTestView, ApiError> {
        let questions = sqlx::query_as::<_, PsychQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM psych_questions WHERE test_id = $1 ORDER BY id"
        ))
        .bind(test.id)
        .fetch_all(&self.db)
        .await?;

        let mut question_views = Vec::with_capacity(questions.len());
        for question in &questions {
            question_views.push(self.question_view(question, reveal_answers).await?);
        }

        Ok(PsychTestView {
            id: test.id,
            title: test.title.clone(),
            description: test.description.clone(),
            questions: question_views,
        })
    }

    async fn question_view(
        &self,
        question: &PsychQuestion,
        reveal_answers: bool,
    ) -> Result<PsychQuestionView, ApiError> {
        let options = sqlx::query_as::<_, PsychOption>(&format!(
            "SELECT {OPTION_COLUMNS} FROM psych_options WHERE question_id = $1 ORDER BY id"
        ))
        .bind(question.id)
        .fetch_all(&self.db)
        .await?;

        Ok(PsychQuestionView {
            id: question.id,
            text: question.text.clone(),
            options: options
                .iter()
                .map(|option| option_view(option, reveal_answers))
                .collect(),
        })
    }
}

async fn insert_question(
    tx: &mut Transaction<'_, Postgres>,
    test_id: Uuid,
    payload: PsychQuestionCreate,
) -> Result<PsychQuestion, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::validation("question text must not be empty"));
    }

    let question = sqlx::query_as::<_, PsychQuestion>(&format!(
        "INSERT INTO psych_questions (id, test_id, text)
         VALUES ($1, $2, $3)
         RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(test_id)
    .bind(payload.text)
    .fetch_one(&mut **tx)
    .await?;

    for option in payload.options {
        sqlx::query("INSERT INTO psych_options (id, question_id, text, is_correct) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::new_v4())
            .bind(question.id)
            .bind(option.text)
            .bind(option.is_correct)
            .execute(&mut **tx)
            .await?;
    }

    Ok(question)
}

fn option_view(option: &PsychOption, reveal_answers: bool) -> PsychOptionView {
    PsychOptionView {
        id: option.id,
        text: option.text.clone(),
        is_correct: reveal_answers.then_some(option.is_correct),
    }
}
