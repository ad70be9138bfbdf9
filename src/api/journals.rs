use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::auth::{jwt_auth_middleware, require_role, ApiError, AuthUser, UserRole};
use crate::models::{Journal, JournalCreate, JournalUpdate};

pub fn routes(state: AppState) -> Router {
    let user = Router::new()
        .route("/", post(create_journal))
        .route("/me", get(list_my_journals))
        .route(
            "/:id",
            get(get_journal).put(update_journal).delete(delete_journal),
        )
        .route_layer(middleware::from_fn(require_role(&[UserRole::User])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    let admin = Router::new()
        .route("/admin", get(admin_list_journals))
        .route("/admin/:id", get(admin_get_journal))
        .route_layer(middleware::from_fn(require_role(&[UserRole::Admin])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    user.merge(admin).with_state(state)
}

#[tracing::instrument(skip(state, payload))]
async fn create_journal(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<JournalCreate>,
) -> Result<(StatusCode, Json<Journal>), ApiError> {
    let journal = state.journals().create_journal(principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(journal)))
}

#[derive(Debug, Deserialize)]
struct JournalListQuery {
    /// Restrict to entries created on this calendar date (YYYY-MM-DD).
    date: Option<NaiveDate>,
}

#[tracing::instrument(skip(state))]
async fn list_my_journals(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Query(params): Query<JournalListQuery>,
) -> Result<Json<Vec<Journal>>, ApiError> {
    let journals = state
        .journals()
        .list_journals(principal.id, params.date)
        .await?;
    Ok(Json(journals))
}

#[tracing::instrument(skip(state))]
async fn get_journal(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
) -> Result<Json<Journal>, ApiError> {
    let journal = state.journals().get_journal(journal_id, principal.id).await?;
    Ok(Json(journal))
}

#[tracing::instrument(skip(state, payload))]
async fn update_journal(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
    Json(payload): Json<JournalUpdate>,
) -> Result<Json<Journal>, ApiError> {
    let journal = state
        .journals()
        .update_journal(journal_id, principal.id, payload)
        .await?;
    Ok(Json(journal))
}

#[tracing::instrument(skip(state))]
async fn delete_journal(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .journals()
        .delete_journal(journal_id, principal.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Admin moderation window

#[derive(Debug, Deserialize)]
struct AdminJournalsQuery {
    user_id: Option<Uuid>,
}

#[tracing::instrument(skip(state))]
async fn admin_list_journals(
    State(state): State<AppState>,
    Query(params): Query<AdminJournalsQuery>,
) -> Result<Json<Vec<Journal>>, ApiError> {
    let journals = state.journals().admin_list_journals(params.user_id).await?;
    Ok(Json(journals))
}

#[tracing::instrument(skip(state))]
async fn admin_get_journal(
    State(state): State<AppState>,
    Path(journal_id): Path<Uuid>,
) -> Result<Json<Journal>, ApiError> {
    let journal = state.journals().admin_get_journal(journal_id).await?;
    Ok(Json(journal))
}
