use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::auth::{jwt_auth_middleware, require_role, ApiError, UserRole};
use crate::models::{UserCreateByAdmin, UserProfileUpdate, UserProfileView};

const DEFAULT_PAGE_SIZE: i64 = 50;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/profiles", get(list_profiles).post(create_user))
        .route(
            "/profiles/:id",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route_layer(middleware::from_fn(require_role(&[UserRole::Admin])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

#[tracing::instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreateByAdmin>,
) -> Result<(StatusCode, Json<UserProfileView>), ApiError> {
    let profile = state.admin().create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Deserialize)]
struct ListProfilesQuery {
    role: Option<UserRole>,
    skip: Option<i64>,
    limit: Option<i64>,
}

#[tracing::instrument(skip(state))]
async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<ListProfilesQuery>,
) -> Result<Json<Vec<UserProfileView>>, ApiError> {
    let profiles = state
        .admin()
        .list_profiles(
            params.role,
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(Json(profiles))
}

#[tracing::instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfileView>, ApiError> {
    let profile = state.admin().get_profile(user_id).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserProfileUpdate>,
) -> Result<Json<UserProfileView>, ApiError> {
    let profile = state.admin().update_profile(user_id, payload).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state))]
async fn delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.admin().delete_profile(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
