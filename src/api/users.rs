use axum::{extract::State, middleware, response::Json, routing::get, Extension, Router};

use super::AppState;
use crate::auth::{jwt_auth_middleware, require_role, ApiError, AuthUser, UserRole};
use crate::models::{UserProfileUpdate, UserProfileView};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route_layer(middleware::from_fn(require_role(&[
            UserRole::User,
            UserRole::Admin,
        ])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
) -> Result<Json<UserProfileView>, ApiError> {
    let profile = state.users().get_me(principal.id).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, payload))]
async fn update_me(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<UserProfileUpdate>,
) -> Result<Json<UserProfileView>, ApiError> {
    let profile = state.users().update_me(principal.id, payload).await?;
    Ok(Json(profile))
}
