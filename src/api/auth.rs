use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};

use super::AppState;
use crate::auth::{
    jwt_auth_middleware, require_role, ApiError, AuthUser, ForgotPasswordRequest, LoginRequest,
    MessageResponse, RegisterRequest, ResendVerificationRequest, ResetPasswordRequest,
    TokenResponse, UserRole, VerifyEmailRequest,
};
use crate::models::UserProfileView;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route(
            "/me",
            get(me)
                .route_layer(middleware::from_fn(require_role(&[
                    UserRole::User,
                    UserRole::Coach,
                ])))
                .route_layer(middleware::from_fn_with_state(
                    state.auth.clone(),
                    jwt_auth_middleware,
                )),
        )
        .with_state(state)
}

#[tracing::instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfileView>), ApiError> {
    let profile = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[tracing::instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = state.auth.login(payload).await?;
    Ok(Json(tokens))
}

#[tracing::instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
) -> Result<Json<UserProfileView>, ApiError> {
    let profile = state.auth.get_me(principal.id).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, payload))]
async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.verify_email(payload).await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

#[tracing::instrument(skip(state, payload))]
async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.resend_verification(payload).await?;
    Ok(Json(MessageResponse::new("Verification email sent")))
}

#[tracing::instrument(skip(state, payload))]
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.forgot_password(payload).await?;
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

#[tracing::instrument(skip(state, payload))]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.reset_password(payload).await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}
