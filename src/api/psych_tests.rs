use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use super::AppState;
use crate::auth::{jwt_auth_middleware, require_role, ApiError, AuthUser, UserRole};
use crate::models::{
    PsychOptionCreate, PsychOptionUpdate, PsychOptionView, PsychQuestionCreate,
    PsychQuestionUpdate, PsychQuestionView, PsychTestCreate, PsychTestPatch, PsychTestView,
    PsychUserResponse, PsychUserResponseCreate,
};

pub fn routes(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin", post(create_test))
        .route(
            "/admin/:id",
            get(admin_get_test)
                .put(patch_test)
                .patch(patch_test)
                .delete(delete_test),
        )
        .route("/admin/:id/questions", post(add_question))
        .route(
            "/admin/questions/:id",
            put(update_question).delete(delete_question),
        )
        .route("/admin/questions/:id/options", post(add_option))
        .route(
            "/admin/options/:id",
            put(update_option).delete(delete_option),
        )
        .route_layer(middleware::from_fn(require_role(&[UserRole::Admin])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    let user = Router::new()
        .route("/", get(list_tests))
        .route("/:id", get(get_test))
        .route("/:id/responses", post(submit_response))
        .route("/:id/responses/me", get(my_responses))
        .route_layer(middleware::from_fn(require_role(&[UserRole::User])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    admin.merge(user).with_state(state)
}

// Admin catalogue

#[tracing::instrument(skip(state, payload))]
async fn create_test(
    State(state): State<AppState>,
    Json(payload): Json<PsychTestCreate>,
) -> Result<(StatusCode, Json<PsychTestView>), ApiError> {
    let test = state.psych().create_test(payload).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

#[tracing::instrument(skip(state))]
async fn admin_get_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> Result<Json<PsychTestView>, ApiError> {
    let test = state.psych().get_test(test_id, true).await?;
    Ok(Json(test))
}

#[tracing::instrument(skip(state, payload))]
async fn patch_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<PsychTestPatch>,
) -> Result<Json<PsychTestView>, ApiError> {
    let test = state.psych().patch_test(test_id, payload).await?;
    Ok(Json(test))
}

#[tracing::instrument(skip(state))]
async fn delete_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.psych().delete_test(test_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, payload))]
async fn add_question(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<PsychQuestionCreate>,
) -> Result<(StatusCode, Json<PsychQuestionView>), ApiError> {
    let question = state.psych().add_question(test_id, payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[tracing::instrument(skip(state, payload))]
async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<PsychQuestionUpdate>,
) -> Result<Json<PsychQuestionView>, ApiError> {
    let question = state.psych().update_question(question_id, payload).await?;
    Ok(Json(question))
}

#[tracing::instrument(skip(state))]
async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.psych().delete_question(question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, payload))]
async fn add_option(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<PsychOptionCreate>,
) -> Result<(StatusCode, Json<PsychOptionView>), ApiError> {
    let option = state.psych().add_option(question_id, payload).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

#[tracing::instrument(skip(state, payload))]
async fn update_option(
    State(state): State<AppState>,
    Path(option_id): Path<Uuid>,
    Json(payload): Json<PsychOptionUpdate>,
) -> Result<Json<PsychOptionView>, ApiError> {
    let option = state.psych().update_option(option_id, payload).await?;
    Ok(Json(option))
}

#[tracing::instrument(skip(state))]
async fn delete_option(
    State(state): State<AppState>,
    Path(option_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.psych().delete_option(option_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// User surface: answer keys stay hidden

#[tracing::instrument(skip(state))]
async fn list_tests(State(state): State<AppState>) -> Result<Json<Vec<PsychTestView>>, ApiError> {
    let tests = state.psych().list_tests(false).await?;
    Ok(Json(tests))
}

#[tracing::instrument(skip(state))]
async fn get_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> Result<Json<PsychTestView>, ApiError> {
    let test = state.psych().get_test(test_id, false).await?;
    Ok(Json(test))
}

#[tracing::instrument(skip(state, payload))]
async fn submit_response(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<PsychUserResponseCreate>,
) -> Result<(StatusCode, Json<PsychUserResponse>), ApiError> {
    let response = state
        .psych()
        .submit_response(principal.id, test_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state))]
async fn my_responses(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(test_id): Path<Uuid>,
) -> Result<Json<Vec<PsychUserResponse>>, ApiError> {
    let responses = state.psych().user_responses(principal.id, test_id).await?;
    Ok(Json(responses))
}
