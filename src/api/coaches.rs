use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::auth::{jwt_auth_middleware, require_role, ApiError, AuthUser, UserRole};
use crate::models::{
    CoachAccountView, CoachBrowseView, CoachProfileUpsert, CoachProfileView, CoachSlotCreate,
    CoachSlotUpdate, SlotOwnerView,
};
use crate::services::format::{slot_owner_view, slot_public_view};

const PUBLIC_SLOT_PREVIEW: i64 = 5;

pub fn routes(state: AppState) -> Router {
    let account = Router::new()
        .route("/me", get(get_coach_me))
        .route("/me/profile", post(upsert_profile).put(upsert_profile))
        .route("/me/availability", put(set_availability))
        .route_layer(middleware::from_fn(require_role(&[
            UserRole::Coach,
            UserRole::Admin,
        ])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    let slots = Router::new()
        .route("/me/slots", post(create_slot).get(list_my_slots))
        .route("/me/slots/:id", put(update_slot).delete(delete_slot))
        .route_layer(middleware::from_fn(require_role(&[UserRole::Coach])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/", get(browse_coaches))
        .route("/:id", get(get_coach))
        .merge(account)
        .merge(slots)
        .with_state(state)
}

// Account + profile

#[tracing::instrument(skip(state))]
async fn get_coach_me(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
) -> Result<Json<CoachAccountView>, ApiError> {
    let account = state.coaches().get_coach_me(principal.id).await?;
    Ok(Json(account))
}

#[tracing::instrument(skip(state, payload))]
async fn upsert_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<CoachProfileUpsert>,
) -> Result<Json<CoachProfileView>, ApiError> {
    let profile = state.coaches().upsert_profile(principal.id, payload).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
struct AvailabilityUpdate {
    availability_status: bool,
}

#[tracing::instrument(skip(state, payload))]
async fn set_availability(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<AvailabilityUpdate>,
) -> Result<Json<CoachProfileView>, ApiError> {
    let profile = state
        .coaches()
        .set_availability(principal.id, payload.availability_status)
        .await?;
    Ok(Json(profile))
}

// Slots

#[tracing::instrument(skip(state, payload))]
async fn create_slot(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<CoachSlotCreate>,
) -> Result<(StatusCode, Json<SlotOwnerView>), ApiError> {
    let slot = state.slots().create_slot(principal.id, payload).await?;
    Ok((StatusCode::CREATED, Json(slot_owner_view(&slot))))
}

#[tracing::instrument(skip(state))]
async fn list_my_slots(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
) -> Result<Json<Vec<SlotOwnerView>>, ApiError> {
    let slots = state.slots().list_slots_for_coach(principal.id).await?;
    Ok(Json(slots.iter().map(slot_owner_view).collect()))
}

#[tracing::instrument(skip(state, payload))]
async fn update_slot(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(slot_id): Path<Uuid>,
    Json(payload): Json<CoachSlotUpdate>,
) -> Result<Json<SlotOwnerView>, ApiError> {
    let slot = state
        .slots()
        .update_slot(slot_id, principal.id, payload)
        .await?;
    Ok(Json(slot_owner_view(&slot)))
}

#[tracing::instrument(skip(state))]
async fn delete_slot(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(slot_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.slots().delete_slot(slot_id, principal.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Public browse

#[derive(Debug, Deserialize)]
struct BrowseQuery {
    specialization: Option<String>,
    #[serde(default)]
    available_only: bool,
}

#[tracing::instrument(skip(state))]
async fn browse_coaches(
    State(state): State<AppState>,
    Query(params): Query<BrowseQuery>,
) -> Result<Json<Vec<CoachBrowseView>>, ApiError> {
    let coaches = state
        .coaches()
        .browse(
            params.specialization,
            params.available_only,
            Utc::now(),
            &state.slots(),
        )
        .await?;
    Ok(Json(coaches))
}

#[tracing::instrument(skip(state))]
async fn get_coach(
    State(state): State<AppState>,
    Path(coach_id): Path<Uuid>,
) -> Result<Json<CoachBrowseView>, ApiError> {
    let coach = state.coaches().get_public_coach(coach_id).await?;
    let slots = state
        .slots()
        .list_available_slots(coach_id, PUBLIC_SLOT_PREVIEW, Utc::now())
        .await?;

    Ok(Json(CoachBrowseView {
        coach,
        available_slots: slots.iter().map(slot_public_view).collect(),
    }))
}
