use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::auth::{jwt_auth_middleware, require_role, ApiError, AuthUser, UserRole};
use crate::models::{
    Booking, BookingCreate, BookingDetailedView, BookingStatus, BookingUpdate, CoachBookingView,
};
use crate::services::format::{booking_detailed_view, coach_booking_view};

const DEFAULT_PAGE_SIZE: i64 = 20;

/// Booking lists hide past bookings unless `upcoming=false` is passed.
fn default_upcoming() -> bool {
    true
}

pub fn routes(state: AppState) -> Router {
    let user = Router::new()
        .route("/user", post(create_booking))
        .route("/me", get(list_my_bookings))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route_layer(middleware::from_fn(require_role(&[UserRole::User])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    let coach = Router::new()
        .route("/coach", get(list_coach_bookings))
        .route("/coach/:id", get(get_coach_booking))
        .route_layer(middleware::from_fn(require_role(&[UserRole::Coach])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    let admin = Router::new()
        .route("/admin", get(admin_list_bookings))
        .route("/admin/:id", get(admin_get_booking))
        .route_layer(middleware::from_fn(require_role(&[UserRole::Admin])))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            jwt_auth_middleware,
        ));

    user.merge(coach).merge(admin).with_state(state)
}

/// Booking joined with its live slot and the coach's public account.
async fn detail(state: &AppState, booking: &Booking) -> Result<BookingDetailedView, ApiError> {
    let slot = state.bookings().slot_for(booking).await?;
    let coach = state.coaches().coach_account_for(booking.coach_id).await?;
    Ok(booking_detailed_view(booking, slot.as_ref(), coach))
}

// User surface

#[tracing::instrument(skip(state, payload))]
async fn create_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Json(payload): Json<BookingCreate>,
) -> Result<(StatusCode, Json<BookingDetailedView>), ApiError> {
    let booking = state.bookings().create_booking(principal.id, payload).await?;
    let view = detail(&state, &booking).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
struct MyBookingsQuery {
    status: Option<BookingStatus>,
    #[serde(default = "default_upcoming")]
    upcoming: bool,
}

#[tracing::instrument(skip(state))]
async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Query(params): Query<MyBookingsQuery>,
) -> Result<Json<Vec<BookingDetailedView>>, ApiError> {
    let bookings = state
        .bookings()
        .get_user_bookings(principal.id, params.status, params.upcoming, Utc::now())
        .await?;

    let mut views = Vec::with_capacity(bookings.len());
    for booking in &bookings {
        views.push(detail(&state, booking).await?);
    }
    Ok(Json(views))
}

#[tracing::instrument(skip(state))]
async fn get_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingDetailedView>, ApiError> {
    let booking = state.bookings().get_booking_by_id(booking_id).await?;
    if booking.user_id != principal.id {
        return Err(ApiError::forbidden("You cannot access this booking"));
    }

    let view = detail(&state, &booking).await?;
    Ok(Json(view))
}

#[tracing::instrument(skip(state, payload))]
async fn update_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<BookingUpdate>,
) -> Result<Json<BookingDetailedView>, ApiError> {
    let booking = state
        .bookings()
        .update_booking(booking_id, principal.id, payload)
        .await?;

    let view = detail(&state, &booking).await?;
    Ok(Json(view))
}

#[tracing::instrument(skip(state))]
async fn delete_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .bookings()
        .delete_booking(booking_id, principal.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Coach surface

#[derive(Debug, Deserialize)]
struct CoachBookingsQuery {
    status: Option<BookingStatus>,
    #[serde(default = "default_upcoming")]
    upcoming: bool,
    skip: Option<i64>,
    limit: Option<i64>,
}

#[tracing::instrument(skip(state))]
async fn list_coach_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Query(params): Query<CoachBookingsQuery>,
) -> Result<Json<Vec<CoachBookingView>>, ApiError> {
    let bookings = state
        .bookings()
        .coach_list_bookings(
            principal.id,
            params.status,
            params.upcoming,
            Utc::now(),
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let mut views = Vec::with_capacity(bookings.len());
    for booking in &bookings {
        let slot = state.bookings().slot_for(booking).await?;
        views.push(coach_booking_view(booking, slot.as_ref()));
    }
    Ok(Json(views))
}

#[tracing::instrument(skip(state))]
async fn get_coach_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CoachBookingView>, ApiError> {
    let booking = state
        .bookings()
        .get_coach_booking(principal.id, booking_id)
        .await?;
    let slot = state.bookings().slot_for(&booking).await?;
    Ok(Json(coach_booking_view(&booking, slot.as_ref())))
}

// Admin surface

#[derive(Debug, Deserialize)]
struct AdminBookingsQuery {
    status: Option<BookingStatus>,
    coach_id: Option<Uuid>,
    user_id: Option<Uuid>,
    skip: Option<i64>,
    limit: Option<i64>,
}

#[tracing::instrument(skip(state))]
async fn admin_list_bookings(
    State(state): State<AppState>,
    Query(params): Query<AdminBookingsQuery>,
) -> Result<Json<Vec<BookingDetailedView>>, ApiError> {
    let bookings = state
        .bookings()
        .admin_list_bookings(
            params.status,
            params.coach_id,
            params.user_id,
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let mut views = Vec::with_capacity(bookings.len());
    for booking in &bookings {
        views.push(detail(&state, booking).await?);
    }
    Ok(Json(views))
}

#[tracing::instrument(skip(state))]
async fn admin_get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingDetailedView>, ApiError> {
    let booking = state.bookings().get_booking_by_id(booking_id).await?;
    let view = detail(&state, &booking).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_lists_default_to_upcoming_only() {
        let query: MyBookingsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.upcoming);
        assert!(query.status.is_none());

        let query: CoachBookingsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.upcoming);
    }

    #[test]
    fn upcoming_filter_can_be_switched_off() {
        let query: MyBookingsQuery =
            serde_json::from_str(r#"{"upcoming": false, "status": "completed"}"#).unwrap();
        assert!(!query.upcoming);
        assert_eq!(query.status, Some(BookingStatus::Completed));
    }
}
