use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health::health_check;
use super::{admin, auth, bookings, coaches, journals, psych_tests, users, AppState};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth::routes(state.clone()))
        .nest("/users", users::routes(state.clone()))
        .nest("/coaches", coaches::routes(state.clone()))
        .nest("/bookings", bookings::routes(state.clone()))
        .nest("/journals", journals::routes(state.clone()))
        .nest("/psych-tests", psych_tests::routes(state.clone()))
        .nest("/admin", admin::routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
