use axum::response::Json;
use serde_json::{json, Value};

/// Liveness endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mindwell",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
