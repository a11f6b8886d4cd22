//! Health check endpoint

use super::AppState;
use axum::Json;
use axum::extract::State;

/// Reports service name, version and church name.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "church": &*state.church_name,
    }))
}
