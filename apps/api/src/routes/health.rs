use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and whether the reference tables are usable.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let status = if state.reference.is_ready() {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "service": "fastlabor-api",
        "profile_store": state.config.profile_backend.as_str(),
        "reference_revision": state.reference.revision(),
    }))
}
