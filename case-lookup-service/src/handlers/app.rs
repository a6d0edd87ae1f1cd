use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn index() -> &'static str {
    "Hello World"
}

/// Liveness probe. Does not touch the spreadsheet service.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version,
    }))
}
