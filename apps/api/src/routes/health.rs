use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness probe with a UTC timestamp and service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /
/// Service name, version, active scorer, and the routes it serves.
pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "scorer": state.engine.scorer_name(),
        "endpoints": {
            "health": "GET /health",
            "predict": "POST /predict",
            "batch_json": "POST /predict/batch_json",
            "files": "POST /predict/files",
            "batch_files": "POST /predict/batch"
        }
    }))
}
