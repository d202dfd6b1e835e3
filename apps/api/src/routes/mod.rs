pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::info_handler))
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/predict", post(handlers::handle_predict))
        .route(
            "/predict/batch_json",
            post(handlers::handle_predict_batch_json),
        )
        .route("/predict/files", post(handlers::handle_predict_files))
        .route("/predict/batch", post(handlers::handle_predict_batch_files))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
