//! Route definitions for the crop advisor

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .nest("/history", history_routes())
}

/// Prediction history routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_history))
        .route(
            "/:id",
            get(handlers::get_history_entry).delete(handlers::delete_history_entry),
        )
}
