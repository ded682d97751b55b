//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::HistoryService;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub models: ModelHealth,
}

#[derive(Serialize)]
pub struct ModelHealth {
    pub scaler: String,
    pub classifier: String,
}

fn availability(ready: bool) -> String {
    let state = if ready { "loaded" } else { "unavailable" };
    state.to_string()
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = HistoryService::new(state.db).ping().await;
    let status = if db_ok && state.models.is_ready() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_ok { "connected" } else { "disconnected" }.to_string(),
        models: ModelHealth {
            scaler: availability(state.models.scaler_ready()),
            classifier: availability(state.models.classifier_ready()),
        },
    })
}
