//! HTTP handlers for crop prediction

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::services::PredictionService;
use crate::AppState;

/// Successful prediction
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_crop: String,
    pub top_3_crops: Vec<String>,
    pub record_id: i64,
}

/// Rank crops for the submitted measurements and record the request
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(raw) = payload.map_err(|e| AppError::MalformedBody(e.body_text()))?;

    let service = PredictionService::new(state.db, state.models);
    let record = service.predict(&raw).await?;

    Ok(Json(PredictResponse {
        predicted_crop: record.predicted_crop,
        top_3_crops: record.top_3_crops,
        record_id: record.id,
    }))
}
