//! HTTP handlers for prediction history

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{FeatureVector, PredictionRecord};

use crate::error::{AppError, AppResult};
use crate::services::HistoryService;
use crate::AppState;

/// One history entry as returned to clients
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(flatten)]
    pub features: FeatureVector,
    pub predicted_crop: String,
    pub top_3_crops: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub formatted_timestamp: String,
}

impl From<PredictionRecord> for HistoryEntry {
    fn from(record: PredictionRecord) -> Self {
        let formatted_timestamp = record.formatted_timestamp();
        Self {
            id: record.id,
            features: record.features,
            predicted_crop: record.predicted_crop,
            top_3_crops: record.top_3_crops,
            timestamp: record.timestamp,
            formatted_timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: i64,
}

/// List all predictions, newest first
pub async fn list_history(State(state): State<AppState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    let service = HistoryService::new(state.db);
    let records = service.list_all().await?;
    Ok(Json(records.into_iter().map(HistoryEntry::from).collect()))
}

/// Get one prediction by id
pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<HistoryEntry>> {
    let service = HistoryService::new(state.db);
    let record = service.get_by_id(id).await?.ok_or(AppError::NotFound(id))?;
    Ok(Json(record.into()))
}

/// Delete one prediction by id
pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    let service = HistoryService::new(state.db);
    if !service.delete_by_id(id).await? {
        return Err(AppError::NotFound(id));
    }
    Ok(Json(DeleteResponse { deleted: true, id }))
}
