//! Crop prediction pipeline
//!
//! codec → scaler → classifier → ranker, then the result is recorded in the
//! history store. Every failure before the final step returns without
//! touching the store.

use serde_json::Value;
use shared::{decode_value, top_k, FeatureVector, PredictionRecord, TOP_K};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::error::AppResult;
use crate::inference::ModelBundle;
use crate::services::history::HistoryService;

/// Prediction service
#[derive(Clone)]
pub struct PredictionService {
    models: Arc<ModelBundle>,
    history: HistoryService,
}

impl PredictionService {
    /// Create a new PredictionService instance
    pub fn new(db: SqlitePool, models: Arc<ModelBundle>) -> Self {
        Self {
            models,
            history: HistoryService::new(db),
        }
    }

    /// Validate, rank and record one request
    pub async fn predict(&self, raw: &Value) -> AppResult<PredictionRecord> {
        let features = decode_value(raw)?;
        let ranked = self.rank(&features)?;
        self.history.append(&features, &ranked).await
    }

    /// Top crops for a feature vector, best first. No side effects.
    pub fn rank(&self, features: &FeatureVector) -> AppResult<Vec<String>> {
        let normalized = self.models.normalize(features)?;
        let scores = self.models.score_all(&normalized)?;
        Ok(top_k(&scores, TOP_K)?)
    }
}
