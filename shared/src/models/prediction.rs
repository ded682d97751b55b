//! Prediction history models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::FeatureVector;

/// Number of ranked crops returned and recorded per prediction
pub const TOP_K: usize = 3;

/// Delimiter used when the ranked list is stored as a single column
pub const CROP_LIST_DELIMITER: &str = ",";

/// One durable entry of the prediction audit log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRecord {
    pub id: i64,
    #[serde(flatten)]
    pub features: FeatureVector,
    /// Always the first element of `top_3_crops`
    pub predicted_crop: String,
    pub top_3_crops: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl PredictionRecord {
    /// Timestamp rendered for display, e.g. `2024-03-01 14:05:09`
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Join ranked crops into the stored column format
pub fn join_crop_list(crops: &[String]) -> String {
    crops.join(CROP_LIST_DELIMITER)
}

/// Split the stored column format back into ranked crops
pub fn split_crop_list(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    stored
        .split(CROP_LIST_DELIMITER)
        .map(|s| s.to_string())
        .collect()
}
