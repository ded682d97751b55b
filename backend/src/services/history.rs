//! Prediction history store
//!
//! Durable, append-only log of prediction events backed by SQLite. Writes
//! run inside a transaction and are rolled back explicitly on failure, so a
//! reader never sees a partial record. Identifiers come from an AUTOINCREMENT
//! key and are never reused after deletion.

use chrono::{DateTime, Utc};
use shared::{join_crop_list, split_crop_list, FeatureVector, PredictionRecord, RankingError};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::error::{AppError, AppResult};

const RECORD_COLUMNS: &str =
    "id, N, P, K, temperature, humidity, ph, rainfall, predicted_crop, top_3_crops, timestamp";

/// Prediction history store
#[derive(Clone)]
pub struct HistoryService {
    db: SqlitePool,
}

/// Row as stored in the `predictions` table
#[derive(Debug, FromRow)]
struct PredictionRow {
    id: i64,
    #[sqlx(rename = "N")]
    nitrogen: f64,
    #[sqlx(rename = "P")]
    phosphorus: f64,
    #[sqlx(rename = "K")]
    potassium: f64,
    temperature: f64,
    humidity: f64,
    ph: f64,
    rainfall: f64,
    predicted_crop: String,
    top_3_crops: String,
    timestamp: DateTime<Utc>,
}

impl From<PredictionRow> for PredictionRecord {
    fn from(row: PredictionRow) -> Self {
        PredictionRecord {
            id: row.id,
            features: FeatureVector {
                nitrogen: row.nitrogen,
                phosphorus: row.phosphorus,
                potassium: row.potassium,
                temperature: row.temperature,
                humidity: row.humidity,
                ph: row.ph,
                rainfall: row.rainfall,
            },
            predicted_crop: row.predicted_crop,
            top_3_crops: split_crop_list(&row.top_3_crops),
            timestamp: row.timestamp,
        }
    }
}

impl HistoryService {
    /// Create a new HistoryService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record one prediction, stamped with the current UTC time
    pub async fn append(&self, v: &FeatureVector, top3: &[String]) -> AppResult<PredictionRecord> {
        self.append_at(v, top3, Utc::now()).await
    }

    /// Record one prediction with an explicit capture time
    pub async fn append_at(
        &self,
        v: &FeatureVector,
        top3: &[String],
        timestamp: DateTime<Utc>,
    ) -> AppResult<PredictionRecord> {
        let predicted_crop = top3
            .first()
            .ok_or(AppError::InvalidArgument(RankingError::EmptyRanking))?;

        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query_as::<_, PredictionRow>(&format!(
            r#"
            INSERT INTO predictions (
                N, P, K, temperature, humidity, ph, rainfall,
                predicted_crop, top_3_crops, timestamp
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(v.nitrogen)
        .bind(v.phosphorus)
        .bind(v.potassium)
        .bind(v.temperature)
        .bind(v.humidity)
        .bind(v.ph)
        .bind(v.rainfall)
        .bind(predicted_crop)
        .bind(join_crop_list(top3))
        .bind(timestamp)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        };
        tx.commit().await?;

        tracing::info!(
            "Recorded prediction {} ({})",
            row.id,
            row.top_3_crops
        );
        Ok(row.into())
    }

    /// Every record, newest first; equal timestamps put the higher id first
    pub async fn list_all(&self) -> AppResult<Vec<PredictionRecord>> {
        let rows = sqlx::query_as::<_, PredictionRow>(&format!(
            "SELECT {} FROM predictions ORDER BY timestamp DESC, id DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PredictionRecord::from).collect())
    }

    /// Fetch a single record
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<PredictionRecord>> {
        let row = sqlx::query_as::<_, PredictionRow>(&format!(
            "SELECT {} FROM predictions WHERE id = ?",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(PredictionRecord::from))
    }

    /// Delete a record. Returns false when no record has this id.
    pub async fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query("DELETE FROM predictions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        let rows_affected = match deleted {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        };
        tx.commit().await?;

        if rows_affected > 0 {
            tracing::info!("Deleted prediction {}", id);
        } else {
            tracing::debug!("Delete of unknown prediction {}", id);
        }
        Ok(rows_affected > 0)
    }

    /// Check the database answers queries
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }
}

async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Rollback failed: {}", e);
    }
}
