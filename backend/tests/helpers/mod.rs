//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use crop_advisor_backend::{
    config::{CorsConfig, DatabaseConfig, ModelConfig, ServerConfig},
    db,
    inference::{FittedClassifier, FittedScaler},
    AppState, Config, ModelBundle,
};
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Single-connection in-memory database with the schema applied.
/// Each connection to `sqlite::memory:` is its own database, so the pool
/// must never open a second one.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// Temporary database file path, removed by [`remove_db_files`]
pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("crop-advisor-{}.db", uuid::Uuid::new_v4()))
}

pub fn remove_db_files(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

pub fn file_db_config(path: &PathBuf) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 4,
        min_connections: 1,
        busy_timeout_ms: 5000,
    }
}

/// Paths of the demo artifacts shipped in the repository
pub fn demo_model_config() -> ModelConfig {
    let root = concat!(env!("CARGO_MANIFEST_DIR"), "/../models");
    ModelConfig {
        scaler_path: format!("{}/scaler.json", root),
        classifier_path: format!("{}/classifier.json", root),
    }
}

pub fn missing_model_config() -> ModelConfig {
    ModelConfig {
        scaler_path: "/nonexistent/scaler.json".to_string(),
        classifier_path: "/nonexistent/classifier.json".to_string(),
    }
}

/// Scaler with the value ranges of the public crop recommendation dataset
pub fn fixed_scaler() -> FittedScaler {
    FittedScaler::MinMax {
        data_min: vec![0.0, 5.0, 5.0, 8.8, 14.3, 3.5, 20.2],
        data_max: vec![140.0, 145.0, 205.0, 43.7, 99.9, 9.9, 298.6],
        feature_range: (0.0, 1.0),
    }
}

/// Logistic model that ranks the sample request rice, jute, banana
pub fn fixed_classifier() -> FittedClassifier {
    FittedClassifier::LogisticRegression {
        classes: ["rice", "maize", "coffee", "jute", "chickpea", "banana"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        coefficients: vec![
            vec![0.5, 0.0, 0.0, 0.0, 2.0, 0.0, 3.0],
            vec![1.0, 0.5, 0.0, 1.0, 0.0, 0.0, -1.0],
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            vec![0.0, 1.0, 1.0, 0.0, -2.0, 0.0, -1.0],
            vec![1.0, 1.0, 1.0, 0.0, 0.5, 0.0, 0.0],
        ],
        intercepts: vec![0.0; 6],
    }
}

pub fn fixed_models() -> Arc<ModelBundle> {
    Arc::new(ModelBundle::new(fixed_scaler(), fixed_classifier()))
}

pub fn degraded_models() -> Arc<ModelBundle> {
    Arc::new(ModelBundle::load(&missing_model_config()))
}

pub fn sample_request() -> Value {
    json!({
        "N": 90,
        "P": 42,
        "K": 43,
        "temperature": 20.8,
        "humidity": 82.0,
        "ph": 6.5,
        "rainfall": 202.9
    })
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        },
        models: demo_model_config(),
        cors: CorsConfig::default(),
    }
}

pub fn app_state(db: SqlitePool, models: Arc<ModelBundle>) -> AppState {
    AppState {
        db,
        models,
        config: Arc::new(test_config()),
    }
}
