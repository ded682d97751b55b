//! Error handling for the crop advisor
//!
//! Every failure becomes a structured JSON body. Internal details (SQL, file
//! paths, model parse errors) are logged and never returned to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{FeatureError, RankingError};
use thiserror::Error;

use crate::inference::ScoringError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Validation error: {0}")]
    Validation(#[from] FeatureError),

    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("Out of range: {0}")]
    OutOfDomain(#[from] ScoringError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] RankingError),

    #[error("Prediction not found: {0}")]
    NotFound(i64),

    // Model errors
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    // Storage errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// HTTP status and public description for this error
    fn detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: err.to_string(),
                    field: err.field().map(str::to_string),
                },
            ),
            AppError::MalformedBody(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::OutOfDomain(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: err.to_string(),
                    field: err.field().map(str::to_string),
                },
            ),
            AppError::InvalidArgument(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_ARGUMENT".to_string(),
                    message: err.to_string(),
                    field: None,
                },
            ),
            AppError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("Prediction {} not found", id),
                    field: None,
                },
            ),
            AppError::ModelUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "MODEL_UNAVAILABLE".to_string(),
                    message: "The prediction model is not available".to_string(),
                    field: None,
                },
            ),
            AppError::Persistence(_) | AppError::Migration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "PERSISTENCE_ERROR".to_string(),
                    message: "The prediction history could not be updated".to_string(),
                    field: None,
                },
            ),
            AppError::Configuration(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.detail().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
