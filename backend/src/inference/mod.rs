//! Fitted model adapters
//!
//! The scaler and classifier are loaded once at startup and shared read-only
//! across requests. A model that fails to load does not stop the process: its
//! slot is marked unavailable and prediction requests fail with
//! [`AppError::ModelUnavailable`] while history endpoints keep working.

pub mod classifier;
pub mod scaler;

use std::{path::Path, sync::Arc};

use shared::{ClassScore, FeatureVector, NormalizedVector, FEATURE_NAMES};
use thiserror::Error;

use crate::config::ModelConfig;
use crate::error::{AppError, AppResult};

pub use classifier::FittedClassifier;
pub use scaler::FittedScaler;

/// Reasons a model artifact cannot be used
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("cannot read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("incompatible artifact: {0}")]
    Incompatible(String),
}

/// Finite input the fitted models cannot turn into a probability distribution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("Field '{field}' is outside the range the scaler can normalize")]
    OutOfRange { field: String },

    #[error("Measurements are outside the range the classifier can score")]
    NonFiniteScore,
}

impl ScoringError {
    pub fn field(&self) -> Option<&str> {
        match self {
            ScoringError::OutOfRange { field } => Some(field.as_str()),
            ScoringError::NonFiniteScore => None,
        }
    }
}

pub(crate) fn check_finite(name: &str, values: &[f64]) -> Result<(), ModelLoadError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ModelLoadError::Incompatible(format!(
            "{} contains non-finite values",
            name
        )));
    }
    Ok(())
}

/// A loaded model, or the reason it could not be loaded
#[derive(Debug, Clone)]
pub enum ModelSlot<T> {
    Ready(Arc<T>),
    Unavailable(String),
}

impl<T> ModelSlot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelSlot::Ready(_))
    }

    fn get(&self, what: &str) -> AppResult<&T> {
        match self {
            ModelSlot::Ready(model) => Ok(model.as_ref()),
            ModelSlot::Unavailable(reason) => {
                Err(AppError::ModelUnavailable(format!("{}: {}", what, reason)))
            }
        }
    }
}

impl<T> From<Result<T, ModelLoadError>> for ModelSlot<T> {
    fn from(result: Result<T, ModelLoadError>) -> Self {
        match result {
            Ok(model) => ModelSlot::Ready(Arc::new(model)),
            Err(e) => ModelSlot::Unavailable(e.to_string()),
        }
    }
}

/// The fitted scaler and classifier, injected into the prediction service
#[derive(Debug, Clone)]
pub struct ModelBundle {
    scaler: ModelSlot<FittedScaler>,
    classifier: ModelSlot<FittedClassifier>,
}

impl ModelBundle {
    /// Bundle two already-loaded models
    pub fn new(scaler: FittedScaler, classifier: FittedClassifier) -> Self {
        Self {
            scaler: ModelSlot::Ready(Arc::new(scaler)),
            classifier: ModelSlot::Ready(Arc::new(classifier)),
        }
    }

    pub fn from_slots(
        scaler: ModelSlot<FittedScaler>,
        classifier: ModelSlot<FittedClassifier>,
    ) -> Self {
        Self { scaler, classifier }
    }

    /// Load both artifacts. Never fails; problems are logged and the affected
    /// slot is left unavailable.
    pub fn load(config: &ModelConfig) -> Self {
        let scaler: ModelSlot<FittedScaler> = read_artifact(&config.scaler_path)
            .and_then(|s| FittedScaler::from_json(&s))
            .into();
        let classifier: ModelSlot<FittedClassifier> = read_artifact(&config.classifier_path)
            .and_then(|s| FittedClassifier::from_json(&s))
            .into();

        match &scaler {
            ModelSlot::Ready(_) => tracing::info!("Loaded scaler from {}", config.scaler_path),
            ModelSlot::Unavailable(reason) => tracing::warn!(
                "Scaler unavailable ({}): {}; predictions disabled",
                config.scaler_path,
                reason
            ),
        }
        match &classifier {
            ModelSlot::Ready(model) => tracing::info!(
                "Loaded classifier from {} ({} classes)",
                config.classifier_path,
                model.classes().len()
            ),
            ModelSlot::Unavailable(reason) => tracing::warn!(
                "Classifier unavailable ({}): {}; predictions disabled",
                config.classifier_path,
                reason
            ),
        }

        Self { scaler, classifier }
    }

    /// True when both models are loaded
    pub fn is_ready(&self) -> bool {
        self.scaler.is_ready() && self.classifier.is_ready()
    }

    pub fn scaler_ready(&self) -> bool {
        self.scaler.is_ready()
    }

    pub fn classifier_ready(&self) -> bool {
        self.classifier.is_ready()
    }

    /// Apply the fitted scaler. Rejects values that overflow once scaled.
    pub fn normalize(&self, v: &FeatureVector) -> AppResult<NormalizedVector> {
        let nv = self.scaler.get("scaler")?.normalize(v);
        if let Some(j) = nv.values().iter().position(|x| !x.is_finite()) {
            return Err(ScoringError::OutOfRange {
                field: FEATURE_NAMES[j].to_string(),
            }
            .into());
        }
        Ok(nv)
    }

    /// Score a normalized vector against every known class
    pub fn score_all(&self, nv: &NormalizedVector) -> AppResult<Vec<ClassScore>> {
        Ok(self.classifier.get("classifier")?.score_all(nv)?)
    }
}

fn read_artifact(path: impl AsRef<Path>) -> Result<String, ModelLoadError> {
    Ok(std::fs::read_to_string(path)?)
}
