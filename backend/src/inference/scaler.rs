//! Fitted feature scaler
//!
//! Parameters are produced offline when the classifier is trained and loaded
//! once at startup. The transform here must agree with the training-time one
//! feature by feature.

use serde::Deserialize;
use shared::{FeatureVector, NormalizedVector, FEATURE_COUNT};

use super::{check_finite, ModelLoadError};

/// Ranges narrower than this are treated as constant features
const MIN_RANGE: f64 = 1e-12;

/// Immutable per-feature normalization parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// Rescale each feature from `[data_min, data_max]` to `feature_range`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    /// Subtract the mean and divide by the standard deviation
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl FittedScaler {
    /// Parse and structurally check a scaler artifact
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let scaler: FittedScaler = serde_json::from_str(json)?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check the parameters fit the seven-feature layout
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        match self {
            FittedScaler::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                check_width("data_min", data_min.len())?;
                check_width("data_max", data_max.len())?;
                check_finite("data_min", data_min)?;
                check_finite("data_max", data_max)?;
                check_finite("feature_range", &[feature_range.0, feature_range.1])?;
                if data_min.iter().zip(data_max).any(|(lo, hi)| lo > hi) {
                    return Err(ModelLoadError::Incompatible(
                        "data_min exceeds data_max".to_string(),
                    ));
                }
                if feature_range.0 >= feature_range.1 {
                    return Err(ModelLoadError::Incompatible(
                        "feature_range must be increasing".to_string(),
                    ));
                }
            }
            FittedScaler::Standard { mean, scale } => {
                check_width("mean", mean.len())?;
                check_width("scale", scale.len())?;
                check_finite("mean", mean)?;
                check_finite("scale", scale)?;
                if scale.iter().any(|s| *s < 0.0) {
                    return Err(ModelLoadError::Incompatible(
                        "scale must be non-negative".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Apply the fitted transform. Pure; identical input gives identical output.
    pub fn normalize(&self, v: &FeatureVector) -> NormalizedVector {
        let raw = v.to_array();
        let mut out = [0.0; FEATURE_COUNT];

        match self {
            FittedScaler::MinMax {
                data_min,
                data_max,
                feature_range: (lo, hi),
            } => {
                for j in 0..FEATURE_COUNT {
                    let data_range = data_max[j] - data_min[j];
                    out[j] = if data_range.abs() > MIN_RANGE {
                        (raw[j] - data_min[j]) / data_range * (hi - lo) + lo
                    } else {
                        *lo
                    };
                }
            }
            FittedScaler::Standard { mean, scale } => {
                for j in 0..FEATURE_COUNT {
                    let centered = raw[j] - mean[j];
                    // Constant features are left unscaled
                    out[j] = if scale[j] > MIN_RANGE {
                        centered / scale[j]
                    } else {
                        centered
                    };
                }
            }
        }

        NormalizedVector(out)
    }
}

fn check_width(name: &str, len: usize) -> Result<(), ModelLoadError> {
    if len != FEATURE_COUNT {
        return Err(ModelLoadError::Incompatible(format!(
            "{} has {} features, expected {}",
            name, len, FEATURE_COUNT
        )));
    }
    Ok(())
}
