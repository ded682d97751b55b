//! Validation of raw prediction requests
//!
//! Turns an untyped JSON object into a [`FeatureVector`]. Nothing past this
//! boundary sees the raw payload.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Rejections produced while decoding a request
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeatureError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Field '{field}' must be a number")]
    NotNumeric { field: String },

    #[error("Field '{field}' must be a finite number")]
    NotFinite { field: String },
}

impl FeatureError {
    /// Name of the offending field, when the error concerns a single one
    pub fn field(&self) -> Option<&str> {
        match self {
            FeatureError::NotNumeric { field } | FeatureError::NotFinite { field } => {
                Some(field.as_str())
            }
            FeatureError::MissingFields(fields) if fields.len() == 1 => Some(fields[0].as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode an arbitrary JSON value. Anything other than an object is rejected.
pub fn decode_value(raw: &Value) -> Result<FeatureVector, FeatureError> {
    match raw {
        Value::Object(map) => decode_features(map),
        _ => Err(FeatureError::NotAnObject),
    }
}

/// Decode the seven required measurements from a JSON object.
///
/// Extra keys are ignored. All missing keys are reported together, in
/// canonical order, before any value is inspected.
pub fn decode_features(raw: &Map<String, Value>) -> Result<FeatureVector, FeatureError> {
    let missing: Vec<String> = FEATURE_NAMES
        .iter()
        .filter(|name| !raw.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(FeatureError::MissingFields(missing));
    }

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        *slot = coerce_number(name, &raw[name])?;
    }

    Ok(FeatureVector::from_array(values))
}

/// Coerce a JSON value to f64. Numbers pass through and numeric strings are
/// parsed; booleans, null, arrays and objects are rejected.
fn coerce_number(field: &str, value: &Value) -> Result<f64, FeatureError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FeatureError::NotNumeric {
        field: field.to_string(),
    })?;

    if !number.is_finite() {
        return Err(FeatureError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(number)
}
