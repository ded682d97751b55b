//! Soil and climate measurement models

use serde::{Deserialize, Serialize};

/// Number of measurements the models were fitted on
pub const FEATURE_COUNT: usize = 7;

/// Canonical feature order. Must match the column order used when the
/// scaler and classifier were fitted.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// One prediction request's measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    /// Nitrogen content of the soil
    #[serde(rename = "N")]
    pub nitrogen: f64,
    /// Phosphorus content of the soil
    #[serde(rename = "P")]
    pub phosphorus: f64,
    /// Potassium content of the soil
    #[serde(rename = "K")]
    pub potassium: f64,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    pub ph: f64,
    /// Millimetres
    pub rainfall: f64,
}

impl FeatureVector {
    /// Build from values already in canonical order
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Values in canonical order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

/// Feature vector after the fitted scaler has been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedVector(pub [f64; FEATURE_COUNT]);

impl NormalizedVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_order_matches_feature_names() {
        let v = FeatureVector::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(v.nitrogen, 1.0);
        assert_eq!(v.ph, 6.0);
        assert_eq!(v.rainfall, 7.0);
        assert_eq!(v.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_serializes_with_measurement_keys() {
        let v = FeatureVector::from_array([90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]);
        let json = serde_json::to_value(v).unwrap();
        for name in FEATURE_NAMES {
            assert!(json.get(name).is_some(), "missing key {}", name);
        }
        assert_eq!(json["N"], 90.0);
    }
}
