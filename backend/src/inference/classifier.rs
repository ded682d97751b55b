//! Trained crop classifier
//!
//! Two model families are supported, both exported from the offline training
//! job as JSON: multinomial logistic regression and Gaussian naive Bayes.
//! Either one scores a normalized vector against its full, fixed label set.
//!
//! For Gaussian naive Bayes, `variances` are used as exported. scikit-learn's
//! `var_` already includes its fitted epsilon (`var_smoothing * max(var(X))`),
//! so the artifact's own `var_smoothing` is an extra absolute term added to
//! every variance and defaults to zero.

use std::collections::HashSet;

use serde::Deserialize;
use shared::{ClassScore, NormalizedVector, CROP_LIST_DELIMITER, FEATURE_COUNT};

use super::{check_finite, ModelLoadError, ScoringError};

const DEFAULT_VAR_SMOOTHING: f64 = 0.0;

/// Immutable trained model state
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedClassifier {
    LogisticRegression {
        classes: Vec<String>,
        /// One row of feature weights per class
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    GaussianNb {
        classes: Vec<String>,
        class_priors: Vec<f64>,
        /// One row of per-feature means per class
        means: Vec<Vec<f64>>,
        variances: Vec<Vec<f64>>,
        /// Absolute term added to every variance at scoring time
        #[serde(default = "default_var_smoothing")]
        var_smoothing: f64,
    },
}

fn default_var_smoothing() -> f64 {
    DEFAULT_VAR_SMOOTHING
}

impl FittedClassifier {
    /// Parse and structurally check a classifier artifact
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let classifier: FittedClassifier = serde_json::from_str(json)?;
        classifier.validate()?;
        Ok(classifier)
    }

    /// Fixed, ordered label set
    pub fn classes(&self) -> &[String] {
        match self {
            FittedClassifier::LogisticRegression { classes, .. }
            | FittedClassifier::GaussianNb { classes, .. } => classes,
        }
    }

    /// Check every parameter block matches the label set and feature width
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        validate_classes(self.classes())?;
        let n_classes = self.classes().len();

        match self {
            FittedClassifier::LogisticRegression {
                coefficients,
                intercepts,
                ..
            } => {
                check_matrix("coefficients", coefficients, n_classes)?;
                check_rows("intercepts", intercepts.len(), n_classes)?;
                check_finite("intercepts", intercepts)?;
            }
            FittedClassifier::GaussianNb {
                class_priors,
                means,
                variances,
                var_smoothing,
                ..
            } => {
                check_rows("class_priors", class_priors.len(), n_classes)?;
                check_finite("class_priors", class_priors)?;
                if class_priors.iter().any(|p| *p <= 0.0) {
                    return Err(ModelLoadError::Incompatible(
                        "class_priors must be positive".to_string(),
                    ));
                }
                check_matrix("means", means, n_classes)?;
                check_matrix("variances", variances, n_classes)?;
                check_finite("var_smoothing", &[*var_smoothing])?;
                if variances.iter().flatten().any(|v| v + var_smoothing <= 0.0) {
                    return Err(ModelLoadError::Incompatible(
                        "variances must be positive".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Probability for every class, in label-set order. Values are
    /// non-negative and sum to one.
    ///
    /// Inputs far outside the training range can overflow a logit; those are
    /// rejected rather than ranked.
    pub fn score_all(&self, nv: &NormalizedVector) -> Result<Vec<ClassScore>, ScoringError> {
        let x = nv.values();

        let logits: Vec<f64> = match self {
            FittedClassifier::LogisticRegression {
                coefficients,
                intercepts,
                ..
            } => coefficients
                .iter()
                .zip(intercepts)
                .map(|(weights, bias)| dot(weights, x) + bias)
                .collect(),
            FittedClassifier::GaussianNb {
                class_priors,
                means,
                variances,
                var_smoothing,
                ..
            } => class_priors
                .iter()
                .zip(means.iter().zip(variances))
                .map(|(prior, (mean, var))| {
                    prior.ln() + gaussian_log_likelihood(x, mean, var, *var_smoothing)
                })
                .collect(),
        };

        if logits.iter().any(|l| !l.is_finite()) {
            return Err(ScoringError::NonFiniteScore);
        }

        Ok(self
            .classes()
            .iter()
            .zip(softmax(&logits))
            .map(|(label, p)| ClassScore::new(label.clone(), p))
            .collect())
    }
}

fn dot(weights: &[f64], x: &[f64; FEATURE_COUNT]) -> f64 {
    weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum()
}

fn gaussian_log_likelihood(
    x: &[f64; FEATURE_COUNT],
    mean: &[f64],
    var: &[f64],
    var_smoothing: f64,
) -> f64 {
    x.iter()
        .zip(mean.iter().zip(var))
        .map(|(xi, (mu, v))| {
            let v = v + var_smoothing;
            let diff = xi - mu;
            -0.5 * ((2.0 * std::f64::consts::PI * v).ln() + diff * diff / v)
        })
        .sum()
}

/// Numerically stable softmax. Logits must be finite.
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.iter().map(|&x| x / sum).collect()
}

fn validate_classes(classes: &[String]) -> Result<(), ModelLoadError> {
    if classes.is_empty() {
        return Err(ModelLoadError::Incompatible(
            "classifier has no classes".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for label in classes {
        if label.trim().is_empty() || label.contains(CROP_LIST_DELIMITER) {
            return Err(ModelLoadError::Incompatible(format!(
                "invalid class label '{}'",
                label
            )));
        }
        if !seen.insert(label.as_str()) {
            return Err(ModelLoadError::Incompatible(format!(
                "duplicate class label '{}'",
                label
            )));
        }
    }
    Ok(())
}

fn check_rows(name: &str, rows: usize, n_classes: usize) -> Result<(), ModelLoadError> {
    if rows != n_classes {
        return Err(ModelLoadError::Incompatible(format!(
            "{} has {} rows, expected {}",
            name, rows, n_classes
        )));
    }
    Ok(())
}

fn check_matrix(name: &str, matrix: &[Vec<f64>], n_classes: usize) -> Result<(), ModelLoadError> {
    check_rows(name, matrix.len(), n_classes)?;
    for row in matrix {
        if row.len() != FEATURE_COUNT {
            return Err(ModelLoadError::Incompatible(format!(
                "{} row has {} features, expected {}",
                name,
                row.len(),
                FEATURE_COUNT
            )));
        }
        check_finite(name, row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic() -> FittedClassifier {
        FittedClassifier::LogisticRegression {
            classes: vec!["maize".into(), "rice".into(), "coffee".into()],
            coefficients: vec![
                vec![1.0, 0.0, 0.0, 0.5, -0.5, 0.0, -1.0],
                vec![0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0],
                vec![-1.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0],
            ],
            intercepts: vec![0.0, 0.1, -0.1],
        }
    }

    fn naive_bayes() -> FittedClassifier {
        FittedClassifier::GaussianNb {
            classes: vec!["apple".into(), "banana".into()],
            class_priors: vec![0.5, 0.5],
            means: vec![vec![0.0; 7], vec![1.0; 7]],
            variances: vec![vec![1.0; 7], vec![1.0; 7]],
            var_smoothing: 1e-9,
        }
    }

    fn assert_distribution(scores: &[ClassScore]) {
        let total: f64 = scores.iter().map(|s| s.probability).sum();
        assert!((total - 1.0).abs() < 1e-9, "sum was {}", total);
        assert!(scores.iter().all(|s| s.probability >= 0.0));
    }

    #[test]
    fn test_logistic_scores_every_class_in_order() {
        let model = logistic();
        model.validate().unwrap();
        let scores = model.score_all(&NormalizedVector([0.5; 7])).unwrap();
        let labels: Vec<&str> = scores.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["maize", "rice", "coffee"]);
        assert_distribution(&scores);
        // rice has the largest logit for this input
        let best = scores
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
            .unwrap();
        assert_eq!(best.label, "rice");
    }

    #[test]
    fn test_naive_bayes_prefers_closer_mean() {
        let model = naive_bayes();
        model.validate().unwrap();

        let near_zero = model.score_all(&NormalizedVector([0.1; 7])).unwrap();
        assert_distribution(&near_zero);
        assert!(near_zero[0].probability > near_zero[1].probability);

        let near_one = model.score_all(&NormalizedVector([0.9; 7])).unwrap();
        assert!(near_one[1].probability > near_one[0].probability);

        // equidistant input gives an exact tie
        let midpoint = model.score_all(&NormalizedVector([0.5; 7])).unwrap();
        assert_eq!(midpoint[0].probability, midpoint[1].probability);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let p = softmax(&[1000.0, 1000.0, -1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!(p[2] >= 0.0 && p[2] < 1e-12);
    }

    #[test]
    fn test_from_json_logistic() {
        let json = r#"{
            "kind": "logistic_regression",
            "classes": ["rice", "maize"],
            "coefficients": [[1,0,0,0,0,0,0],[0,1,0,0,0,0,0]],
            "intercepts": [0, 0]
        }"#;
        let model = FittedClassifier::from_json(json).unwrap();
        assert_eq!(model.classes(), &["rice".to_string(), "maize".to_string()]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let json = r#"{
            "kind": "logistic_regression",
            "classes": ["rice", "maize"],
            "coefficients": [[1,0,0,0,0,0,0]],
            "intercepts": [0, 0]
        }"#;
        assert!(matches!(
            FittedClassifier::from_json(json),
            Err(ModelLoadError::Incompatible(_))
        ));
    }

    #[test]
    fn test_bad_labels_rejected() {
        let mut model = logistic();
        if let FittedClassifier::LogisticRegression { classes, .. } = &mut model {
            classes[2] = "maize".into();
        }
        assert!(model.validate().is_err());

        let mut model = logistic();
        if let FittedClassifier::LogisticRegression { classes, .. } = &mut model {
            classes[0] = "kidney,beans".into();
        }
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_non_positive_variance_rejected() {
        let mut model = naive_bayes();
        if let FittedClassifier::GaussianNb { variances, var_smoothing, .. } = &mut model {
            variances[1][3] = 0.0;
            *var_smoothing = 0.0;
        }
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_var_smoothing_defaults_to_exported_variances() {
        let json = r#"{
            "kind": "gaussian_nb",
            "classes": ["apple", "banana"],
            "class_priors": [0.5, 0.5],
            "means": [[0,0,0,0,0,0,0],[1,1,1,1,1,1,1]],
            "variances": [[1,1,1,1,1,1,1],[1,1,1,1,1,1,1]]
        }"#;
        let model = FittedClassifier::from_json(json).unwrap();
        let FittedClassifier::GaussianNb { var_smoothing, .. } = &model else {
            panic!("expected gaussian_nb");
        };
        assert_eq!(*var_smoothing, 0.0);

        let mut explicit = naive_bayes();
        if let FittedClassifier::GaussianNb { var_smoothing, .. } = &mut explicit {
            *var_smoothing = 0.0;
        }
        let nv = NormalizedVector([0.3; 7]);
        assert_eq!(model.score_all(&nv).unwrap(), explicit.score_all(&nv).unwrap());
    }

    #[test]
    fn test_overflowing_likelihood_rejected() {
        // (x - mean)^2 overflows to infinity for every class
        let model = naive_bayes();
        let nv = NormalizedVector([1e200, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(model.score_all(&nv), Err(ScoringError::NonFiniteScore));
    }

    #[test]
    fn test_overflowing_logit_rejected() {
        let model = FittedClassifier::LogisticRegression {
            classes: vec!["rice".into(), "maize".into()],
            coefficients: vec![vec![1e300; 7], vec![-1e300; 7]],
            intercepts: vec![0.0, 0.0],
        };
        model.validate().unwrap();
        let nv = NormalizedVector([1e10; 7]);
        assert_eq!(model.score_all(&nv), Err(ScoringError::NonFiniteScore));

        // in-range input still scores normally
        assert_distribution(&model.score_all(&NormalizedVector([0.0; 7])).unwrap());
    }
}
