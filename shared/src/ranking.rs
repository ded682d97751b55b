//! Top-K ranking of class probabilities

use std::cmp::Ordering;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("k must be greater than zero")]
    InvalidK,

    #[error("ranked crop list is empty")]
    EmptyRanking,
}

/// Probability assigned to one crop label
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub label: String,
    pub probability: f64,
}

impl ClassScore {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Ranking order: probability descending, then label ascending.
fn rank_order(a: &ClassScore, b: &ClassScore) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.label.cmp(&b.label))
}

/// Return the `k` highest-probability labels.
///
/// The result has length `min(k, scores.len())`. Exact ties are broken by
/// ascending label so the output does not depend on input order.
pub fn top_k(scores: &[ClassScore], k: usize) -> Result<Vec<String>, RankingError> {
    if k == 0 {
        return Err(RankingError::InvalidK);
    }

    let mut ranked: Vec<&ClassScore> = scores.iter().collect();
    ranked.sort_by(|a, b| rank_order(a, b));

    Ok(ranked
        .into_iter()
        .take(k)
        .map(|score| score.label.clone())
        .collect())
}
