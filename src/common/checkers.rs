//! This file defines some functions that checks some pre-conditions
//! E.g., Shape of data, domain of the hyperparameters.
//!
//! Checks on user input return `Err`,
//! checks on internal invariants panic.

use crate::Sample;
use crate::constants::SIMPLEX_TOLERANCE;
use crate::error::{BoostError, Result};

/// Check whether the training sample is valid or not.
#[inline(always)]
pub fn sample(sample: &Sample) -> Result<()> {
    sample.is_valid_classification_instance()
}

/// Check the learning rate (shrinkage).
#[inline(always)]
pub fn learning_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0f64 {
        return Ok(());
    }
    Err(BoostError::parameter(
        "learning_rate",
        format!("must be a positive real number. got {rate}"),
    ))
}

/// Check the maximal number of boosting rounds.
#[inline(always)]
pub fn n_estimators(n: usize) -> Result<()> {
    if n > 0 { return Ok(()); }
    Err(BoostError::parameter(
        "n_estimators",
        "must be a positive integer. got 0",
    ))
}

/// Check the user-given sample weights.
/// Every entry must be finite and non-negative,
/// and the sum must be positive.
#[inline(always)]
pub fn sample_weight(weights: &[f64], n_sample: usize) -> Result<()> {
    if weights.len() != n_sample {
        return Err(BoostError::parameter(
            "sample_weight",
            format!(
                "expected {n_sample} weights, got {}",
                weights.len()
            ),
        ));
    }

    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0f64) {
        return Err(BoostError::parameter(
            "sample_weight",
            format!("weights must be finite and non-negative. got {w}"),
        ));
    }

    let sum = weights.iter().sum::<f64>();
    if sum <= 0f64 {
        return Err(BoostError::parameter(
            "sample_weight",
            format!("the sum of weights must be positive. got {sum}"),
        ));
    }
    Ok(())
}

/// Check whether the given slice is a probability vector.
#[inline(always)]
pub fn distribution(dist: &[f64]) {
    let sum = dist.iter().sum::<f64>();
    assert!(
        (sum - 1f64).abs() < SIMPLEX_TOLERANCE,
        "sum(dist[..]) = {sum}"
    );
    assert!(
        dist.iter().all(|d| *d >= 0f64),
        "a distribution has a negative entry. dist = {dist:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learning_rate_success_01() {
        assert!(learning_rate(0.5).is_ok());
        assert!(learning_rate(3.0).is_ok());
    }

    #[test]
    fn test_learning_rate_failure_01() {
        for rate in [0f64, -0.1, f64::NAN, f64::INFINITY] {
            let result = learning_rate(rate);
            assert!(
                matches!(result, Err(BoostError::Parameter { name: "learning_rate", .. })),
                "rate {rate} must be rejected"
            );
        }
    }

    #[test]
    fn test_n_estimators() {
        assert!(n_estimators(1).is_ok());
        assert!(n_estimators(0).is_err());
    }

    #[test]
    fn test_sample_weight_success_01() {
        assert!(sample_weight(&[0.0, 2.0, 1.0], 3).is_ok());
    }

    #[test]
    fn test_sample_weight_failure_01() {
        assert!(sample_weight(&[1.0, 1.0], 3).is_err());
        assert!(sample_weight(&[1.0, -1.0, 1.0], 3).is_err());
        assert!(sample_weight(&[0.0, 0.0, 0.0], 3).is_err());
        assert!(sample_weight(&[1.0, f64::NAN, 0.0], 3).is_err());
    }

    #[test]
    fn test_distribution_success_01() {
        distribution(&[0.25, 0.25, 0.5]);
    }

    #[test]
    #[should_panic]
    fn test_distribution_failure_01() {
        distribution(&[0.25, 0.25, 0.25]);
    }
}
