//! Error types returned by this crate.
use std::io;
use polars::prelude::PolarsError;
use thiserror::Error;

/// The error type of this crate.
///
/// Early stops of the boosting loop (perfect fit, degenerate weights,
/// a late worse-than-random learner) are not errors.
/// They are recorded in [`Halt`](crate::Halt) instead.
#[derive(Error, Debug)]
pub enum BoostError {
    /// A parameter is out of its domain.
    /// Detected before any boosting round runs.
    #[error("invalid parameter `{name}`: {reason}")]
    Parameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The first learner of a discrete (SAMME) run
    /// was no better than random guessing,
    /// so there is no ensemble to fall back on.
    #[error(
        "base classifier is worse than random guessing \
        (weighted error {error:.6} >= {threshold:.6}), \
        ensemble cannot be fit"
    )]
    WorseThanRandom {
        /// The weighted training error of the rejected learner.
        error: f64,
        /// The chance level `1 - 1/K`.
        threshold: f64,
    },

    /// The training sample is malformed.
    #[error("invalid sample: {0}")]
    Sample(String),

    /// Reading a data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Converting a `polars::DataFrame` failed.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// (De)serializing a model failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoostError {
    pub(crate) fn parameter<S: Into<String>>(name: &'static str, reason: S)
        -> Self
    {
        Self::Parameter { name, reason: reason.into() }
    }

    pub(crate) fn sample<S: Into<String>>(reason: S) -> Self {
        Self::Sample(reason.into())
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, BoostError>;
