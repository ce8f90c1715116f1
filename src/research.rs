//! This directory provides some features for research
//! Measure the followings of boosting algorithm per iteration
//! - Running time
//! - Weight and error of the new hypothesis
//! - Training loss
//! - Test loss

/// Provides `Logger`, which runs a boosting algorithm with logging.
pub mod logger;

/// Provides the builder of `Logger`.
pub mod logger_builder;

/// Defines loss functions (e.g., zero-one loss, balanced error).
pub mod loss_functions;

pub use logger::Logger;
pub use logger_builder::LoggerBuilder;

pub use loss_functions::{
    zero_one_loss,
    balanced_error,
};


/// A boosting algorithm whose progress can be observed between rounds.
pub trait Research {
    /// The combined hypothesis built so far.
    type Output;


    /// Returns the combined hypothesis of the rounds run so far.
    fn current_hypothesis(&self) -> Self::Output;


    /// Returns the weight and the error of the last kept hypothesis.
    fn last_round(&self) -> Option<(f64, f64)> {
        None
    }
}
