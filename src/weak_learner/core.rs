//! Provides `WeakLearner` trait.
use crate::Sample;


/// An interface for weak learners.
/// A boosting algorithm calls [`WeakLearner::produce`] once per round
/// with the (balanced) training sample of that round,
/// the weights on it, and a fresh seed.
pub trait WeakLearner {
    /// The hypothesis type this weak learner produces.
    type Hypothesis;


    /// Returns the name of the weak learner.
    fn name(&self) -> &str;


    /// Returns the information of the weak learner as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// Fits a new hypothesis on `sample` weighted by `dist`.
    /// `dist` has one non-negative entry per row of `sample`
    /// and need not sum to `1`.
    /// The same `seed` must yield the same hypothesis.
    fn produce(&self, sample: &Sample, dist: &[f64], seed: u64)
        -> Self::Hypothesis;
}
