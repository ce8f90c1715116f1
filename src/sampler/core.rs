//! Provides `Sampler` trait.
use serde::{Serialize, Deserialize};

use crate::{
    Result,
    Sample,
};


/// The output of [`Sampler::resample`].
#[derive(Debug, Clone)]
pub struct Resampled {
    /// The selected rows.
    pub sample: Sample,
    /// `indices[i]` is the row of the input that became row `i`.
    pub indices: Vec<usize>,
}


impl Resampled {
    /// Forgets the rows and keeps what reproduces them.
    pub fn into_record(self, seed: u64) -> SamplerRecord {
        SamplerRecord { seed, sample_indices: self.indices }
    }
}


/// What a boosting round remembers about its sampler:
/// the seed it ran with and the rows it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerRecord {
    /// The seed passed to [`Sampler::resample`].
    pub seed: u64,
    /// The rows of the training sample the round was fit on.
    pub sample_indices: Vec<usize>,
}


/// An interface for samplers.
/// A sampler only sees features and labels, never the sample weights.
pub trait Sampler {
    /// Returns the name of the sampler.
    fn name(&self) -> &str;


    /// Returns the information of the sampler as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// Checks whether the sampler can run on `sample`.
    /// Boosting calls this before the first round.
    fn check(&self, _sample: &Sample) -> Result<()> {
        Ok(())
    }


    /// Selects rows of `sample`.
    /// The same `seed` must select the same rows.
    fn resample(&self, sample: &Sample, seed: u64) -> Result<Resampled>;
}
