//! A fitted round seen as "sampler, then hypothesis".
use crate::{
    Classifier,
    ProbabilisticClassifier,
    Sample,
};

use super::core::SamplerRecord;


/// A view of one boosting round:
/// the sampler record of the round and the hypothesis fit after it.
/// The sampler only acts at training time,
/// so predictions go straight to the hypothesis.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a, H> {
    sampler:    &'a SamplerRecord,
    hypothesis: &'a H,
}


impl<'a, H> Pipeline<'a, H> {
    /// Pairs a sampler record with the hypothesis fit after it.
    pub fn new(sampler: &'a SamplerRecord, hypothesis: &'a H) -> Self {
        Self { sampler, hypothesis }
    }


    /// Returns the sampler record.
    pub fn sampler(&self) -> &'a SamplerRecord {
        self.sampler
    }


    /// Returns the hypothesis.
    pub fn hypothesis(&self) -> &'a H {
        self.hypothesis
    }
}


impl<H> Classifier for Pipeline<'_, H>
    where H: Classifier,
{
    fn classes(&self) -> &[i64] {
        self.hypothesis.classes()
    }


    fn predict(&self, sample: &Sample, row: usize) -> i64 {
        self.hypothesis.predict(sample, row)
    }
}


impl<H> ProbabilisticClassifier for Pipeline<'_, H>
    where H: ProbabilisticClassifier,
{
    fn predict_proba(&self, sample: &Sample, row: usize) -> Vec<f64> {
        self.hypothesis.predict_proba(sample, row)
    }
}
