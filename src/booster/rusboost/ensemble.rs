//! The classifier output by `RusBoost`.
use serde::{Serialize, Deserialize, Deserializer};
use serde::de::{self, DeserializeOwned};

use std::fmt;
use std::collections::BTreeMap;

use crate::{
    common::helpers,
    sampler::{Pipeline, SamplerRecord},
    Classifier,
    ProbabilisticClassifier,
    FeatureImportance,
    Result,
    Sample,
};

use super::update_rule::{Algorithm, aligned_proba};


/// Why the boosting loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Halt {
    /// Every permitted round ran.
    #[default]
    Completed,
    /// A hypothesis made no training mistake.
    Perfect,
    /// The sample weights summed to a non-positive or non-finite value.
    Degenerate,
    /// A hypothesis after the first was no better than chance.
    /// It is not part of the ensemble.
    WorseThanRandom,
}


impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Completed => "completed",
            Self::Perfect => "perfect fit",
            Self::Degenerate => "degenerate weights",
            Self::WorseThanRandom => "worse than random",
        };
        write!(f, "{reason}")
    }
}


/// A weighted ensemble of hypotheses, each fit on an under-sampled
/// copy of the training sample.
///
/// The weight and error arrays are allocated for every permitted round.
/// The accessors truncate them to the number of hypotheses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RusBoostClassifier<H> {
    classes:           Vec<i64>,
    algorithm:         Algorithm,
    hypotheses:        Vec<H>,
    samplers:          Vec<SamplerRecord>,
    estimator_weights: Vec<f64>,
    estimator_errors:  Vec<f64>,
    halt:              Halt,
}


/// The serialized form, checked before it becomes a classifier.
#[derive(Deserialize)]
struct RawRusBoostClassifier<H> {
    classes:           Vec<i64>,
    algorithm:         Algorithm,
    hypotheses:        Vec<H>,
    samplers:          Vec<SamplerRecord>,
    estimator_weights: Vec<f64>,
    estimator_errors:  Vec<f64>,
    halt:              Halt,
}


impl<'de, H> Deserialize<'de> for RusBoostClassifier<H>
    where H: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where D: Deserializer<'de>,
    {
        let raw = RawRusBoostClassifier::<H>::deserialize(deserializer)?;
        check_lengths(
            raw.hypotheses.len(),
            raw.samplers.len(),
            raw.estimator_weights.len(),
            raw.estimator_errors.len(),
        ).map_err(de::Error::custom)?;
        check_classes(&raw.classes, raw.hypotheses.len())
            .map_err(de::Error::custom)?;

        Ok(Self {
            classes:           raw.classes,
            algorithm:         raw.algorithm,
            hypotheses:        raw.hypotheses,
            samplers:          raw.samplers,
            estimator_weights: raw.estimator_weights,
            estimator_errors:  raw.estimator_errors,
            halt:              raw.halt,
        })
    }
}


/// Every hypothesis needs a sampler record and a weight/error slot.
fn check_lengths(
    n_hypotheses: usize,
    n_samplers:   usize,
    n_weights:    usize,
    n_errors:     usize,
) -> std::result::Result<(), String>
{
    if n_hypotheses != n_samplers {
        return Err(format!(
            "{n_hypotheses} hypotheses but {n_samplers} sampler records"
        ));
    }
    if n_weights < n_hypotheses {
        return Err(format!(
            "{n_hypotheses} hypotheses but {n_weights} estimator weights"
        ));
    }
    if n_weights != n_errors {
        return Err(format!(
            "{n_weights} estimator weights but {n_errors} estimator errors"
        ));
    }
    Ok(())
}


/// Class labels are looked up by binary search.
fn check_classes(classes: &[i64], n_hypotheses: usize)
    -> std::result::Result<(), String>
{
    if n_hypotheses > 0 && classes.is_empty() {
        return Err("an ensemble with hypotheses has no class".to_string());
    }
    if classes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(format!("classes {classes:?} are not strictly increasing"));
    }
    Ok(())
}


impl<H> RusBoostClassifier<H> {
    pub(super) fn new(
        classes:           Vec<i64>,
        algorithm:         Algorithm,
        hypotheses:        Vec<H>,
        samplers:          Vec<SamplerRecord>,
        estimator_weights: Vec<f64>,
        estimator_errors:  Vec<f64>,
        halt:              Halt,
    ) -> Self
    {
        if let Err(reason) = check_lengths(
            hypotheses.len(),
            samplers.len(),
            estimator_weights.len(),
            estimator_errors.len(),
        )
        {
            panic!("{reason}");
        }
        Self {
            classes,
            algorithm,
            hypotheses,
            samplers,
            estimator_weights,
            estimator_errors,
            halt,
        }
    }


    /// Returns the number of hypotheses.
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }


    /// Returns `true` if there is no hypothesis.
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }


    /// Returns the number of classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }


    /// Returns the algorithm the ensemble was trained with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }


    /// Returns the reason the boosting ended.
    pub fn halt(&self) -> Halt {
        self.halt
    }


    /// Returns the hypotheses in the order they were fit.
    pub fn hypotheses(&self) -> &[H] {
        &self.hypotheses[..]
    }


    /// Returns the sampler records, one per hypothesis.
    pub fn samplers(&self) -> &[SamplerRecord] {
        &self.samplers[..]
    }


    /// Returns the weight of each hypothesis.
    pub fn estimator_weights(&self) -> &[f64] {
        &self.estimator_weights[..self.len()]
    }


    /// Returns the weighted training error of each hypothesis.
    pub fn estimator_errors(&self) -> &[f64] {
        &self.estimator_errors[..self.len()]
    }


    /// Returns each round as a sampler followed by its hypothesis.
    pub fn pipelines(&self) -> Vec<Pipeline<'_, H>> {
        self.samplers.iter()
            .zip(&self.hypotheses)
            .map(|(s, h)| Pipeline::new(s, h))
            .collect()
    }


    /// Serializes `self` as JSON.
    pub fn to_json(&self) -> Result<String>
        where H: Serialize,
    {
        Ok(serde_json::to_string(self)?)
    }


    /// Reads an ensemble written by [`RusBoostClassifier::to_json`].
    pub fn from_json(json: &str) -> Result<Self>
        where H: DeserializeOwned,
    {
        Ok(serde_json::from_str(json)?)
    }


    /// Returns the sum of the hypothesis weights.
    fn weight_sum(&self) -> f64 {
        helpers::total(self.estimator_weights())
    }


    /// Accumulates `term(t)` over the hypotheses and divides by the
    /// running weight sum, returning the value after each hypothesis.
    fn staged<F>(&self, mut term: F) -> Vec<Vec<f64>>
        where F: FnMut(usize) -> Vec<f64>,
    {
        let n_class = self.n_classes();
        let mut acc = vec![0f64; n_class];
        let mut norm = 0f64;
        let weights = self.estimator_weights();
        (0..self.len())
            .map(|t| {
                acc.iter_mut()
                    .zip(term(t))
                    .for_each(|(a, v)| { *a += v; });
                norm += weights[t];
                scaled(&acc, norm)
            })
            .collect()
    }
}


impl<H> RusBoostClassifier<H>
    where H: Classifier,
{
    /// Returns the weighted vote of the hypotheses on each class:
    /// `d_k = Σ_t α_t [h_t(x) = c_k] / Σ_t α_t`.
    pub fn weighted_vote(&self, sample: &Sample, row: usize) -> Vec<f64> {
        let mut votes = vec![0f64; self.n_classes()];
        for (h, &w) in self.hypotheses.iter().zip(self.estimator_weights()) {
            let y = h.predict(sample, row);
            if let Ok(k) = self.classes.binary_search(&y) {
                votes[k] += w;
            }
        }
        scaled(&votes, self.weight_sum())
    }


    /// Predicts the class with the largest weighted vote.
    pub fn predict_by_vote(&self, sample: &Sample, row: usize) -> i64 {
        let votes = self.weighted_vote(sample, row);
        self.classes[helpers::argmax(&votes)]
    }
}


impl<H> RusBoostClassifier<H>
    where H: ProbabilisticClassifier,
{
    /// Returns the contribution of the `t`-th hypothesis
    /// to the decision function.
    fn term(&self, t: usize, sample: &Sample, row: usize) -> Vec<f64> {
        let h = &self.hypotheses[t];
        let n_class = self.n_classes();
        match self.algorithm {
            Algorithm::Samme => {
                let w = self.estimator_weights[t];
                let y = h.predict(sample, row);
                let mut vote = vec![0f64; n_class];
                if let Ok(k) = self.classes.binary_search(&y) {
                    vote[k] = w;
                }
                vote
            },
            Algorithm::SammeR => {
                let log_proba = aligned_proba(h, sample, row, &self.classes)
                    .into_iter()
                    .map(|p| p.max(f64::EPSILON).ln())
                    .collect::<Vec<_>>();
                let mean = log_proba.iter().sum::<f64>() / n_class as f64;
                let scale = (n_class as f64 - 1f64).max(0f64);
                log_proba.into_iter()
                    .map(|lp| scale * (lp - mean))
                    .collect()
            },
        }
    }


    /// Returns the decision function at `row`, one entry per class.
    pub fn decision_function(&self, sample: &Sample, row: usize) -> Vec<f64> {
        self.staged_decision_function(sample, row)
            .pop()
            .unwrap_or_else(|| vec![0f64; self.n_classes()])
    }


    /// Returns the decision function after each hypothesis.
    /// The last entry equals [`RusBoostClassifier::decision_function`].
    pub fn staged_decision_function(&self, sample: &Sample, row: usize)
        -> Vec<Vec<f64>>
    {
        self.staged(|t| self.term(t, sample, row))
    }


    /// Returns the prediction after each hypothesis.
    pub fn staged_predict(&self, sample: &Sample, row: usize) -> Vec<i64> {
        self.staged_decision_function(sample, row)
            .into_iter()
            .map(|d| self.classes[helpers::argmax(&d)])
            .collect()
    }


    /// Returns the class probabilities after each hypothesis.
    pub fn staged_predict_proba(&self, sample: &Sample, row: usize)
        -> Vec<Vec<f64>>
    {
        self.staged_decision_function(sample, row)
            .into_iter()
            .map(|d| self.proba_from_decision(d))
            .collect()
    }


    /// `softmax(d / (K - 1))`.
    fn proba_from_decision(&self, mut decision: Vec<f64>) -> Vec<f64> {
        let n_class = self.n_classes();
        if n_class == 1 {
            return vec![1f64];
        }
        let scale = (n_class - 1) as f64;
        decision.iter_mut().for_each(|d| { *d /= scale; });
        helpers::softmax(&mut decision);
        decision
    }
}


impl<H> Classifier for RusBoostClassifier<H>
    where H: ProbabilisticClassifier,
{
    fn classes(&self) -> &[i64] {
        &self.classes[..]
    }


    fn predict(&self, sample: &Sample, row: usize) -> i64 {
        let decision = self.decision_function(sample, row);
        self.classes[helpers::argmax(&decision)]
    }
}


impl<H> ProbabilisticClassifier for RusBoostClassifier<H>
    where H: ProbabilisticClassifier,
{
    fn predict_proba(&self, sample: &Sample, row: usize) -> Vec<f64> {
        let decision = self.decision_function(sample, row);
        self.proba_from_decision(decision)
    }
}


impl<H> FeatureImportance for RusBoostClassifier<H>
    where H: FeatureImportance,
{
    /// The average of the hypotheses' importances,
    /// weighted by the hypothesis weights.
    fn feature_importances(&self) -> BTreeMap<String, f64> {
        let norm = self.weight_sum();
        let mut importances = BTreeMap::new();
        for (h, &w) in self.hypotheses.iter().zip(self.estimator_weights()) {
            for (name, v) in h.feature_importances() {
                *importances.entry(name).or_insert(0f64) += w * v;
            }
        }
        if norm != 0f64 {
            importances.values_mut().for_each(|v| { *v /= norm; });
        }
        importances
    }
}


/// Returns `items / norm`, or `items` itself if `norm` is zero.
fn scaled(items: &[f64], norm: f64) -> Vec<f64> {
    if norm == 0f64 {
        return items.to_vec();
    }
    items.iter().map(|v| v / norm).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoostError;

    const TEST_TOLERANCE: f64 = 1e-12;

    /// Always predicts `proba`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Fixed {
        classes: Vec<i64>,
        proba: Vec<f64>,
    }

    impl Classifier for Fixed {
        fn classes(&self) -> &[i64] { &self.classes }
        fn predict(&self, _: &Sample, _: usize) -> i64 {
            self.classes[helpers::argmax(&self.proba)]
        }
    }

    impl ProbabilisticClassifier for Fixed {
        fn predict_proba(&self, _: &Sample, _: usize) -> Vec<f64> {
            self.proba.clone()
        }
    }

    impl FeatureImportance for Fixed {
        fn feature_importances(&self) -> BTreeMap<String, f64> {
            let k = helpers::argmax(&self.proba);
            BTreeMap::from([(format!("f{k}"), 1f64)])
        }
    }

    fn sample() -> Sample {
        Sample::from_columns([("x", vec![0.0])], vec![0.0]).unwrap()
    }

    fn record() -> SamplerRecord {
        SamplerRecord { seed: 0, sample_indices: vec![0] }
    }

    fn ensemble(algorithm: Algorithm) -> RusBoostClassifier<Fixed> {
        let classes = vec![0, 1, 2];
        let hypotheses = vec![
            Fixed { classes: classes.clone(), proba: vec![0.6, 0.3, 0.1] },
            Fixed { classes: classes.clone(), proba: vec![0.1, 0.2, 0.7] },
            Fixed { classes: classes.clone(), proba: vec![0.1, 0.8, 0.1] },
        ];
        let (weights, errors) = match algorithm {
            Algorithm::Samme => (vec![1.0, 3.0, 1.0, 0.0], vec![0.3, 0.1, 0.3, 1.0]),
            Algorithm::SammeR => (vec![1.0, 1.0, 1.0, 0.0], vec![0.3, 0.1, 0.3, 1.0]),
        };
        RusBoostClassifier::new(
            classes,
            algorithm,
            hypotheses,
            vec![record(), record(), record()],
            weights,
            errors,
            Halt::Completed,
        )
    }

    #[test]
    fn test_truncated_arrays() {
        let f = ensemble(Algorithm::Samme);
        assert_eq!(f.len(), 3);
        assert_eq!(f.estimator_weights(), &[1.0, 3.0, 1.0]);
        assert_eq!(f.estimator_errors(), &[0.3, 0.1, 0.3]);
        assert_eq!(f.pipelines().len(), 3);
    }

    #[test]
    fn test_samme_decision() {
        let f = ensemble(Algorithm::Samme);
        let sample = sample();

        let d = f.decision_function(&sample, 0);
        let expected = [0.2, 0.2, 0.6];
        for (e, r) in expected.iter().zip(&d) {
            assert!((e - r).abs() < TEST_TOLERANCE, "expected {e}, got {r}.");
        }
        assert_eq!(d, f.weighted_vote(&sample, 0));
        assert_eq!(f.predict(&sample, 0), 2);
        assert_eq!(f.predict_by_vote(&sample, 0), 2);
        assert_eq!(f.staged_predict(&sample, 0), vec![0, 2, 2]);
    }

    #[test]
    fn test_staged_ends_at_final() {
        for algorithm in [Algorithm::Samme, Algorithm::SammeR] {
            let f = ensemble(algorithm);
            let sample = sample();
            let staged = f.staged_decision_function(&sample, 0);
            assert_eq!(staged.len(), 3);
            assert_eq!(staged.last().unwrap(), &f.decision_function(&sample, 0));

            let proba = f.staged_predict_proba(&sample, 0);
            assert_eq!(proba.last().unwrap(), &f.predict_proba(&sample, 0));
        }
    }

    #[test]
    fn test_samme_r_proba_sums_to_one() {
        let f = ensemble(Algorithm::SammeR);
        let sample = sample();

        let d = f.decision_function(&sample, 0);
        let sum = d.iter().sum::<f64>();
        assert!(sum.abs() < 1e-9, "the real decision is centered, got {sum}.");

        let p = f.predict_proba(&sample, 0);
        let sum = p.iter().sum::<f64>();
        assert!((sum - 1f64).abs() < TEST_TOLERANCE, "expected 1, got {sum}.");
        assert_eq!(helpers::argmax(&p), helpers::argmax(&d));
    }

    #[test]
    fn test_single_class_proba() {
        let h = Fixed { classes: vec![4], proba: vec![1.0] };
        let f = RusBoostClassifier::new(
            vec![4], Algorithm::SammeR, vec![h], vec![record()],
            vec![1.0], vec![0.0], Halt::Perfect,
        );
        let sample = sample();
        assert_eq!(f.predict_proba(&sample, 0), vec![1.0]);
        assert_eq!(f.predict(&sample, 0), 4);
    }

    #[test]
    fn test_feature_importances() {
        let f = ensemble(Algorithm::Samme);
        let imp = f.feature_importances();
        let expected = BTreeMap::from([
            ("f0".to_string(), 0.2),
            ("f1".to_string(), 0.2),
            ("f2".to_string(), 0.6),
        ]);
        for (k, e) in expected {
            let r = imp[&k];
            assert!((e - r).abs() < TEST_TOLERANCE, "expected {e}, got {r}.");
        }
    }

    #[test]
    fn test_json_round_trip() {
        let f = ensemble(Algorithm::SammeR);
        let json = f.to_json().unwrap();
        let g = RusBoostClassifier::<Fixed>::from_json(&json).unwrap();
        assert_eq!(f, g);
        assert_eq!(g.halt(), Halt::Completed);
    }

    #[test]
    fn test_from_json_rejects_short_arrays() {
        let f = ensemble(Algorithm::Samme);
        let value = serde_json::to_value(&f).unwrap();

        let mut short = value.clone();
        short["estimator_weights"] = serde_json::json!([1.0, 3.0]);
        short["estimator_errors"] = serde_json::json!([0.3, 0.1]);
        let res = RusBoostClassifier::<Fixed>::from_json(&short.to_string());
        assert!(matches!(res, Err(BoostError::Json(_))), "got {res:?}");

        let mut mismatched = value.clone();
        mismatched["estimator_errors"] = serde_json::json!([0.3]);
        let res = RusBoostClassifier::<Fixed>::from_json(&mismatched.to_string());
        assert!(res.is_err());

        let mut unsorted = value;
        unsorted["classes"] = serde_json::json!([2, 0, 1]);
        let res = RusBoostClassifier::<Fixed>::from_json(&unsorted.to_string());
        assert!(res.is_err());
    }
}
