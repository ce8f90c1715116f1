//! Provides [`RusBoost`] by Seiffert et al., 2010.
use rand::prelude::*;
use rand::rngs::StdRng;
use log::{debug, info, warn};

use std::ops::ControlFlow;

use crate::{
    common::{checkers, helpers},
    constants::{DEFAULT_N_ESTIMATORS, DEFAULT_LEARNING_RATE},
    research::Research,
    sampler::{Sampler, SamplerRecord, RandomUnderSampler},
    Booster,
    Classifier,
    Result,
    Sample,
    WeakLearner,
};

use super::{
    ensemble::{RusBoostClassifier, Halt},
    update_rule::{Algorithm, UpdateRule, RoundContext, RoundOutcome},
};


/// Defines `RusBoost`.
/// This struct is based on the paper:
/// [RUSBoost: A Hybrid Approach to Alleviating Class Imbalance](https://doi.org/10.1109/TSMCA.2009.2029559)
/// by Chris Seiffert, Taghi M. Khoshgoftaar, Jason Van Hulse, and Amri Napolitano.
///
/// Each round draws a balanced subsample with a [`Sampler`],
/// fits the weak learner on it,
/// and then scores the new hypothesis on the **whole** sample.
/// The sample weights are updated by the multi-class AdaBoost rule
/// [`UpdateRule`]: SAMME (discrete) or SAMME.R (real).
///
/// # Example
/// ```no_run
/// use rusboost::prelude::*;
///
/// // Read the training sample from the CSV file.
/// // We use the column named `class` as the label.
/// let has_header = true;
/// let sample = Sample::from_csv("/path/to/train.csv", has_header)
///     .unwrap()
///     .set_target("class")
///     .unwrap();
///
/// // Initialize `RusBoost`.
/// let mut booster = RusBoost::init(&sample)
///     .n_estimators(50)
///     .learning_rate(0.5)
///     .algorithm(Algorithm::Samme)
///     .seed(1234);
///
/// // The weak learner sees the whole sample here
/// // and balanced subsamples of it while boosting.
/// let weak_learner = DecisionTreeBuilder::new(&sample)
///     .max_depth(2)
///     .build();
///
/// // Run `RusBoost` and obtain the resulting hypothesis `f`.
/// let f = booster.run(&weak_learner).unwrap();
///
/// // Get the predictions on the training set.
/// let predictions: Vec<i64> = f.predict_all(&sample);
/// println!("{} hypotheses, halted: {}", f.len(), f.halt());
/// ```
pub struct RusBoost<'a, H, U = Algorithm, S = RandomUnderSampler> {
    // Training sample
    sample: &'a Sample,

    // Class labels of `sample`.
    labels: Vec<i64>,

    // Maximal number of rounds.
    n_estimators: usize,

    // Shrinkage of the hypothesis weights.
    learning_rate: f64,

    update_rule: U,
    sampler: S,

    // `None` seeds the RNG from the OS.
    seed: Option<u64>,

    // User-given initial weights.
    sample_weight: Option<Vec<f64>>,

    // Weights on the sample.
    dist: Vec<f64>,

    rng: StdRng,

    // Fixed after the first round.
    classes: Vec<i64>,

    hypotheses: Vec<H>,
    samplers: Vec<SamplerRecord>,

    // Pre-sized to `n_estimators`.
    estimator_weights: Vec<f64>,
    estimator_errors: Vec<f64>,

    // (weight, error) of the last kept hypothesis.
    last_round: Option<(f64, f64)>,

    halt: Halt,
}


impl<'a, H> RusBoost<'a, H, Algorithm, RandomUnderSampler> {
    /// Initialize the `RusBoost`.
    /// By default, `RusBoost` runs `50` rounds of SAMME.R
    /// with learning rate `1.0` and [`RandomUnderSampler::default`].
    pub fn init(sample: &'a Sample) -> Self {
        let n_sample = sample.shape().0;
        let uni = 1f64 / n_sample.max(1) as f64;

        Self {
            sample,
            labels: Vec::new(),

            n_estimators: DEFAULT_N_ESTIMATORS,
            learning_rate: DEFAULT_LEARNING_RATE,
            update_rule: Algorithm::default(),
            sampler: RandomUnderSampler::default(),

            seed: None,
            sample_weight: None,

            dist: vec![uni; n_sample],
            rng: StdRng::seed_from_u64(0),

            classes: Vec::new(),
            hypotheses: Vec::new(),
            samplers: Vec::new(),
            estimator_weights: Vec::new(),
            estimator_errors: Vec::new(),
            last_round: None,
            halt: Halt::Completed,
        }
    }
}


impl<H, S> RusBoost<'_, H, Algorithm, S> {
    /// Choose between SAMME and SAMME.R.
    /// Default is [`Algorithm::SammeR`].
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.update_rule = algorithm;
        self
    }
}


impl<'a, H, U, S> RusBoost<'a, H, U, S> {
    /// Set the maximal number of rounds.
    /// Boosting may stop earlier.
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }


    /// Set the learning rate.
    /// Each hypothesis weight is multiplied by this value.
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }


    /// Fix the seed of the random number generator.
    /// Two runs with the same seed and inputs give the same ensemble.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }


    /// Set the initial weights on the training examples.
    /// They are normalized before the first round.
    pub fn sample_weight(mut self, sample_weight: Vec<f64>) -> Self {
        self.sample_weight = Some(sample_weight);
        self
    }


    /// Replace the update rule,
    /// e.g., by [`Samme`](super::Samme) for hypotheses
    /// that do not output probabilities.
    pub fn update_rule<V>(self, update_rule: V) -> RusBoost<'a, H, V, S> {
        RusBoost {
            sample: self.sample,
            labels: self.labels,
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            update_rule,
            sampler: self.sampler,
            seed: self.seed,
            sample_weight: self.sample_weight,
            dist: self.dist,
            rng: self.rng,
            classes: self.classes,
            hypotheses: self.hypotheses,
            samplers: self.samplers,
            estimator_weights: self.estimator_weights,
            estimator_errors: self.estimator_errors,
            last_round: self.last_round,
            halt: self.halt,
        }
    }


    /// Replace the sampler that balances each round.
    pub fn sampler<T>(self, sampler: T) -> RusBoost<'a, H, U, T> {
        RusBoost {
            sample: self.sample,
            labels: self.labels,
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            update_rule: self.update_rule,
            sampler,
            seed: self.seed,
            sample_weight: self.sample_weight,
            dist: self.dist,
            rng: self.rng,
            classes: self.classes,
            hypotheses: self.hypotheses,
            samplers: self.samplers,
            estimator_weights: self.estimator_weights,
            estimator_errors: self.estimator_errors,
            last_round: self.last_round,
            halt: self.halt,
        }
    }


    /// Returns the current weights on the training examples.
    pub fn distribution(&self) -> &[f64] {
        &self.dist[..]
    }


    /// Returns the hypotheses kept so far.
    pub fn hypotheses(&self) -> &[H] {
        &self.hypotheses[..]
    }


    /// Returns the reason the last run ended.
    pub fn halt(&self) -> Halt {
        self.halt
    }


    /// Returns the weight and error of the last kept hypothesis.
    pub fn last_round(&self) -> Option<(f64, f64)> {
        self.last_round
    }
}


impl<H, U, S> RusBoost<'_, H, U, S>
    where H: Classifier,
          U: UpdateRule<H>,
{
    /// Returns the ensemble of the hypotheses kept so far.
    pub fn snapshot(&self) -> RusBoostClassifier<H>
        where H: Clone,
    {
        RusBoostClassifier::new(
            self.classes.clone(),
            self.update_rule.algorithm(),
            self.hypotheses.clone(),
            self.samplers.clone(),
            self.estimator_weights.clone(),
            self.estimator_errors.clone(),
            self.halt,
        )
    }


    /// Keeps `h` as the hypothesis of round `round`.
    fn keep(
        &mut self,
        round: usize,
        h: H,
        record: SamplerRecord,
        weight: f64,
        error: f64,
    )
    {
        self.hypotheses.push(h);
        self.samplers.push(record);
        self.estimator_weights[round] = weight;
        self.estimator_errors[round] = error;
        self.last_round = Some((weight, error));
    }
}


impl<H, U, S> Booster<H> for RusBoost<'_, H, U, S>
    where H: Classifier,
          U: UpdateRule<H>,
          S: Sampler,
{
    type Output = RusBoostClassifier<H>;


    fn name(&self) -> &str {
        "RUSBoost"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let (n_sample, n_feature) = self.sample.shape();
        let seed = self.seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "OS entropy".to_string());
        let info = Vec::from([
            ("# of examples", format!("{n_sample}")),
            ("# of features", format!("{n_feature}")),
            ("Max rounds", format!("{}", self.n_estimators)),
            ("Learning rate", format!("{}", self.learning_rate)),
            ("Update rule", self.update_rule.name().to_string()),
            ("Sampler", self.sampler.name().to_string()),
            ("Seed", seed),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) -> Result<()> {
        checkers::sample(self.sample)?;
        checkers::n_estimators(self.n_estimators)?;
        checkers::learning_rate(self.learning_rate)?;
        self.sampler.check(self.sample)?;

        let n_sample = self.sample.shape().0;
        let mut dist = match &self.sample_weight {
            Some(weights) => {
                checkers::sample_weight(weights, n_sample)?;
                weights.clone()
            },
            None => vec![1f64 / n_sample as f64; n_sample],
        };
        helpers::normalize(&mut dist);

        self.dist = dist;
        self.labels = self.sample.labels();
        self.rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.classes = Vec::new();
        self.hypotheses = Vec::with_capacity(self.n_estimators);
        self.samplers = Vec::with_capacity(self.n_estimators);
        self.estimator_weights = vec![0f64; self.n_estimators];
        self.estimator_errors = vec![1f64; self.n_estimators];
        self.last_round = None;
        self.halt = Halt::Completed;

        Ok(())
    }


    fn boost<W>(
        &mut self,
        weak_learner: &W,
        iteration: usize,
    ) -> ControlFlow<Result<usize>>
        where W: WeakLearner<Hypothesis = H>,
    {
        if self.n_estimators < iteration {
            return ControlFlow::Break(Ok(self.n_estimators));
        }
        let round = iteration - 1;

        let sampler_seed = self.rng.gen::<u64>();
        let learner_seed = self.rng.gen::<u64>();

        let resampled = match self.sampler.resample(self.sample, sampler_seed) {
            Ok(resampled) => resampled,
            Err(e) => return ControlFlow::Break(Err(e)),
        };

        // The learner is fit on the weights of the selected rows.
        let sub_dist = resampled.indices.iter()
            .map(|&i| self.dist[i])
            .collect::<Vec<_>>();
        let h = weak_learner.produce(&resampled.sample, &sub_dist, learner_seed);
        let record = resampled.into_record(sampler_seed);

        if self.hypotheses.is_empty() && self.classes.is_empty() {
            self.classes = h.classes().to_vec();
        }

        let ctx = RoundContext {
            sample: self.sample,
            labels: &self.labels[..],
            dist: &self.dist[..],
            classes: &self.classes[..],
            learning_rate: self.learning_rate,
            is_last: iteration == self.n_estimators,
            ensemble_len: self.hypotheses.len(),
        };

        let outcome = match self.update_rule.update(&ctx, &h) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("round {iteration}: {e}");
                return ControlFlow::Break(Err(e));
            },
        };

        match outcome {
            RoundOutcome::StopPerfect => {
                self.keep(round, h, record, 1f64, 0f64);
                self.halt = Halt::Perfect;
                info!("round {iteration}: no training error, stop boosting");
                ControlFlow::Break(Ok(iteration))
            },
            RoundOutcome::StopWorseThanRandom { error } => {
                self.halt = Halt::WorseThanRandom;
                warn!(
                    "round {iteration}: weighted error {error:.6} is \
                    no better than chance, the hypothesis is dropped"
                );
                ControlFlow::Break(Ok(round))
            },
            RoundOutcome::Continue { dist, weight, error } => {
                self.keep(round, h, record, weight, error);
                debug!(
                    "round {iteration}: weight {weight:.6}, error {error:.6}"
                );

                let total = helpers::total(&dist);
                self.dist = dist;
                if !total.is_finite() || total <= 0f64 {
                    self.halt = Halt::Degenerate;
                    info!(
                        "round {iteration}: sample weights sum to {total}, \
                        stop boosting"
                    );
                    return ControlFlow::Break(Ok(iteration));
                }

                if iteration < self.n_estimators {
                    helpers::normalize(&mut self.dist);
                    checkers::distribution(&self.dist);
                }
                ControlFlow::Continue(())
            },
        }
    }


    fn postprocess(&mut self) -> Self::Output {
        RusBoostClassifier::new(
            std::mem::take(&mut self.classes),
            self.update_rule.algorithm(),
            std::mem::take(&mut self.hypotheses),
            std::mem::take(&mut self.samplers),
            std::mem::take(&mut self.estimator_weights),
            std::mem::take(&mut self.estimator_errors),
            self.halt,
        )
    }
}


impl<H, U, S> Research for RusBoost<'_, H, U, S>
    where H: Classifier + Clone,
          U: UpdateRule<H>,
{
    type Output = RusBoostClassifier<H>;


    fn current_hypothesis(&self) -> RusBoostClassifier<H> {
        self.snapshot()
    }


    fn last_round(&self) -> Option<(f64, f64)> {
        self.last_round
    }
}

