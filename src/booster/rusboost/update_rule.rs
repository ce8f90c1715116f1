//! The per-round update rules of RUSBoost:
//! discrete SAMME and real SAMME.R.
use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::fmt;
use std::str::FromStr;

use crate::{
    common::helpers,
    BoostError,
    Classifier,
    ProbabilisticClassifier,
    Result,
    Sample,
};


/// What an update rule sees in one boosting round.
pub struct RoundContext<'s> {
    /// The whole training sample.
    pub sample: &'s Sample,
    /// The class label of each row of `sample`.
    pub labels: &'s [i64],
    /// The sample weights at the start of the round.
    pub dist: &'s [f64],
    /// The classes of the ensemble, fixed at the first round.
    pub classes: &'s [i64],
    /// The shrinkage of each learner weight.
    pub learning_rate: f64,
    /// `true` in the last permissible round.
    /// The weights are not updated then.
    pub is_last: bool,
    /// The number of hypotheses already kept.
    pub ensemble_len: usize,
}


/// The result of an update rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// Keep the hypothesis and go on with `dist`.
    /// `dist` is not normalized.
    Continue {
        /// The next sample weights.
        dist: Vec<f64>,
        /// The weight of the new hypothesis.
        weight: f64,
        /// The weighted training error of the new hypothesis.
        error: f64,
    },
    /// The hypothesis makes no mistake. Keep it and stop.
    StopPerfect,
    /// The hypothesis is no better than chance. Drop it and stop.
    StopWorseThanRandom {
        /// The weighted training error of the dropped hypothesis.
        error: f64,
    },
}


/// An update rule scores a fitted hypothesis on the whole sample
/// and computes its weight and the next sample weights.
pub trait UpdateRule<H> {
    /// Returns the name of the rule.
    fn name(&self) -> &str;


    /// Returns the algorithm this rule implements.
    /// The trained ensemble combines its hypotheses accordingly.
    fn algorithm(&self) -> Algorithm;


    /// Evaluates `h` in the round described by `ctx`.
    fn update(&self, ctx: &RoundContext<'_>, h: &H) -> Result<RoundOutcome>;
}


/// The discrete update rule (SAMME).
/// Misclassified rows are scaled by `exp(weight)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Samme;


/// The real update rule (SAMME.R).
/// Every row is scaled according to the probability
/// the hypothesis puts on its class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SammeR;


/// The update rule chosen at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// See [`Samme`].
    #[serde(rename = "SAMME")]
    Samme,
    /// See [`SammeR`].
    #[default]
    #[serde(rename = "SAMME.R")]
    SammeR,
}


impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Samme => "SAMME",
            Self::SammeR => "SAMME.R",
        };
        write!(f, "{name}")
    }
}


impl FromStr for Algorithm {
    type Err = BoostError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SAMME" => Ok(Self::Samme),
            "SAMME.R" => Ok(Self::SammeR),
            _ => Err(BoostError::parameter(
                "algorithm",
                format!("expected `SAMME` or `SAMME.R`, got `{s}`"),
            )),
        }
    }
}


impl<H> UpdateRule<H> for Samme
    where H: Classifier,
{
    fn name(&self) -> &str {
        "SAMME"
    }


    fn algorithm(&self) -> Algorithm {
        Algorithm::Samme
    }


    fn update(&self, ctx: &RoundContext<'_>, h: &H) -> Result<RoundOutcome> {
        let predictions = h.predict_all(ctx.sample);
        let incorrect = misclassified(&predictions, ctx.labels);
        let error = weighted_error(&incorrect, ctx.dist);

        if error <= 0f64 {
            return Ok(RoundOutcome::StopPerfect);
        }

        let n_class = ctx.classes.len() as f64;
        let threshold = 1f64 - 1f64 / n_class;
        if error >= threshold {
            if ctx.ensemble_len == 0 {
                return Err(BoostError::WorseThanRandom { error, threshold });
            }
            return Ok(RoundOutcome::StopWorseThanRandom { error });
        }

        let weight = ctx.learning_rate
            * (((1f64 - error) / error).ln() + (n_class - 1f64).ln());

        let dist = if ctx.is_last {
            ctx.dist.to_vec()
        } else {
            ctx.dist.par_iter()
                .enumerate()
                .map(|(i, &w)| {
                    if incorrect[i] && (w > 0f64 || weight < 0f64) {
                        w * weight.exp()
                    } else {
                        w
                    }
                })
                .collect::<Vec<_>>()
        };

        Ok(RoundOutcome::Continue { dist, weight, error })
    }
}


impl<H> UpdateRule<H> for SammeR
    where H: ProbabilisticClassifier,
{
    fn name(&self) -> &str {
        "SAMME.R"
    }


    fn algorithm(&self) -> Algorithm {
        Algorithm::SammeR
    }


    fn update(&self, ctx: &RoundContext<'_>, h: &H) -> Result<RoundOutcome> {
        let n_sample = ctx.labels.len();
        let proba = (0..n_sample)
            .map(|i| aligned_proba(h, ctx.sample, i, ctx.classes))
            .collect::<Vec<_>>();

        let predictions = proba.iter()
            .map(|p| ctx.classes[helpers::argmax(p)])
            .collect::<Vec<_>>();
        let incorrect = misclassified(&predictions, ctx.labels);
        let error = weighted_error(&incorrect, ctx.dist);

        if error <= 0f64 {
            return Ok(RoundOutcome::StopPerfect);
        }

        let dist = if ctx.is_last {
            ctx.dist.to_vec()
        } else {
            let lr = ctx.learning_rate;
            ctx.dist.par_iter()
                .zip(proba.par_iter())
                .zip(ctx.labels.par_iter())
                .map(|((&w, p), y)| {
                    let true_class = ctx.classes.binary_search(y).ok();
                    let c = samme_r_contribution(p, true_class, lr);
                    if w > 0f64 || c < 0f64 { w * c.exp() } else { w }
                })
                .collect::<Vec<_>>()
        };

        Ok(RoundOutcome::Continue { dist, weight: 1f64, error })
    }
}


impl<H> UpdateRule<H> for Algorithm
    where H: ProbabilisticClassifier,
{
    fn name(&self) -> &str {
        match self {
            Self::Samme => "SAMME",
            Self::SammeR => "SAMME.R",
        }
    }


    fn algorithm(&self) -> Algorithm {
        *self
    }


    fn update(&self, ctx: &RoundContext<'_>, h: &H) -> Result<RoundOutcome> {
        match self {
            Self::Samme => Samme.update(ctx, h),
            Self::SammeR => SammeR.update(ctx, h),
        }
    }
}


/// Returns the probabilities `h` puts on `classes` at `row`.
/// A class `h` does not know gets `0`.
pub(crate) fn aligned_proba<H>(
    h: &H,
    sample: &Sample,
    row: usize,
    classes: &[i64],
) -> Vec<f64>
    where H: ProbabilisticClassifier,
{
    let known = h.classes();
    let proba = h.predict_proba(sample, row);
    if known == classes {
        return proba;
    }

    classes.iter()
        .map(|c| {
            known.iter()
                .position(|k| k == c)
                .and_then(|k| proba.get(k).copied())
                .unwrap_or(0f64)
        })
        .collect()
}


/// Returns `-lr * (K-1)/K * Σ_k y_k ln p_k`,
/// where `y` is `1` at `true_class` and `-1/(K-1)` elsewhere
/// and `p` is clipped below at `f64::EPSILON`.
pub fn samme_r_contribution(
    proba: &[f64],
    true_class: Option<usize>,
    learning_rate: f64,
) -> f64
{
    let n_class = proba.len();
    if n_class < 2 { return 0f64; }

    let k = n_class as f64;
    let off = -1f64 / (k - 1f64);
    let inner = proba.iter()
        .enumerate()
        .map(|(j, &p)| {
            let code = if Some(j) == true_class { 1f64 } else { off };
            code * p.max(f64::EPSILON).ln()
        })
        .sum::<f64>();

    -learning_rate * ((k - 1f64) / k) * inner
}


/// Returns the set of rows with a wrong prediction.
fn misclassified(predictions: &[i64], labels: &[i64]) -> FixedBitSet {
    let mut incorrect = FixedBitSet::with_capacity(labels.len());
    predictions.iter()
        .zip(labels)
        .enumerate()
        .filter(|(_, (p, y))| p != y)
        .for_each(|(i, _)| incorrect.insert(i));
    incorrect
}


/// Returns the weighted fraction of the rows in `incorrect`.
fn weighted_error(incorrect: &FixedBitSet, dist: &[f64]) -> f64 {
    let total = helpers::total(dist);
    let wrong = incorrect.ones()
        .map(|i| dist[i])
        .sum::<f64>();
    wrong / total
}
