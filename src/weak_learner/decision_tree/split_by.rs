use rayon::prelude::*;

use serde::{Serialize, Deserialize};

use std::fmt;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    common::binning::*,
    Sample,
};

/// Score for a splitting.
/// This is just a wrapper for `f64`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
struct Score(f64);

impl From<f64> for Score {
    #[inline(always)]
    fn from(score: f64) -> Self {
        Self(score)
    }
}

impl PartialEq for Score {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl PartialOrd for Score {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.total_cmp(&other.0))
    }
}

/// Splitting criteria for growing decision tree.
/// Both criteria handle any number of classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitBy {
    /// Entropy (information gain).
    Entropy,
    /// Gini index.
    Gini,
}

impl fmt::Display for SplitBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entropy => "Entropy",
            Self::Gini => "Gini index",
        };

        write!(f, "{name}")
    }
}

/// The result of [`SplitBy::best_split`].
pub(super) struct BestSplit<'a> {
    pub(super) feature: &'a str,
    pub(super) threshold: f64,
    /// Weighted impurity of the children.
    pub(super) score: f64,
}

impl SplitBy {
    /// Returns the impurity of the given class weights.
    pub fn impurity(&self, weights: &[f64]) -> f64 {
        match self {
            Self::Entropy => entropic_impurity(weights),
            Self::Gini => gini_impurity(weights),
        }
    }

    /// Returns the best splitting rule among the features `candidates`
    /// based on the criterion.
    /// Ties are broken by the feature order of `sample`.
    pub(super) fn best_split<'a>(
        &self,
        bins_map:   &HashMap<&str, Bins>,
        sample:     &'a Sample,
        labels:     &[usize],
        dist:       &[f64],
        idx:        &[usize],
        n_class:    usize,
        candidates: &[usize],
    ) -> Option<BestSplit<'a>>
    {
        let features = sample.features();
        candidates.par_iter()
            .map(|&k| {
                let feature = &features[k];
                let name = feature.name();
                let bins = bins_map.get(name)
                    .unwrap_or_else(|| panic!("no bins for the feature `{name}`"));
                let pack = bins.pack(idx, feature, labels, dist, n_class);
                let (threshold, score) = self.split(pack, n_class);

                (score, name, threshold)
            })
            .min_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(Ordering::Equal))
            .map(|(score, feature, threshold)| {
                BestSplit { feature, threshold, score: score.0 }
            })
    }

    /// Scans the bins from left to right and returns the threshold
    /// that minimizes the weighted impurity of the children.
    /// The threshold `f64::MIN` means that no split beats the parent.
    fn split(&self, pack: Pack, n_class: usize) -> (f64, Score) {
        let mut left_weight = vec![0f64; n_class];
        let mut right_weight = vec![0f64; n_class];
        for (_, weights) in pack.iter() {
            right_weight.iter_mut()
                .zip(weights)
                .for_each(|(r, w)| { *r += w; });
        }
        let weight_sum = right_weight.iter().sum::<f64>();

        let mut best_score = self.impurity(&right_weight);
        let mut best_threshold = f64::MIN;
        if weight_sum <= 0f64 {
            return (best_threshold, Score::from(best_score));
        }

        let mut left_weight_sum = 0f64;
        for (bin, weights) in pack {
            for (k, w) in weights.into_iter().enumerate() {
                left_weight[k] += w;
                right_weight[k] -= w;
                left_weight_sum += w;
            }
            let lp = left_weight_sum / weight_sum;
            let rp = (1f64 - lp).max(0f64);

            let left_impurity = self.impurity(&left_weight);
            let right_impurity = self.impurity(&right_weight);
            let score = lp * left_impurity + rp * right_impurity;

            if score < best_score {
                best_score = score;
                best_threshold = bin.0.end;
            }
        }
        (best_threshold, Score::from(best_score))
    }
}

/// Returns the entropic impurity of the given class weights.
fn entropic_impurity(weights: &[f64]) -> f64 {
    let total = weights.iter()
        .map(|w| w.max(0f64))
        .sum::<f64>();
    if total <= 0f64 { return 0f64; }

    weights.iter()
        .map(|&w| {
            let p = w.max(0f64) / total;
            if p <= 0f64 { 0f64 } else { -p * p.ln() }
        })
        .sum::<f64>()
}

/// Returns the gini impurity of the given class weights.
fn gini_impurity(weights: &[f64]) -> f64 {
    let total = weights.iter()
        .map(|w| w.max(0f64))
        .sum::<f64>();
    if total <= 0f64 { return 0f64; }

    let correct = weights.iter()
        .map(|&w| (w.max(0f64) / total).powi(2))
        .sum::<f64>();

    (1f64 - correct).max(0f64)
}
