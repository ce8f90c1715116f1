//! Random under-sampling.
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use std::fmt;
use std::collections::BTreeMap;

use crate::{
    BoostError,
    Result,
    Sample,
};

use super::core::*;


/// Which classes [`RandomUnderSampler`] shrinks, and to what size.
/// Unless stated otherwise, a targeted class is reduced
/// to the size of the minority class.
/// Ties between equally large (or small) classes go to the smaller label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SamplingStrategy {
    /// Same as [`SamplingStrategy::NotMinority`].
    #[default]
    Auto,
    /// Shrink the majority class only.
    Majority,
    /// Shrink every class except the minority one.
    NotMinority,
    /// Shrink every class except the majority one.
    NotMajority,
    /// Shrink every class.
    All,
    /// Binary problems only.
    /// The majority class is reduced to `floor(n_minority / ratio)`
    /// examples, so that `n_minority / n_majority ≈ ratio`.
    /// `ratio` must lie in `(0, 1]`.
    Ratio(f64),
    /// The number of examples to keep for each listed class.
    /// Classes not listed are kept as they are.
    Counts(BTreeMap<i64, usize>),
}


impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Majority => write!(f, "majority"),
            Self::NotMinority => write!(f, "not minority"),
            Self::NotMajority => write!(f, "not majority"),
            Self::All => write!(f, "all"),
            Self::Ratio(r) => write!(f, "ratio {r}"),
            Self::Counts(counts) => write!(f, "counts {counts:?}"),
        }
    }
}


/// Randomly drops examples of the targeted classes
/// until they reach their target size.
/// Untargeted classes keep every row, in the original order.
///
/// # Example
/// ```no_run
/// use rusboost::prelude::*;
///
/// let file = "/path/to/data/file.csv";
/// let sample = SampleReader::default()
///     .file(file)
///     .has_header(true)
///     .target_feature("class")
///     .read()
///     .unwrap();
///
/// let sampler = RandomUnderSampler::new()
///     .sampling_strategy(SamplingStrategy::Majority)
///     .replacement(false);
/// let balanced = sampler.resample(&sample, 1234).unwrap();
/// println!("{:?}", balanced.sample.class_counts());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RandomUnderSampler {
    strategy:    SamplingStrategy,
    replacement: bool,
}


impl RandomUnderSampler {
    /// Construct a new instance of [`RandomUnderSampler`]
    /// with [`SamplingStrategy::Auto`] and without replacement.
    pub fn new() -> Self {
        Self::default()
    }


    /// Set the sampling strategy.
    pub fn sampling_strategy(mut self, strategy: SamplingStrategy) -> Self {
        self.strategy = strategy;
        self
    }


    /// Draw the rows of a targeted class with replacement.
    /// Default is `false`.
    pub fn replacement(mut self, replacement: bool) -> Self {
        self.replacement = replacement;
        self
    }


    /// Returns the number of examples kept for each targeted class.
    /// Untargeted classes do not appear in the map.
    pub fn target_counts(&self, sample: &Sample)
        -> Result<BTreeMap<i64, usize>>
    {
        let counts = sample.class_counts();
        let Some((minority, n_minority)) = minority(&counts) else {
            return Err(BoostError::sample("the sample has no examples"));
        };
        let Some((majority, _)) = majority(&counts) else {
            return Err(BoostError::sample("the sample has no examples"));
        };

        let shrink_to_minority = |keep: &dyn Fn(i64) -> bool| {
            counts.keys()
                .copied()
                .filter(|&y| keep(y))
                .map(|y| (y, n_minority))
                .collect::<BTreeMap<_, _>>()
        };

        let targets = match &self.strategy {
            SamplingStrategy::Majority => {
                shrink_to_minority(&|y| y == majority)
            },
            SamplingStrategy::Auto | SamplingStrategy::NotMinority => {
                shrink_to_minority(&|y| y != minority)
            },
            SamplingStrategy::NotMajority => {
                shrink_to_minority(&|y| y != majority)
            },
            SamplingStrategy::All => {
                shrink_to_minority(&|_| true)
            },
            SamplingStrategy::Ratio(ratio) => {
                let ratio = *ratio;
                if counts.len() != 2 {
                    return Err(BoostError::parameter(
                        "sampling_strategy",
                        format!(
                            "a ratio applies to binary problems only, \
                            but the sample has {} classes",
                            counts.len(),
                        ),
                    ));
                }
                if !(ratio > 0f64 && ratio <= 1f64) {
                    return Err(BoostError::parameter(
                        "sampling_strategy",
                        format!("the ratio must lie in (0, 1], got {ratio}"),
                    ));
                }
                let n_target = (n_minority as f64 / ratio).floor() as usize;
                let mut targets = BTreeMap::new();
                for (&y, &n) in counts.iter().filter(|(&y, _)| y != minority) {
                    if n_target > n {
                        return Err(BoostError::parameter(
                            "sampling_strategy",
                            format!(
                                "the ratio {ratio} asks for {n_target} \
                                examples of class {y}, \
                                but it only has {n}"
                            ),
                        ));
                    }
                    targets.insert(y, n_target);
                }
                targets
            },
            SamplingStrategy::Counts(wanted) => {
                for (y, &n_target) in wanted {
                    let Some(&n) = counts.get(y) else {
                        return Err(BoostError::parameter(
                            "sampling_strategy",
                            format!("class {y} does not appear in the sample"),
                        ));
                    };
                    if n_target > n {
                        return Err(BoostError::parameter(
                            "sampling_strategy",
                            format!(
                                "cannot keep {n_target} examples of class {y}, \
                                it only has {n}"
                            ),
                        ));
                    }
                }
                wanted.clone()
            },
        };

        Ok(targets)
    }
}


impl Sampler for RandomUnderSampler {
    fn name(&self) -> &str {
        "Random Under-Sampler"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("Strategy", format!("{}", self.strategy)),
            ("Replacement", format!("{}", self.replacement)),
        ]);
        Some(info)
    }


    fn check(&self, sample: &Sample) -> Result<()> {
        self.target_counts(sample).map(|_| ())
    }


    fn resample(&self, sample: &Sample, seed: u64) -> Result<Resampled> {
        let targets = self.target_counts(sample)?;

        let mut rows_of = BTreeMap::<i64, Vec<usize>>::new();
        for (i, y) in sample.labels().into_iter().enumerate() {
            rows_of.entry(y).or_default().push(i);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices = Vec::with_capacity(sample.shape().0);
        for (y, rows) in rows_of {
            let Some(&n_target) = targets.get(&y) else {
                indices.extend(rows);
                continue;
            };

            let mut picked = if self.replacement {
                (0..n_target).map(|_| rng.gen_range(0..rows.len()))
                    .collect::<Vec<_>>()
            } else {
                rand::seq::index::sample(&mut rng, rows.len(), n_target)
                    .into_vec()
            };
            picked.sort_unstable();
            indices.extend(picked.into_iter().map(|k| rows[k]));
        }

        let sample = sample.subset(&indices);
        Ok(Resampled { sample, indices })
    }
}


/// Returns the smallest class and its size.
fn minority(counts: &BTreeMap<i64, usize>) -> Option<(i64, usize)> {
    // `min_by_key` keeps the first minimum.
    counts.iter()
        .min_by_key(|(_, &n)| n)
        .map(|(&y, &n)| (y, n))
}


/// Returns the largest class and its size.
fn majority(counts: &BTreeMap<i64, usize>) -> Option<(i64, usize)> {
    counts.iter()
        .fold(None, |best, (&y, &n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((y, n)),
        })
}
