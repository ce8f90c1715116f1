use std::fmt;
use std::ops::Range;

use crate::{
    constants::{
        PERTURBATION,
        PRINT_WIDTH_BINNING,
    },
    Feature,
};

/// Binning: A feature processing.
#[derive(Debug, Clone)]
pub struct Bin(pub Range<f64>);

impl Bin {
    /// Create a new instance of `Bin`.
    #[inline(always)]
    pub fn new(range: Range<f64>) -> Self {
        Self(range)
    }

    /// Check whether the given `item` is conteined by `self.`
    #[inline(always)]
    pub fn contains(&self, item: &f64) -> bool {
        self.0.contains(item)
    }

    /// The left end of the bin.
    pub fn start(&self) -> f64 { self.0.start }

    /// Replace the left end of the bin.
    pub fn set_start(&mut self, s: f64) {
        self.0.start = s;
    }

    /// The right end of the bin (exclusive).
    pub fn end(&self) -> f64 { self.0.end }

    /// Replace the right end of the bin.
    pub fn set_end(&mut self, e: f64) {
        self.0.end = e;
    }
}

/// A bin paired with the weight of each class falling into it.
/// `weights[k]` is the mass of the `k`-th class.
pub type Pack = Vec<(Bin, Vec<f64>)>;

/// A wrapper of `Vec<Bin>`.
#[derive(Debug)]
pub struct Bins(Vec<Bin>);

impl Bins {
    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if `self` has no bin.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cut the given `Feature` into `n_bins` bins.
    /// This method naively cut the given slice with same width.
    #[inline(always)]
    pub fn cut(feature: &Feature, n_bin: usize) -> Self {
        let n_bin = n_bin.max(1);
        let (mut min, mut max) = match feature {
            Feature::Dense { vals, .. } => min_and_max(vals.iter().copied()),
            Feature::Sparse { vals, .. } => {
                min_and_max(vals.iter().map(|(_, v)| *v))
            },
        };

        // Rows missing from a sparse column take `0`.
        if feature.is_sparse() && feature.has_zero() {
            min = min.min(0f64);
            max = max.max(0f64);
        }

        // Empty column.
        if min > max {
            min = 0f64;
            max = 0f64;
        }

        // If the minimum value equals to the maximum one,
        // slightly perturb them.
        if min == max {
            min -= PERTURBATION;
            max += PERTURBATION;
        }

        let width = (max - min) / n_bin as f64;

        let mut bins = Vec::with_capacity(n_bin);
        let mut left = min;
        for i in 0..n_bin {
            let l = if i == 0 { f64::MIN } else { left };
            let r = if i == n_bin - 1 { f64::MAX } else { min + width * (i + 1) as f64 };
            bins.push(Bin::new(l..r));

            left = r;
        }

        Self(bins)
    }

    /// Returns the position of the bin that contains `x`.
    #[inline(always)]
    fn position(&self, x: f64) -> usize {
        self.0.partition_point(|bin| bin.end() <= x)
            .min(self.0.len() - 1)
    }

    /// Accumulates the weights of the examples in `indices`
    /// into the bins, per class.
    /// `labels[i]` is the class index of the `i`-th example.
    /// Bins without any example are dropped.
    pub fn pack(
        &self,
        indices: &[usize],
        feature: &Feature,
        labels: &[usize],
        dist: &[f64],
        n_class: usize,
    ) -> Pack
    {
        let n_bins = self.0.len();
        let mut packed = vec![vec![0f64; n_class]; n_bins];
        let mut occupied = vec![false; n_bins];

        for &i in indices {
            let pos = self.position(feature[i]);
            packed[pos][labels[i]] += dist[i];
            occupied[pos] = true;
        }

        let pack = self.0.iter()
            .cloned()
            .zip(packed)
            .zip(occupied)
            .filter_map(|(pair, occ)| occ.then_some(pair))
            .collect::<Vec<_>>();
        remove_gaps(pack)
    }
}

fn min_and_max<I>(vals: I) -> (f64, f64)
    where I: Iterator<Item = f64>,
{
    vals.fold((f64::MAX, f64::MIN), |(min, max), v| (min.min(v), max.max(v)))
}

/// Merges the gaps left by the dropped bins.
/// # Example
/// Assume that we have bins and its weight.
/// ```text
/// Bins       | [-3.0, 2.5), [2.5, 7.0), [7.0, 8.1), [8.1, 9.0)
/// Weights(+) |     0.5,        0.0,        0.0,        0.2
/// Weights(-) |     0.0,        0.0,        0.0,        0.1
/// ```
/// After the empty bins are dropped,
/// the boundary between two neighbors moves to the midpoint of the gap:
/// ```text
/// Bins       | [-Inf, 5.3), [5.3, +Inf)
/// Weights(+) |     0.5,        0.2
/// Weights(-) |     0.0,        0.1
/// ```
fn remove_gaps(mut pack: Pack) -> Pack {
    let n = pack.len();
    if n == 0 { return pack; }

    for i in 0..n-1 {
        let t = {
            let e = pack[i].0.end();
            let s = pack[i+1].0.start();
            (s + e) / 2f64
        };
        pack[i].0.set_end(t);
        pack[i+1].0.set_start(t);
    }
    pack[0].0.set_start(f64::MIN);
    pack[n-1].0.set_end(f64::MAX);
    pack
}

impl fmt::Display for Bins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bins = &self.0;
        let n_bins = bins.len();
        if n_bins > PRINT_WIDTH_BINNING {
            let head = bins[..2].iter()
                .map(|bin| format!("{bin}"))
                .collect::<Vec<_>>()
                .join(", ");
            let tail = bins.last()
                .map(|bin| format!("{bin}"))
                .unwrap_or_default();
            write!(f, "{head}, ..., {tail}")
        } else {
            let line = bins.iter()
                .map(|bin| format!("{}", bin))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "{line}")
        }
    }
}

fn format_end(value: f64) -> String {
    if value == f64::MIN { return String::from("-Inf"); }
    if value == f64::MAX { return String::from("+Inf"); }
    let sgn = if value > 0.0 {
        '+'
    } else if value < 0.0 {
        '-'
    } else {
        ' '
    };
    let value = value.abs();
    format!("{sgn}{value: >.2}")
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = format_end(self.0.start);
        let end = format_end(self.0.end);
        write!(f, "[{start}, {end})")
    }
}
