//! Provides some helper functions.
//!
//! Sums are accumulated sequentially so that
//! the same input always produces the same bits.
use rayon::prelude::*;

/// Returns the sum of the given slice.
#[inline(always)]
pub fn total(items: &[f64]) -> f64 {
    items.iter().sum::<f64>()
}

/// Normalizes the given slice so that it sums to `1`.
/// The caller must guarantee a positive sum.
#[inline(always)]
pub fn normalize(items: &mut [f64]) {
    let z = total(items);

    assert!(z > 0.0, "cannot normalize a vector with sum {z}");

    items.par_iter_mut()
        .for_each(|item| { *item /= z; });
}

/// Replaces `items` by `softmax(items)`.
#[inline(always)]
pub fn softmax(items: &mut [f64]) {
    let max = items.iter()
        .copied()
        .fold(f64::MIN, f64::max);
    items.iter_mut()
        .for_each(|item| { *item = (*item - max).exp(); });
    normalize(items);
}

/// Returns an index whose entry is the maximal value.
/// Ties are broken by the smallest index.
pub fn argmax(arr: &[f64]) -> usize {
    assert!(!arr.is_empty(), "failed to execute argmax on an empty array");
    arr.iter()
        .enumerate()
        .skip(1)
        .fold(0, |best, (i, &a)| if arr[best] < a { i } else { best })
}
