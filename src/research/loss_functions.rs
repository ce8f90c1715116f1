use std::collections::BTreeMap;

use crate::{
    Classifier,
    Sample,
};


/// Zero-one loss: the fraction of misclassified examples.
pub fn zero_one_loss<H>(sample: &Sample, f: &H) -> f64
    where H: Classifier,
{
    let n_sample = sample.shape().0;
    if n_sample == 0 { return 0f64; }

    f.predict_all(sample)
        .into_iter()
        .zip(sample.labels())
        .filter(|(p, y)| p != y)
        .count() as f64
        / n_sample as f64
}


/// Balanced error: the average over classes of the per-class
/// misclassification rate.
/// Unlike [`zero_one_loss`], a minority class counts as much as
/// a majority one.
pub fn balanced_error<H>(sample: &Sample, f: &H) -> f64
    where H: Classifier,
{
    let mut per_class = BTreeMap::<i64, (usize, usize)>::new();
    for (p, y) in f.predict_all(sample).into_iter().zip(sample.labels()) {
        let (wrong, total) = per_class.entry(y).or_insert((0, 0));
        *total += 1;
        if p != y { *wrong += 1; }
    }
    if per_class.is_empty() { return 0f64; }

    let n_class = per_class.len() as f64;
    per_class.values()
        .map(|&(wrong, total)| wrong as f64 / total as f64)
        .sum::<f64>()
        / n_class
}
