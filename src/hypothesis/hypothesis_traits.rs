use std::collections::BTreeMap;

use crate::Sample;


/// A trait that defines the behavor of a (multi-class) classifier.
/// You need to implement `classes` and `predict`.
pub trait Classifier {
    /// Returns the class labels this classifier knows,
    /// in ascending order.
    fn classes(&self) -> &[i64];


    /// Predicts the label of the i'th row of the `sample`.
    fn predict(&self, sample: &Sample, row: usize) -> i64;


    /// Predicts the labels of `sample`.
    fn predict_all(&self, sample: &Sample) -> Vec<i64>
    {
        let n_sample = sample.shape().0;
        (0..n_sample).map(|row| self.predict(sample, row))
            .collect::<Vec<_>>()
    }
}


/// A classifier that outputs class probabilities.
pub trait ProbabilisticClassifier: Classifier {
    /// Returns the probability of each class for the i'th row.
    /// The `k`-th entry corresponds to `self.classes()[k]`.
    fn predict_proba(&self, sample: &Sample, row: usize) -> Vec<f64>;


    /// Returns the class probabilities of every row of `sample`.
    fn predict_proba_all(&self, sample: &Sample) -> Vec<Vec<f64>>
    {
        let n_sample = sample.shape().0;
        (0..n_sample)
            .map(|row| self.predict_proba(sample, row))
            .collect::<Vec<_>>()
    }
}


/// A hypothesis that reports how much each feature contributed to it.
pub trait FeatureImportance {
    /// Returns the importance of each feature, keyed by feature name.
    /// The values are non-negative and sum to `1`
    /// unless no feature was used at all.
    fn feature_importances(&self) -> BTreeMap<String, f64>;
}
