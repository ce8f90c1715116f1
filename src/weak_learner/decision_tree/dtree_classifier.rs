//! Defines the decision tree classifier.
use serde::{Serialize, Deserialize};

use std::collections::BTreeMap;

use crate::{
    common::helpers,
    Classifier,
    ProbabilisticClassifier,
    FeatureImportance,
    Sample,
};

use super::node::*;


/// Decision tree classifier.
/// This struct is produced by [`DecisionTree`](super::DecisionTree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    classes:     Vec<i64>,
    root:        Node,
    importances: BTreeMap<String, f64>,
}


impl DecisionTreeClassifier {
    pub(super) fn new(
        classes:     Vec<i64>,
        root:        Box<Node>,
        importances: BTreeMap<String, f64>,
    ) -> Self
    {
        Self { classes, root: *root, importances, }
    }


    /// Returns the number of leaves of the tree.
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }
}


impl Classifier for DecisionTreeClassifier {
    fn classes(&self) -> &[i64] {
        &self.classes[..]
    }


    fn predict(&self, sample: &Sample, row: usize) -> i64 {
        let proba = self.root.proba(sample, row);
        self.classes[helpers::argmax(proba)]
    }
}


impl ProbabilisticClassifier for DecisionTreeClassifier {
    fn predict_proba(&self, sample: &Sample, row: usize) -> Vec<f64> {
        self.root.proba(sample, row).to_vec()
    }
}


impl FeatureImportance for DecisionTreeClassifier {
    fn feature_importances(&self) -> BTreeMap<String, f64> {
        self.importances.clone()
    }
}
