use rand::prelude::*;
use rand::rngs::StdRng;

use std::fmt;
use std::collections::{BTreeMap, HashMap};

use crate::{
    common::{tree::*, binning::*},
    Sample,
    WeakLearner,
};

use super::{
    split_by::SplitBy,
    node::*,
    dtree_classifier::DecisionTreeClassifier,
};


/// The Decision Tree algorithm.
/// Given a set of training examples for classification
/// and a weight vector over the set,
/// [`DecisionTree`] outputs a decision tree classifier
/// named [`DecisionTreeClassifier`]
/// under the specified parameters.
///
/// The code is based on the book:
/// [Classification and Regression Trees](https://www.amazon.com/Classification-Regression-Wadsworth-Statistics-Probability/dp/0412048418)
/// by Leo Breiman, Jerome H. Friedman, Richard A. Olshen, and Charles J. Stone.
///
/// [`DecisionTree`] is constructed
/// by [`DecisionTreeBuilder`](super::DecisionTreeBuilder).
/// The bins and the class list are taken from the sample given to the builder,
/// so the trees produced on any subset of it share them.
///
/// # Example
/// ```no_run
/// use rusboost::prelude::*;
///
/// // Read the training data from the CSV file.
/// let file = "/path/to/data/file.csv";
/// let sample = SampleReader::default()
///     .file(file)
///     .has_header(true)
///     .target_feature("class")
///     .read()
///     .unwrap();
///
/// // Get an instance of decision tree weak learner.
/// // In this example, the output tree is at most depth 2.
/// let tree = DecisionTreeBuilder::new(&sample)
///     .max_depth(2)
///     .split_by(SplitBy::Entropy)
///     .build();
///
/// let n_sample = sample.shape().0;
/// let dist = vec![1f64 / n_sample as f64; n_sample];
/// let f = tree.produce(&sample, &dist, 0);
///
/// let predictions = f.predict_all(&sample);
///
/// let loss = sample.labels()
///     .into_iter()
///     .zip(predictions)
///     .map(|(ty, py)| if ty == py { 0f64 } else { 1f64 })
///     .sum::<f64>()
///     / n_sample as f64;
/// println!("loss (train) is: {loss}");
/// ```
pub struct DecisionTree<'a> {
    bins:         HashMap<&'a str, Bins>,
    classes:      Vec<i64>,
    split_by:     SplitBy,
    max_depth:    Depth,
    max_features: Option<usize>,
}


impl<'a> DecisionTree<'a> {
    /// Initialize [`DecisionTree`].
    /// This method is called only via `DecisionTreeBuilder::build`.
    #[inline]
    pub(super) fn new(
        bins:         HashMap<&'a str, Bins>,
        classes:      Vec<i64>,
        split_by:     SplitBy,
        max_depth:    Depth,
        max_features: Option<usize>,
    ) -> Self
    {
        Self { bins, classes, split_by, max_depth, max_features, }
    }


    /// Returns the class labels the trees predict.
    pub fn classes(&self) -> &[i64] {
        &self.classes[..]
    }


    /// Returns the indices of the features examined at a node.
    fn candidates(&self, n_feature: usize, rng: &mut StdRng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k < n_feature => {
                let mut ix = rand::seq::index::sample(rng, n_feature, k)
                    .into_vec();
                ix.sort_unstable();
                ix
            },
            _ => (0..n_feature).collect(),
        }
    }


    /// Grows a tree of depth at most `depth` on the rows `indices`.
    #[allow(clippy::too_many_arguments)]
    fn grow(
        &self,
        sample:      &Sample,
        labels:      &[usize],
        dist:        &[f64],
        indices:     Vec<usize>,
        depth:       Depth,
        rng:         &mut StdRng,
        importances: &mut BTreeMap<String, f64>,
    ) -> Box<Node>
    {
        let n_class = self.classes.len();
        let mut weights = vec![0f64; n_class];
        for &i in &indices {
            weights[labels[i]] += dist[i];
        }
        let total = weights.iter().sum::<f64>();
        let impurity = self.split_by.impurity(&weights);

        if impurity <= 0f64 || depth == 0 {
            return Box::new(Node::leaf(&weights));
        }

        let n_feature = sample.shape().1;
        let candidates = self.candidates(n_feature, rng);
        let best = self.split_by.best_split(
            &self.bins, sample, labels, dist, &indices[..], n_class, &candidates,
        );
        let Some(best) = best else {
            return Box::new(Node::leaf(&weights));
        };

        let rule = Splitter::new(best.feature, best.threshold);

        // Split the train data for left/right childrens
        let mut lindices = Vec::new();
        let mut rindices = Vec::new();
        for i in indices {
            match rule.split(sample, i) {
                LeftRight::Left  => { lindices.push(i); },
                LeftRight::Right => { rindices.push(i); },
            }
        }

        // If the split has no meaning, construct a leaf node.
        if lindices.is_empty() || rindices.is_empty() {
            return Box::new(Node::leaf(&weights));
        }

        if let Some(imp) = importances.get_mut(best.feature) {
            *imp += (total * (impurity - best.score)).max(0f64);
        }

        let depth = depth - 1;
        let left  = self.grow(
            sample, labels, dist, lindices, depth, rng, importances
        );
        let right = self.grow(
            sample, labels, dist, rindices, depth, rng, importances
        );

        Box::new(Node::branch(rule, left, right, &weights))
    }
}


impl WeakLearner for DecisionTree<'_> {
    type Hypothesis = DecisionTreeClassifier;


    fn name(&self) -> &str {
        "Decision Tree"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let n_bins = self.bins.values()
            .map(|bin| bin.len())
            .reduce(usize::max)
            .unwrap_or(0);
        let max_features = self.max_features
            .map(|k| k.to_string())
            .unwrap_or_else(|| "all".to_string());
        let info = Vec::from([
            ("# of bins (max)", format!("{n_bins}")),
            ("Max depth", format!("{}", self.max_depth)),
            ("Split by", format!("{}", self.split_by)),
            ("Max features", max_features),
        ]);
        Some(info)
    }


    /// Rows with zero weight do not take part in the growth.
    /// If every weight is zero, all rows are used with unit weight.
    #[inline]
    fn produce(&self, sample: &Sample, dist: &[f64], seed: u64)
        -> Self::Hypothesis
    {
        let n_sample = sample.shape().0;
        assert!(n_sample > 0, "cannot grow a tree on an empty sample");
        assert_eq!(
            dist.len(), n_sample,
            "the weight vector has {} entries for {n_sample} examples",
            dist.len(),
        );

        let labels = sample.labels()
            .into_iter()
            .map(|y| {
                self.classes.binary_search(&y)
                    .unwrap_or_else(|_| panic!(
                        "label {y} is not one of the classes {:?}",
                        self.classes
                    ))
            })
            .collect::<Vec<usize>>();

        let indices = (0..n_sample).filter(|&i| dist[i] > 0f64)
            .collect::<Vec<usize>>();

        let unit;
        let (dist, indices) = if indices.is_empty() {
            unit = vec![1f64; n_sample];
            (&unit[..], (0..n_sample).collect())
        } else {
            (dist, indices)
        };

        let mut importances = sample.features()
            .iter()
            .map(|feat| (feat.name().to_string(), 0f64))
            .collect::<BTreeMap<_, _>>();
        let mut rng = StdRng::seed_from_u64(seed);

        let root = self.grow(
            sample,
            &labels[..],
            dist,
            indices,
            self.max_depth,
            &mut rng,
            &mut importances,
        );

        let z = importances.values().sum::<f64>();
        if z > 0f64 {
            importances.values_mut().for_each(|v| { *v /= z; });
        }

        DecisionTreeClassifier::new(self.classes.clone(), root, importances)
    }
}


impl fmt::Display for DecisionTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\
            ----------\n\
            # Decision Tree Weak Learner\n\n\
            - Max depth: {}\n\
            - Split by: {}\n\
            - Classes: {:?}\n\
            - Bins:\
            ",
            self.max_depth,
            self.split_by,
            self.classes,
        )?;

        let width = self.bins.keys()
            .map(|key| key.len())
            .max()
            .unwrap_or(0);
        let max_bin_width = self.bins.values()
            .map(|bin| bin.len().max(1).ilog10() as usize)
            .max()
            .unwrap_or(0)
            + 1;
        let mut names = self.bins.keys().collect::<Vec<_>>();
        names.sort();
        for feat_name in names {
            let feat_bins = &self.bins[feat_name];
            let n_bins = feat_bins.len();
            writeln!(
                f,
                "\
                \t* [{feat_name: <width$} | \
                {n_bins: >max_bin_width$} bins]  \
                {feat_bins}\
                "
            )?;
        }

        write!(f, "----------")
    }
}
