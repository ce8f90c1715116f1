use std::collections::HashMap;

use crate::{
    common::{tree::*, binning::*},
    Sample,
};

use super::{
    DecisionTree,
    split_by::*,
};


/// The number of bins set as default.
pub const DEFAULT_NBIN: usize = 255;
/// The maxmial depth set as default.
pub const DEFAULT_MAX_DEPTH: usize = 2;


/// A struct that builds `DecisionTree`.
/// `DecisionTreeBuilder` keeps parameters for constructing `DecisionTree`.
///
/// Pass the whole training sample here,
/// not a balanced subset of it.
/// The bins and the class list are fixed at this point.
///
/// # Example
///
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
/// let weak_learner = DecisionTreeBuilder::new(&sample)
///     .max_depth(2)
///     .split_by(SplitBy::Entropy)
///     .build();
/// ```
#[derive(Clone)]
pub struct DecisionTreeBuilder<'a> {
    sample:       &'a Sample,
    n_bins:       HashMap<&'a str, usize>,
    max_depth:    Depth,
    split_by:     SplitBy,
    max_features: Option<usize>,
}


impl<'a> DecisionTreeBuilder<'a> {
    /// Construct a new instance of [`DecisionTreeBuilder`].
    pub fn new(sample: &'a Sample) -> Self {
        let n_bins = sample.features()
            .iter()
            .map(|feat| {
                let n_bin = feat.distinct_value_count()
                    .clamp(1, DEFAULT_NBIN);
                (feat.name(), n_bin)
            })
            .collect();
        let max_depth = Depth::from(DEFAULT_MAX_DEPTH);
        let split_by = SplitBy::Entropy;

        Self { sample, n_bins, max_depth, split_by, max_features: None, }
    }


    /// Specify the maximal depth of the tree.
    /// Default maximal depth is `2`.
    pub fn max_depth(mut self, depth: usize) -> Self {
        assert!(depth > 0, "Tree must have positive depth");
        self.max_depth = Depth::from(depth);

        self
    }


    /// Set the node splitting rule.
    /// Default value is `SplitBy::Entropy`.
    /// See [`SplitBy`] for other rules.
    #[inline]
    pub fn split_by(mut self, split_by: SplitBy) -> Self {
        self.split_by = split_by;
        self
    }


    /// Examine only `k` features, chosen at random, at each node.
    /// By default, every feature is examined.
    pub fn max_features(mut self, k: usize) -> Self {
        assert!(k > 0, "At least one feature must be examined");
        self.max_features = Some(k);
        self
    }


    /// Set the number of bins to a feature named `name`.
    /// By default, each feature is binned in
    /// `min(255, # of distinct values)` bins.
    pub fn set_nbins<T>(&mut self, name: T, n_bins: usize)
        where T: AsRef<str>
    {
        let name = name.as_ref();
        match self.n_bins.get_mut(name) {
            Some(val) => { *val = n_bins.max(1); },
            None => {
                panic!("The feature named `{name}` does not exist");
            },
        }
    }


    /// Build a `DecisionTree`.
    /// This method consumes `self`.
    pub fn build(self) -> DecisionTree<'a> {
        let bins = self.sample.features()
            .iter()
            .map(|feature| {
                let name = feature.name();
                let n_bins = self.n_bins.get(name)
                    .copied()
                    .unwrap_or(DEFAULT_NBIN);

                (name, Bins::cut(feature, n_bins))
            })
            .collect::<HashMap<_, _>>();

        let classes = self.sample.classes();

        DecisionTree::new(
            bins, classes, self.split_by, self.max_depth, self.max_features,
        )
    }
}
