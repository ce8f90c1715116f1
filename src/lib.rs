#![warn(missing_docs)]

//!
//! A crate that provides RUSBoost,
//! a boosting algorithm for imbalanced classification.
//!
//! In each round, RUSBoost
//! 1. draws a class-balanced subsample by random under-sampling,
//! 2. fits a weak learner on the subsample, and
//! 3. re-weights the **whole** training sample
//!    by the multi-class AdaBoost rule, SAMME or SAMME.R.
//!
//! The under-sampling keeps every weak learner from ignoring
//! the minority classes,
//! while the re-weighting still sees every training example.
//!
//! # Example
//! ```no_run
//! use rusboost::prelude::*;
//!
//! let sample = SampleReader::default()
//!     .file("/path/to/train.csv")
//!     .has_header(true)
//!     .target_feature("class")
//!     .read()
//!     .unwrap();
//!
//! let tree = DecisionTreeBuilder::new(&sample)
//!     .max_depth(2)
//!     .build();
//! let mut booster = RusBoost::init(&sample)
//!     .n_estimators(50)
//!     .algorithm(Algorithm::SammeR)
//!     .seed(0);
//! let f = booster.run(&tree).unwrap();
//!
//! let loss = zero_one_loss(&sample, &f);
//! println!("training loss: {loss}");
//! ```

pub mod constants;
pub mod error;
pub mod common;
pub mod sample;
pub mod hypothesis;
pub mod weak_learner;
pub mod sampler;
pub mod booster;
pub mod research;
pub mod prelude;

pub use common::{
    binning,
    checkers,
    helpers,
    tree,
};

pub use error::{
    BoostError,
    Result,
};

/// A struct that returns [`Sample`].
/// Using this struct, one can read a CSV/SVMLIGHT format file to [`Sample`].
/// Other formats are not supported yet.
/// # Example
/// The following code is a simple example to read a CSV file.
/// ```no_run
/// use rusboost::SampleReader;
/// let filename = "/path/to/csv/file.csv";
/// let sample = SampleReader::default()
///     .file(filename)
///     .has_header(true)
///     .target_feature("class")
///     .read()
///     .unwrap();
/// ```
pub use sample::{
    SampleReader,
    Sample,
    Feature,
};

pub use hypothesis::{
    Classifier,
    ProbabilisticClassifier,
    FeatureImportance,
};

pub use weak_learner::{
    WeakLearner,
    DecisionTree,
    DecisionTreeBuilder,
    DecisionTreeClassifier,
    SplitBy,
};

pub use sampler::{
    Sampler,
    Resampled,
    SamplerRecord,
    RandomUnderSampler,
    SamplingStrategy,
    Pipeline,
};

pub use booster::{
    Booster,
    RusBoost,
    RusBoostClassifier,
    Halt,
    Algorithm,
    Samme,
    SammeR,
    UpdateRule,
    RoundContext,
    RoundOutcome,
};

pub use research::{
    Research,
    Logger,
    LoggerBuilder,
};
