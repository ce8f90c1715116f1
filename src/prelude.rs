//! Exports the boosting algorithm, the weak learner, and the traits.
//!
pub use crate::booster::{
    // Booster trait
    Booster,

    // Classification ---------------------------
    RusBoost,
    RusBoostClassifier,
    Halt,

    // Update rules
    Algorithm,
    Samme,
    SammeR,
    UpdateRule,
};


pub use crate::weak_learner::{
    // Weak Learner trait
    WeakLearner,

    // Decision tree
    DecisionTree,
    DecisionTreeBuilder,
    DecisionTreeClassifier,
    SplitBy,
};


pub use crate::sampler::{
    Sampler,
    RandomUnderSampler,
    SamplingStrategy,
};


pub use crate::hypothesis::{
    Classifier,
    ProbabilisticClassifier,
    FeatureImportance,
};


pub use crate::sample::{
    Sample,
    SampleReader,
};


pub use crate::research::{
    Research,
    LoggerBuilder,
    zero_one_loss,
    balanced_error,
};


pub use crate::error::BoostError;
