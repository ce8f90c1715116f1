//! The files in `weak_learner/` directory defines
//! `WeakLearner` trait and weak learners.

/// Provides WeakLearner trait.
pub mod core;

/// Defines Decision Tree.
pub mod decision_tree;

pub use self::core::WeakLearner;

pub use self::decision_tree::{
    DecisionTree,
    DecisionTreeBuilder,
    DecisionTreeClassifier,
    SplitBy,
};
