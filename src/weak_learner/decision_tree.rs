//! A simple, multi-class decision tree algorithm.

/// Defines the builder of `DecisionTree`.
pub mod builder;
/// Defines the decision tree weak learner.
pub mod dtree;
/// Defines the classifier produced by `DecisionTree`.
pub mod dtree_classifier;
/// Defines the splitting criteria.
pub mod split_by;

/// Defines the inner representations of `DecisionTreeClassifier`.
mod node;


pub use builder::DecisionTreeBuilder;
pub use dtree::DecisionTree;
pub use dtree_classifier::DecisionTreeClassifier;
pub use split_by::SplitBy;
