//! Defines some common functions used in this library.

/// Defines some checker functions.
pub mod checkers;

/// Defines some numerical helpers such as normalization.
pub mod helpers;

/// Defines the binning of a feature.
pub mod binning;

/// Defines some tools for tree algorithms.
pub mod tree;
