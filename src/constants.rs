//! Constants shared across the crate.

/// Tolerance used when checking that a distribution sums to `1`.
pub const SIMPLEX_TOLERANCE: f64 = 1e-5;

/// A small value used to widen a degenerate bin.
pub const PERTURBATION: f64 = 1e-10;

/// Initial capacity of a feature column.
pub const BUFFER_SIZE: usize = 256;

/// The number of bins printed before eliding the rest.
pub const PRINT_WIDTH_BINNING: usize = 3;

/// Default number of boosting rounds.
pub const DEFAULT_N_ESTIMATORS: usize = 50;

/// Default shrinkage applied to each learner weight.
pub const DEFAULT_LEARNING_RATE: f64 = 1.0;
