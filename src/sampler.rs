//! The files in `sampler/` directory defines
//! `Sampler` trait and the samplers that balance a sample
//! before a weak learner sees it.

/// Provides `Sampler` trait.
pub mod core;

/// Defines the random under-sampler.
pub mod random_under_sampler;

/// Defines the sampler-then-hypothesis view of a boosting round.
pub mod pipeline;

pub use self::core::{
    Sampler,
    Resampled,
    SamplerRecord,
};

pub use self::random_under_sampler::{
    RandomUnderSampler,
    SamplingStrategy,
};

pub use self::pipeline::Pipeline;
