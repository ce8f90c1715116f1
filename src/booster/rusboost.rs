//! RUSBoost: AdaBoost (SAMME / SAMME.R) on randomly under-sampled data.

pub mod rusboost_algorithm;
pub mod update_rule;
pub mod ensemble;

pub use rusboost_algorithm::RusBoost;
pub use ensemble::{RusBoostClassifier, Halt};
pub use update_rule::{
    Algorithm,
    Samme,
    SammeR,
    UpdateRule,
    RoundContext,
    RoundOutcome,
    samme_r_contribution,
};
