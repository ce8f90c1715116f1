//! Provides the boosting algorithm.

mod core;

// ------------------------------------------------
// Classification
mod rusboost;


/// Booster trait
pub use self::core::Booster;

pub use self::rusboost::{
    RusBoost,
    RusBoostClassifier,
    Halt,
    Algorithm,
    Samme,
    SammeR,
    UpdateRule,
    RoundContext,
    RoundOutcome,
    samme_r_contribution,
};
