//! Provides `Booster` trait.

use crate::{
    Result,
    WeakLearner,
};

use std::ops::ControlFlow;


/// The trait [`Booster`] defines the standard framework of Boosting.
/// Here, the **standard framework** is defined as
/// a repeated game between **Booster** and **Weak Learner**
/// of the following form:
///
/// In each round `t = 1, 2, ...`,
/// 1. Booster chooses weights over the training instances.
/// 2. Weak Learner chooses a hypothesis that achieves
///    some **accuracy** with respect to the weights.
///
/// # Required Methods
/// - [`Booster::name`]
/// - [`Booster::preprocess`]
/// - [`Booster::boost`]
/// - [`Booster::postprocess`]
/// - [`Booster::info`] ... optional.
///
/// # Provided Methods
/// - [`Booster::run`]
pub trait Booster<H> {
    /// The final hypothesis output by a boosting algorithm.
    type Output;


    /// Returns the name of the boosting algorithm.
    fn name(&self) -> &str;


    /// Returns the information of boosting algorithm as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// A main function that runs boosting algorithm.
    /// Fails if the parameters are invalid
    /// or if a round reports a fatal error.
    fn run<W>(&mut self, weak_learner: &W) -> Result<Self::Output>
        where W: WeakLearner<Hypothesis = H>
    {
        self.preprocess()?;

        let flow = (1..).try_for_each(|iter|
            self.boost(weak_learner, iter)
        );
        if let ControlFlow::Break(Err(e)) = flow {
            return Err(e);
        }

        Ok(self.postprocess())
    }


    /// Pre-processing for `self`.
    /// As you can see in [`Booster::run`],
    /// this method is called before the boosting process.
    /// Every parameter check happens here.
    fn preprocess(&mut self) -> Result<()>;


    /// Boosting step per iteration.
    /// `iteration` starts at `1`.
    /// `Break(Ok(t))` ends the boosting normally,
    /// `Break(Err(e))` aborts it.
    fn boost<W>(
        &mut self,
        weak_learner: &W,
        iteration: usize,
    ) -> ControlFlow<Result<usize>>
        where W: WeakLearner<Hypothesis = H>;


    /// Post-processing.
    fn postprocess(&mut self) -> Self::Output;
}
