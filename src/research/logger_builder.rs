use crate::{
    BoostError,
    Result,
    Sample,
};
use super::Logger;

const DEFAULT_ROUND: usize = 100;
const DEFAULT_TIMELIMIT_MILLIS: u128 = u128::MAX;


/// `LoggerBuilder` is a struct to construct `Logger.`
/// You need to specify the followings:
///
/// - Booster (Boosting algorithm),
/// - Weak Learner,
/// - Loss function,
/// - Training examples,
/// - Test examples,
/// - Time limit for force quit, and
/// - Round (The log text is shown for every **round** you specified).
///
/// # Example
/// ```no_run
/// use rusboost::prelude::*;
///
/// let has_header = true;
/// let train = Sample::from_csv("/path/to/train.csv", has_header)
///     .expect("Failed to read the training sample")
///     .set_target("class")
///     .unwrap();
/// let test = Sample::from_csv("/path/to/test.csv", has_header)
///     .expect("Failed to read the test sample")
///     .set_target("class")
///     .unwrap();
///
/// let booster = RusBoost::init(&train)
///     .n_estimators(100)
///     .seed(0);
///
/// let tree = DecisionTreeBuilder::new(&train)
///     .max_depth(2)
///     .build();
///
/// let mut logger = LoggerBuilder::new()
///     .booster(booster)
///     .weak_learner(tree)
///     .train_sample(&train)
///     .test_sample(&test)
///     .loss_function(|sample: &Sample, f: &RusBoostClassifier<DecisionTreeClassifier>| {
///         balanced_error(sample, f)
///     })
///     .time_limit_as_secs(300)
///     .print_every(10)
///     .build()
///     .unwrap();
///
/// let file = "output.csv";
/// let f = logger.run(file)
///     .expect("Failed to run the boosting algorithm");
/// ```
pub struct LoggerBuilder<'a, B, W, G> {
    booster: Option<B>,
    weak_learner: Option<W>,
    loss_func: Option<G>,
    train: Option<&'a Sample>,
    test: Option<&'a Sample>,
    time_limit: u128,
    round: usize,
}


impl<B, W, G> Default for LoggerBuilder<'_, B, W, G> {
    fn default() -> Self {
        Self::new()
    }
}


impl<'a, B, W, G> LoggerBuilder<'a, B, W, G> {
    /// Construct a new instance of `LoggerBuilder.`
    pub fn new() -> Self {
        Self {
            booster: None,
            weak_learner: None,
            loss_func: None,
            train: None,
            test: None,
            time_limit: DEFAULT_TIMELIMIT_MILLIS,
            round: DEFAULT_ROUND,
        }
    }


    /// Set the boosting algorithm.
    pub fn booster(mut self, booster: B) -> Self {
        self.booster = Some(booster);
        self
    }


    /// Set the weak learner.
    pub fn weak_learner(mut self, weak_learner: W) -> Self {
        self.weak_learner = Some(weak_learner);
        self
    }


    /// Set the loss function.
    pub fn loss_function(mut self, loss_func: G) -> Self {
        self.loss_func = Some(loss_func);
        self
    }


    /// Set the training sample.
    pub fn train_sample(mut self, train: &'a Sample) -> Self {
        self.train = Some(train);
        self
    }


    /// Set the test sample.
    pub fn test_sample(mut self, test: &'a Sample) -> Self {
        self.test = Some(test);
        self
    }


    /// Set the time limit for boosting algorithm as milliseconds.
    /// If the boosting algorithm reaches this limit,
    /// breaks immediately.
    #[inline(always)]
    pub fn time_limit_as_millis(mut self, time_limit: u128) -> Self {
        self.time_limit = time_limit;
        self
    }


    /// Set the time limit for boosting algorithm as seconds.
    /// If the boosting algorithm reaches this limit,
    /// breaks immediately.
    #[inline(always)]
    pub fn time_limit_as_secs(mut self, time_limit: u64) -> Self {
        self.time_limit = (time_limit as u128).saturating_mul(1_000_u128);
        self
    }


    /// Set the time limit for boosting algorithm as minutes.
    /// If the boosting algorithm reaches this limit,
    /// breaks immediately.
    #[inline(always)]
    pub fn time_limit_as_mins(mut self, time_limit: u64) -> Self {
        self.time_limit = (time_limit as u128).saturating_mul(60_000_u128);
        self
    }


    /// Set the interval to print the current status.
    /// By default, the method `run` prints its status every `100` rounds.
    /// If you don't want to print the log,
    /// set `usize::MAX`.
    #[inline(always)]
    pub fn print_every(mut self, round: usize) -> Self {
        self.round = round.max(1);
        self
    }


    /// Build [`Logger`] from the given components.
    /// Fails if a component is missing.
    /// If no test sample is given, the training sample is used.
    pub fn build(self) -> Result<Logger<'a, B, W, G>> {
        let booster = self.booster
            .ok_or_else(|| missing("booster"))?;
        let weak_learner = self.weak_learner
            .ok_or_else(|| missing("weak_learner"))?;
        let loss_func = self.loss_func
            .ok_or_else(|| missing("loss_function"))?;
        let train = self.train
            .ok_or_else(|| missing("train_sample"))?;
        let test = self.test.unwrap_or(train);

        Ok(Logger {
            booster,
            weak_learner,
            loss_func,
            train,
            test,
            time_limit: self.time_limit,
            round: self.round,
        })
    }
}


fn missing(name: &'static str) -> BoostError {
    BoostError::parameter(name, "is not specified")
}
