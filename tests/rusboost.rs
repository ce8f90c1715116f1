use std::cell::Cell;
use std::collections::BTreeMap;
use std::io::BufReader;
use std::ops::ControlFlow;

use rand::prelude::*;
use rand::rngs::StdRng;

use rusboost::prelude::*;


/// Uniform blobs on a line. Class `c` lives around `3c`.
/// `x1` carries no signal.
fn blobs(counts: &[usize], spread: f64, seed: u64) -> Sample {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x0 = Vec::new();
    let mut x1 = Vec::new();
    let mut y = Vec::new();
    for (c, &n) in counts.iter().enumerate() {
        for _ in 0..n {
            x0.push(3f64 * c as f64 + rng.gen_range(-spread..spread));
            x1.push(rng.gen_range(0f64..1f64));
            y.push(c as f64);
        }
    }
    Sample::from_columns([("x0", x0), ("x1", x1)], y).unwrap()
}


/// 40 examples of class `0` far left of 10 examples of class `1`.
fn separable() -> Sample {
    let mut x = (0..40).map(|i| i as f64 * 0.01).collect::<Vec<_>>();
    x.extend((0..10).map(|i| 10f64 + i as f64 * 0.01));
    let mut y = vec![0f64; 40];
    y.extend([1f64; 10]);
    Sample::from_columns([("x", x)], y).unwrap()
}


/// Predicts a fixed label, or the row-wise answers of a table.
#[derive(Debug, Clone)]
struct Scripted {
    classes: Vec<i64>,
    answers: Vec<i64>,
}

impl Classifier for Scripted {
    fn classes(&self) -> &[i64] { &self.classes }
    fn predict(&self, _: &Sample, row: usize) -> i64 {
        self.answers[row]
    }
}

impl ProbabilisticClassifier for Scripted {
    fn predict_proba(&self, sample: &Sample, row: usize) -> Vec<f64> {
        let y = self.predict(sample, row);
        self.classes.iter()
            .map(|&c| if c == y { 1f64 } else { 0f64 })
            .collect()
    }
}


/// Answers with a fixed probability table, one row per example.
#[derive(Debug, Clone)]
struct Soft {
    classes: Vec<i64>,
    proba: Vec<Vec<f64>>,
}

impl Classifier for Soft {
    fn classes(&self) -> &[i64] { &self.classes }
    fn predict(&self, _: &Sample, row: usize) -> i64 {
        let p = &self.proba[row];
        let k = (1..p.len()).fold(0, |k, j| if p[j] > p[k] { j } else { k });
        self.classes[k]
    }
}

impl ProbabilisticClassifier for Soft {
    fn predict_proba(&self, _: &Sample, row: usize) -> Vec<f64> {
        self.proba[row].clone()
    }
}


/// Hands out the scripted hypotheses in order,
/// repeating the last one.
struct ScriptedLearner<H = Scripted> {
    script: Vec<H>,
    calls: Cell<usize>,
}

impl<H> ScriptedLearner<H> {
    fn new(script: Vec<H>) -> Self {
        Self { script, calls: Cell::new(0) }
    }
}

impl<H: Clone> WeakLearner for ScriptedLearner<H> {
    type Hypothesis = H;

    fn name(&self) -> &str {
        "Scripted"
    }

    fn produce(&self, _: &Sample, _: &[f64], _: u64) -> H {
        let t = self.calls.get();
        self.calls.set(t + 1);
        let k = t.min(self.script.len() - 1);
        self.script[k].clone()
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}


/// Tests for `RusBoost`.
#[cfg(test)]
pub mod tests {
    use super::*;

    const TEST_TOLERANCE: f64 = 1e-9;

    #[test]
    fn three_balanced_classes_discrete() {
        init_logger();
        let sample = blobs(&[100, 100, 100], 2.5, 0);
        let tree = DecisionTreeBuilder::new(&sample)
            .max_depth(2)
            .build();
        let mut booster = RusBoost::init(&sample)
            .n_estimators(10)
            .algorithm(Algorithm::Samme)
            .seed(0);

        let f = booster.run(&tree).unwrap();

        assert_eq!(f.len(), 10);
        assert_eq!(f.halt(), Halt::Completed);
        assert_eq!(f.algorithm(), Algorithm::Samme);
        assert_eq!(f.classes(), &[0, 1, 2]);
        for (&w, &e) in f.estimator_weights().iter().zip(f.estimator_errors()) {
            assert!(w.is_finite() && w > 0f64, "got weight {w}.");
            assert!(e.is_finite() && e < 2f64 / 3f64, "got error {e}.");
        }

        let loss = zero_one_loss(&sample, &f);
        assert!(loss < 0.5, "training loss is too large: {loss}.");

        let n_sample = sample.shape().0;
        for row in (0..n_sample).step_by(7) {
            let p = f.predict_proba(&sample, row);
            let sum = p.iter().sum::<f64>();
            assert!((sum - 1f64).abs() < TEST_TOLERANCE, "expected 1, got {sum}.");
            assert!(p.iter().all(|pi| pi.is_finite()), "got {p:?}.");
        }
    }

    #[test]
    fn perfect_first_learner() {
        init_logger();
        let sample = separable();
        let tree = DecisionTreeBuilder::new(&sample).build();

        for algorithm in [Algorithm::Samme, Algorithm::SammeR] {
            let mut booster = RusBoost::init(&sample)
                .n_estimators(20)
                .algorithm(algorithm)
                .seed(1);
            let f = booster.run(&tree).unwrap();

            assert_eq!(f.len(), 1, "{algorithm}: expected a single hypothesis");
            assert_eq!(f.halt(), Halt::Perfect);
            assert_eq!(f.estimator_weights(), &[1f64]);
            assert_eq!(f.estimator_errors(), &[0f64]);
            assert_eq!(f.predict_all(&sample), sample.labels());

            // The balanced subsample has 10 rows per class.
            let record = &f.samplers()[0];
            assert_eq!(record.sample_indices.len(), 20);
        }
    }

    #[test]
    fn first_learner_worse_than_random_fails() {
        init_logger();
        let sample = separable();
        let n_sample = sample.shape().0;
        let wrong = Scripted {
            classes: vec![0, 1],
            answers: sample.labels().into_iter().map(|y| 1 - y).collect(),
        };
        assert_eq!(wrong.answers.len(), n_sample);

        let learner = ScriptedLearner::new(vec![wrong.clone()]);
        let mut booster = RusBoost::init(&sample)
            .algorithm(Algorithm::Samme)
            .seed(0);
        let res = booster.run(&learner);
        assert!(
            matches!(res, Err(BoostError::WorseThanRandom { .. })),
            "expected WorseThanRandom, got {:?}", res.map(|f| f.len()),
        );

        // The same with the discrete rule plugged in directly.
        let learner = ScriptedLearner::new(vec![wrong]);
        let mut booster = RusBoost::init(&sample)
            .update_rule(Samme)
            .seed(0);
        let res = booster.run(&learner);
        assert!(matches!(res, Err(BoostError::WorseThanRandom { .. })));
    }

    #[test]
    fn late_worse_than_random_learner_is_dropped() {
        init_logger();
        let sample = separable();
        let labels = sample.labels();

        // One mistake, then everything wrong.
        let mut answers = labels.clone();
        answers[0] = 1;
        let good = Scripted { classes: vec![0, 1], answers };
        let wrong = Scripted {
            classes: vec![0, 1],
            answers: labels.iter().map(|y| 1 - y).collect(),
        };

        let learner = ScriptedLearner::new(vec![good, wrong]);
        let mut booster = RusBoost::init(&sample)
            .n_estimators(10)
            .update_rule(Samme)
            .seed(0);
        let f = booster.run(&learner).unwrap();

        assert_eq!(f.len(), 1);
        assert_eq!(f.halt(), Halt::WorseThanRandom);
        assert_eq!(f.estimator_weights().len(), 1);
        let e = f.estimator_errors()[0];
        assert!((e - 1f64 / 50f64).abs() < TEST_TOLERANCE, "expected 0.02, got {e}.");
        assert_eq!(learner.calls.get(), 2);
    }

    #[test]
    fn huge_learning_rate_halts_on_overflowing_weights() {
        init_logger();
        let sample = blobs(&[60, 60, 60], 2.0, 3);
        let tree = DecisionTreeBuilder::new(&sample)
            .max_depth(2)
            .build();
        // The learner weight exceeds `ln(f64::MAX)`,
        // so the misclassified rows get infinite weight.
        let mut booster = RusBoost::init(&sample)
            .n_estimators(5)
            .learning_rate(1000f64)
            .algorithm(Algorithm::Samme)
            .seed(0);

        let f = booster.run(&tree).unwrap();

        assert_eq!(f.halt(), Halt::Degenerate);
        assert_eq!(f.len(), 1);
        let w = f.estimator_weights()[0];
        let e = f.estimator_errors()[0];
        assert!(w.is_finite() && w > 0f64, "got weight {w}.");
        assert!(e > 0f64 && e < 2f64 / 3f64, "got error {e}.");

        let n_sample = sample.shape().0;
        for row in (0..n_sample).step_by(11) {
            let p = f.predict_proba(&sample, row);
            let sum = p.iter().sum::<f64>();
            assert!((sum - 1f64).abs() < TEST_TOLERANCE, "expected 1, got {sum}.");
            assert_eq!(f.predict(&sample, row), f.hypotheses()[0].predict(&sample, row));
        }
    }

    #[test]
    fn underflowing_weights_keep_the_first_learner() {
        init_logger();
        let sample = blobs(&[20, 20, 20], 0.5, 4);
        let n_sample = sample.shape().0;

        // Confident on every row. Row 0 (class 0) is called class 1,
        // but class 2 gets almost nothing there,
        // so its real-valued update is negative as well.
        let mut proba = sample.labels()
            .into_iter()
            .map(|y| {
                (0..3).map(|c| if c == y { 1f64 } else { 0f64 })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        proba[0] = vec![0.4, 0.6, 0.0];
        let soft = Soft { classes: vec![0, 1, 2], proba };
        let learner = ScriptedLearner::new(vec![soft]);

        let mut booster = RusBoost::init(&sample)
            .n_estimators(5)
            .learning_rate(100f64)
            .seed(0);
        let f = booster.run(&learner).unwrap();

        assert_eq!(learner.calls.get(), 1);
        assert_eq!(f.halt(), Halt::Degenerate);
        assert_eq!(f.len(), 1);
        assert_eq!(f.algorithm(), Algorithm::SammeR);
        assert_eq!(f.estimator_weights(), &[1f64]);

        // Uniform initial weights, one mistake.
        let e = f.estimator_errors()[0];
        let expected = 1f64 / n_sample as f64;
        assert!((e - expected).abs() < TEST_TOLERANCE, "expected {expected}, got {e}.");
        let loss = zero_one_loss(&sample, &f.hypotheses()[0]);
        assert!((e - loss).abs() < TEST_TOLERANCE, "expected {loss}, got {e}.");

        assert!(booster.distribution().iter().all(|&w| w == 0f64));
        assert_eq!(f.predict(&sample, 0), 1);
    }

    #[test]
    fn invalid_parameters_fail_before_boosting() {
        let sample = separable();
        let learner = ScriptedLearner::new(vec![Scripted {
            classes: vec![0, 1],
            answers: sample.labels(),
        }]);

        let mut booster = RusBoost::init(&sample).learning_rate(0f64);
        let res = booster.run(&learner);
        assert!(matches!(
            res,
            Err(BoostError::Parameter { name: "learning_rate", .. })
        ));

        let mut booster = RusBoost::init(&sample).n_estimators(0);
        let res = booster.run(&learner);
        assert!(matches!(
            res,
            Err(BoostError::Parameter { name: "n_estimators", .. })
        ));

        // Class 1 has only 10 examples.
        let counts = BTreeMap::from([(1, 11)]);
        let sampler = RandomUnderSampler::new()
            .sampling_strategy(SamplingStrategy::Counts(counts));
        let mut booster = RusBoost::init(&sample).sampler(sampler);
        let res = booster.run(&learner);
        assert!(matches!(
            res,
            Err(BoostError::Parameter { name: "sampling_strategy", .. })
        ));

        assert_eq!(learner.calls.get(), 0, "no round may run");
    }

    #[test]
    fn sample_weight_validation() {
        let sample = separable();
        let n_sample = sample.shape().0;
        let tree = DecisionTreeBuilder::new(&sample).build();

        let bad = [
            vec![1f64; n_sample - 1],
            vec![0f64; n_sample],
            {
                let mut w = vec![1f64; n_sample];
                w[3] = -1f64;
                w
            },
            {
                let mut w = vec![1f64; n_sample];
                w[3] = f64::NAN;
                w
            },
        ];
        for weights in bad {
            let mut booster = RusBoost::init(&sample).sample_weight(weights);
            let res = booster.run(&tree);
            assert!(matches!(
                res,
                Err(BoostError::Parameter { name: "sample_weight", .. })
            ));
        }

        // Zero entries are fine as long as the sum is positive.
        let mut weights = vec![2f64; n_sample];
        weights[0] = 0f64;
        let mut booster = RusBoost::init(&sample)
            .sample_weight(weights)
            .seed(0);
        assert!(booster.run(&tree).is_ok());
    }

    #[test]
    fn same_seed_same_ensemble() {
        let sample = blobs(&[80, 25, 10], 2.0, 3);
        let tree = DecisionTreeBuilder::new(&sample)
            .max_depth(2)
            .build();

        let run = || {
            let mut booster = RusBoost::init(&sample)
                .n_estimators(10)
                .seed(7);
            booster.run(&tree).unwrap()
        };
        let f = run();
        let g = run();

        assert_eq!(f.len(), g.len());
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(f.estimator_weights()), bits(g.estimator_weights()));
        assert_eq!(bits(f.estimator_errors()), bits(g.estimator_errors()));
        assert_eq!(f.samplers(), g.samplers());
    }

    #[test]
    fn singleton_class_real() {
        init_logger();
        let sample = blobs(&[50, 20, 1], 6.0, 1);
        let tree = DecisionTreeBuilder::new(&sample)
            .max_depth(2)
            .build();
        let mut booster = RusBoost::init(&sample)
            .n_estimators(10)
            .algorithm(Algorithm::SammeR)
            .seed(2);

        let f = booster.run(&tree).unwrap();

        assert_eq!(f.len(), 10);
        assert_eq!(f.halt(), Halt::Completed);
        assert!(f.estimator_weights().iter().all(|&w| w == 1f64));
        assert!(f.estimator_errors().iter().all(|e| e.is_finite()));
        for record in f.samplers() {
            // One row per class.
            assert_eq!(record.sample_indices.len(), 3);
        }

        let n_sample = sample.shape().0;
        for row in 0..n_sample {
            let p = f.predict_proba(&sample, row);
            let sum = p.iter().sum::<f64>();
            assert!((sum - 1f64).abs() < TEST_TOLERANCE, "expected 1, got {sum}.");
        }
    }

    #[test]
    fn intermediate_distributions_sum_to_one() {
        let sample = blobs(&[60, 30, 15], 2.0, 4);
        let tree = DecisionTreeBuilder::new(&sample).build();
        let n_estimators = 6;
        let mut booster: RusBoost<'_, DecisionTreeClassifier> =
            RusBoost::init(&sample)
                .n_estimators(n_estimators)
                .seed(5);

        booster.preprocess().unwrap();
        for iter in 1..=n_estimators {
            let flow = booster.boost(&tree, iter);
            if flow.is_break() { break; }
            let sum = booster.distribution().iter().sum::<f64>();
            if iter < n_estimators {
                assert!((sum - 1f64).abs() < TEST_TOLERANCE, "expected 1, got {sum}.");
            }
            let (weight, error) = booster.last_round().unwrap();
            assert_eq!(weight, 1f64);
            assert!((0f64..=1f64).contains(&error), "got {error}.");
        }
        assert!(matches!(
            booster.boost(&tree, n_estimators + 1),
            ControlFlow::Break(Ok(_))
        ));
    }

    #[test]
    fn staged_and_importances() {
        let sample = blobs(&[60, 30, 15], 2.0, 6);
        let tree = DecisionTreeBuilder::new(&sample).build();
        let mut booster = RusBoost::init(&sample)
            .n_estimators(8)
            .algorithm(Algorithm::Samme)
            .seed(9);
        let f = booster.run(&tree).unwrap();

        for row in [0, 30, 70, 100] {
            let staged = f.staged_predict(&sample, row);
            assert_eq!(staged.len(), f.len());
            assert_eq!(staged.last().copied(), Some(f.predict(&sample, row)));
        }

        let imp = f.feature_importances();
        let sum = imp.values().sum::<f64>();
        assert!((sum - 1f64).abs() < TEST_TOLERANCE, "expected 1, got {sum}.");
        assert!(imp["x0"] > imp["x1"], "got {imp:?}.");

        let pipelines = f.pipelines();
        assert_eq!(pipelines.len(), f.len());
        let row = 5;
        assert_eq!(
            pipelines[0].predict(&sample, row),
            f.hypotheses()[0].predict(&sample, row),
        );
    }

    #[test]
    fn json_round_trip_keeps_predictions() {
        let sample = blobs(&[40, 20, 10], 2.0, 8);
        let tree = DecisionTreeBuilder::new(&sample).build();
        let mut booster = RusBoost::init(&sample)
            .n_estimators(5)
            .seed(1);
        let f = booster.run(&tree).unwrap();

        let json = f.to_json().unwrap();
        let g = RusBoostClassifier::<DecisionTreeClassifier>::from_json(&json)
            .unwrap();

        assert_eq!(g.len(), f.len());
        assert_eq!(g.halt(), f.halt());
        assert_eq!(g.predict_all(&sample), f.predict_all(&sample));
        let n_sample = sample.shape().0;
        for row in 0..n_sample {
            let p = f.predict_proba(&sample, row);
            let q = g.predict_proba(&sample, row);
            for (a, b) in p.iter().zip(q) {
                assert!((a - b).abs() < TEST_TOLERANCE, "expected {a}, got {b}.");
            }
        }
    }

    #[test]
    fn csv_sample_end_to_end() {
        let csv = b"\
            x,z,class\n\
            0.1,1.0,0\n\
            0.2,0.0,0\n\
            0.3,1.0,0\n\
            0.4,0.0,0\n\
            0.5,1.0,0\n\
            0.6,0.0,0\n\
            2.1,1.0,1\n\
            2.2,0.0,1\n\
            ";
        let sample = Sample::from_reader(BufReader::new(&csv[..]), true)
            .unwrap()
            .set_target("class")
            .unwrap();
        let tree = DecisionTreeBuilder::new(&sample)
            .split_by(SplitBy::Gini)
            .build();
        let mut booster = RusBoost::init(&sample)
            .sampler(
                RandomUnderSampler::new()
                    .sampling_strategy(SamplingStrategy::Majority)
            )
            .seed(3);
        let f = booster.run(&tree).unwrap();

        assert_eq!(f.halt(), Halt::Perfect);
        assert_eq!(f.predict_all(&sample), vec![0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn logger_writes_one_line_per_hypothesis() {
        let train = blobs(&[60, 20, 10], 2.0, 10);
        let test = blobs(&[30, 10, 5], 2.0, 11);
        let tree = DecisionTreeBuilder::new(&train).build();
        let booster = RusBoost::init(&train)
            .n_estimators(5)
            .seed(0);

        let loss = |sample: &Sample, f: &RusBoostClassifier<DecisionTreeClassifier>| {
            balanced_error(sample, f)
        };
        let mut logger = LoggerBuilder::new()
            .booster(booster)
            .weak_learner(tree)
            .train_sample(&train)
            .test_sample(&test)
            .loss_function(loss)
            .print_every(1)
            .build()
            .unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("rusboost-logger-{}.csv", std::process::id()));
        let f = logger.run(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("Round,EstimatorWeight,EstimatorError,TrainLoss,TestLoss,Time")
        );
        assert_eq!(lines.count(), f.len());
    }

    #[test]
    fn logger_builder_requires_components() {
        let sample = separable();
        let booster: RusBoost<'_, DecisionTreeClassifier> = RusBoost::init(&sample);
        type Loss = fn(&Sample, &RusBoostClassifier<DecisionTreeClassifier>) -> f64;
        let builder: LoggerBuilder<'_, _, DecisionTree<'_>, Loss> =
            LoggerBuilder::new();
        let res = builder
            .booster(booster)
            .train_sample(&sample)
            .build();
        assert!(matches!(
            res,
            Err(BoostError::Parameter { name: "weak_learner", .. })
        ));
    }
}
