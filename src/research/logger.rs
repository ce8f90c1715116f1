use colored::Colorize;

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use std::time::Instant;
use std::ops::ControlFlow;

use crate::{
    Booster,
    BoostError,
    Classifier,
    Result,
    Sample,
    WeakLearner,
};
use super::Research;

const WIDTH: usize = 8;
const PREC_WIDTH: usize = 5;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;
const HEADER: &str = "Round,EstimatorWeight,EstimatorError,TrainLoss,TestLoss,Time\n";

/// Struct `Logger` provides a generic function that
/// logs the weight and error of each hypothesis,
/// train/test loss value, and running time
/// for each step of boosting.
/// Construct it by [`LoggerBuilder`](super::LoggerBuilder).
pub struct Logger<'a, B, W, G> {
    pub(super) booster: B,
    pub(super) weak_learner: W,
    pub(super) loss_func: G,
    pub(super) train: &'a Sample,
    pub(super) test: &'a Sample,
    pub(super) time_limit: u128,
    pub(super) round: usize,
}

impl<H, B, W, G, O, S> Logger<'_, B, W, G>
    where B: Booster<H, Output = O> + Research<Output = S>,
          S: Classifier,
          W: WeakLearner<Hypothesis = H>,
          G: Fn(&Sample, &S) -> f64,
{
    #[inline(always)]
    fn print_log_header(&self) {
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
            "".bold().red(),
            "EST.".bold().blue(),
            "EST.".bold().blue(),
            "TRAIN".bold().green(),
            "TEST".bold().yellow(),
            "ACC.".bold().cyan(),
        );
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
            "ROUND".bold().red(),
            "WEIGHT".bold().blue(),
            "ERROR".bold().blue(),
            "LOSS".bold().green(),
            "LOSS".bold().yellow(),
            "TIME".bold().cyan(),
        );
    }

    /// print current settings.
    #[inline(always)]
    fn print_stats(&self) {
        let limit = if self.time_limit != u128::MAX {
            time_format(self.time_limit)
        } else {
            "Nothing".into()
        };
        let header = format!(
            "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
            "", "STATS".bold(), "",
        );
        println!(
            "\n{header}\n\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Booster".bold(),
            self.booster.name().bold().green(),
        );
        if let Some(info) = self.booster.info() {
            println!("{}", format_info(info));
        }

        println!(
            "+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Weak Learner".bold(),
            self.weak_learner.name().bold().green(),
        );
        if let Some(info) = self.weak_learner.info() {
            println!("{}", format_info(info));
        }
        println!(
            "\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}\n\
            {:=^FULL_WIDTH$}\n\
            ",
            "Time Limit".bold(),
            limit.bold().green(),
            "".bold(),
        );
    }

    /// Run the given boosting algorithm with logging.
    /// Note that this method is almost the same as `Booster::run`.
    /// This method measures running time per iteration
    /// and writes one CSV line per kept hypothesis to `filename`.
    /// If the cumulative time exceeds the time limit,
    /// boosting stops after the current round.
    pub fn run<P: AsRef<Path>>(&mut self, filename: P) -> Result<O> {
        // Open file
        let mut file = File::create(filename)?;

        // Write header to the file
        file.write_all(HEADER.as_bytes())?;

        // ---------------------------------------------------------------------
        // Pre-processing
        self.booster.preprocess()?;
        self.print_stats();

        // Cumulative time
        let mut time_acc = 0;
        let mut last = (0f64, 0f64, 0f64, 0f64);

        // ---------------------------------------------------------------------
        // Boosting step
        if self.round != usize::MAX { self.print_log_header(); }
        let flow = (1..).try_for_each(|iter| {
            // Start measuring time
            let now = Instant::now();

            let flow = self.booster.boost(&self.weak_learner, iter);

            // Stop measuring and convert `Duration` to Milliseconds.
            let time = now.elapsed().as_millis();

            // Update the cumulative time
            time_acc += time;

            match flow {
                ControlFlow::Break(Err(_)) => { return flow; },
                // The round `iter` kept nothing.
                ControlFlow::Break(Ok(t)) if t < iter => {
                    if self.round != usize::MAX {
                        let (weight, error, train, test) = last;
                        println!(
                            "{} {}\t\t{}\t{}\t{}\t{}\t{}\n",
                            "[FIN]".bold().bright_green(),
                            format!("{:>WIDTH$}", t).red(),
                            format!("{:>WIDTH$.PREC_WIDTH$}", weight).bold().blue(),
                            format!("{:>WIDTH$.PREC_WIDTH$}", error).bold().blue(),
                            format!("{:>WIDTH$.PREC_WIDTH$}", train).bold().green(),
                            format!("{:>WIDTH$.PREC_WIDTH$}", test).bold().yellow(),
                            time_format(time_acc).bold().cyan(),
                        );
                    }
                    return flow;
                },
                _ => {},
            }

            let f = self.booster.current_hypothesis();
            let (weight, error) = self.booster.last_round()
                .unwrap_or((0f64, 1f64));

            let train = (self.loss_func)(self.train, &f);
            let test = (self.loss_func)(self.test, &f);
            last = (weight, error, train, test);

            // Write the results to `file`.
            let line = format!("{iter},{weight},{error},{train},{test},{time_acc}\n");
            if let Err(e) = file.write_all(line.as_bytes()) {
                return ControlFlow::Break(Err(BoostError::from(e)));
            }

            if time_acc > self.time_limit {
                println!(
                    "{} {}\t\t{}\t{}\t{}\t{}\t{}\n",
                    "[TLE]".bold().bright_red(),
                    format!("{:>WIDTH$}", iter).bold().red(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", weight).bold().blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", error).bold().blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", train).bold().green(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", test).bold().yellow(),
                    time_format(time_acc).bold().cyan(),
                );
                return ControlFlow::Break(Ok(iter));
            }

            if self.round != usize::MAX && iter % self.round == 0 {
                println!(
                    "{} {}\t\t{}\t{}\t{}\t{}\t{}",
                    "[LOG]".bold().magenta(),
                    format!("{:>WIDTH$}", iter).red(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", weight).blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", error).blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", train).green(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", test).yellow(),
                    time_format(time_acc).bold().cyan(),
                );
            }

            if flow.is_break() && self.round != usize::MAX {
                println!(
                    "{} {}\t\t{}\t{}\t{}\t{}\t{}\n",
                    "[FIN]".bold().bright_green(),
                    format!("{:>WIDTH$}", iter).red(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", weight).bold().blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", error).bold().blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", train).bold().green(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", test).bold().yellow(),
                    time_format(time_acc).bold().cyan(),
                );
            }
            flow
        });

        if let ControlFlow::Break(Err(e)) = flow {
            return Err(e);
        }

        let f = self.booster.postprocess();
        Ok(f)
    }
}

fn format_info(info: Vec<(&str, String)>) -> String {
    info.into_iter()
        .map(|(key, val)| {
            format!(
                "    + {:<STAT_WIDTH$}\t{:>width$}",
                key,
                val.bold().yellow(),
                width = STAT_WIDTH - 8
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn time_format(millisec: u128) -> String {
    if millisec < 1_000 {
        return format!("  0.{:0>3}s", millisec);
    }
    let sec = millisec / 1_000;
    let millisec = millisec % 1_000;
    if sec < 60 {
        return format!(" {:0>2}.{:0>3}s", sec, millisec);
    }
    let min = sec / 60;
    let sec = sec % 60;
    if min < 60 {
        return format!(" {:0>2}m {:0>2}s", min, sec);
    }
    let hours = min / 60;
    let min = min % 60;
    format!(" {:0>2}h {:0>2}m", hours, min)
}
