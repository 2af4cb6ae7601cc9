use crate::generator::generate_period_grid;
use backtester::Tester;
use configuration::StrategySettings;
use core_types::{MaPeriods, StrategyId};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use strategies::create_strategy;
use uuid::Uuid;

pub mod error;
pub mod generator;
pub mod report;

pub use error::LearnerError;
pub use report::{Best, Estimation, LearnReport, Outcome};

/// Brute-force search over moving-average window pairs.
///
/// The learner never fetches data. It borrows a `Tester` whose cache is already
/// populated and evaluates a freshly built strategy for every grid cell.
pub struct Learner<'a> {
    job_id: Uuid,
    tester: &'a Tester,
    strategy_id: StrategyId,
    settings: StrategySettings,
    step: usize,
    limit: usize,
    show_progress: bool,
}

impl<'a> Learner<'a> {
    pub fn new(
        tester: &'a Tester,
        strategy_id: StrategyId,
        settings: StrategySettings,
        step: usize,
        limit: usize,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            tester,
            strategy_id,
            settings,
            step,
            limit,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Evaluates the grid one cell at a time, in grid order.
    pub fn learn(&self) -> Result<LearnReport, LearnerError> {
        let grid = generate_period_grid(self.step, self.limit)?;
        let progress_bar = self.progress_bar(grid.len())?;
        tracing::info!(job_id = %self.job_id, strategy = %self.strategy_id, cells = grid.len(), "Starting grid search");

        let estimations = grid
            .iter()
            .map(|&periods| {
                let estimation = self.evaluate(periods);
                progress_bar.inc(1);
                estimation
            })
            .collect();

        progress_bar.finish_with_message("Grid search complete.");
        Ok(self.report(estimations))
    }

    /// Evaluates the grid on the rayon thread pool.
    ///
    /// Each cell builds its own strategy, so workers share nothing mutable. The result
    /// is identical to `learn`, including estimation order.
    pub fn learn_parallel(&self) -> Result<LearnReport, LearnerError> {
        let grid = generate_period_grid(self.step, self.limit)?;
        let progress_bar = self.progress_bar(grid.len())?;
        tracing::info!(
            job_id = %self.job_id,
            strategy = %self.strategy_id,
            cells = grid.len(),
            threads = rayon::current_num_threads(),
            "Starting parallel grid search"
        );

        let estimations = grid
            .par_iter()
            .map(|&periods| {
                let estimation = self.evaluate(periods);
                progress_bar.inc(1);
                estimation
            })
            .collect();

        progress_bar.finish_with_message("Grid search complete.");
        Ok(self.report(estimations))
    }

    /// Runs one grid cell. Failures are recorded against the cell, never dropped.
    fn evaluate(&self, periods: MaPeriods) -> Estimation {
        let outcome = create_strategy(self.strategy_id, &self.settings, periods)
            .map_err(backtester::error::BacktestError::from)
            .and_then(|strategy| self.tester.test(strategy.as_ref()));

        let outcome = match outcome {
            Ok(report) => Outcome::Completed {
                average: report.average,
                trades: report.total_trades(),
                skipped_tickers: report.skipped.len(),
            },
            Err(e) => {
                tracing::warn!(periods = %periods, "Evaluation failed: {}", e);
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        Estimation { periods, outcome }
    }

    fn report(&self, estimations: Vec<Estimation>) -> LearnReport {
        let report = LearnReport::new(
            self.job_id,
            self.strategy_id,
            self.step,
            self.limit,
            estimations,
        );
        match &report.best {
            Some(best) => tracing::info!(job_id = %self.job_id, periods = %best.periods, average = %best.average, "Best parameterization"),
            None => tracing::info!(job_id = %self.job_id, "No parameterization beat breakeven"),
        }
        report
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, LearnerError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        Ok(progress_bar)
    }
}
