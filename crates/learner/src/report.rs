use crate::error::LearnerError;
use core_types::{MaPeriods, StrategyId};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

/// What happened when one grid cell was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed {
        average: Decimal,
        trades: usize,
        skipped_tickers: usize,
    },
    Failed {
        reason: String,
    },
}

/// One grid cell and its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimation {
    pub periods: MaPeriods,
    pub outcome: Outcome,
}

impl Estimation {
    pub fn average(&self) -> Option<Decimal> {
        match self.outcome {
            Outcome::Completed { average, .. } => Some(average),
            Outcome::Failed { .. } => None,
        }
    }
}

/// The best parameterization seen in a search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Best {
    pub periods: MaPeriods,
    pub average: Decimal,
}

/// Every estimation of a search, in grid order, plus the best one.
#[derive(Debug, Clone, Serialize)]
pub struct LearnReport {
    pub job_id: Uuid,
    pub strategy: StrategyId,
    pub step: usize,
    pub limit: usize,
    pub estimations: Vec<Estimation>,
    /// Highest average strictly above breakeven; the earliest cell wins a tie.
    pub best: Option<Best>,
}

impl LearnReport {
    pub(crate) fn new(
        job_id: Uuid,
        strategy: StrategyId,
        step: usize,
        limit: usize,
        estimations: Vec<Estimation>,
    ) -> Self {
        let mut best: Option<Best> = None;
        let mut best_average = Decimal::ONE;

        for estimation in &estimations {
            if let Some(average) = estimation.average() {
                if average > best_average {
                    best_average = average;
                    best = Some(Best {
                        periods: estimation.periods,
                        average,
                    });
                    tracing::info!(periods = %estimation.periods, %average, "New best estimate");
                }
            }
        }

        Self {
            job_id,
            strategy,
            step,
            limit,
            estimations,
            best,
        }
    }

    pub fn failures(&self) -> usize {
        self.estimations
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Failed { .. }))
            .count()
    }

    /// Estimations sorted by average, best first. Failed cells go last, in grid order.
    pub fn ranked(&self) -> Vec<&Estimation> {
        let mut ranked: Vec<&Estimation> = self.estimations.iter().collect();
        ranked.sort_by(|a, b| match (a.average(), b.average()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ranked
    }

    pub fn to_json(&self) -> Result<String, LearnerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn completed(short: usize, long: usize, average: Decimal) -> Estimation {
        Estimation {
            periods: MaPeriods::new(short, long),
            outcome: Outcome::Completed {
                average,
                trades: 1,
                skipped_tickers: 0,
            },
        }
    }

    fn failed(short: usize, long: usize) -> Estimation {
        Estimation {
            periods: MaPeriods::new(short, long),
            outcome: Outcome::Failed {
                reason: "boom".to_string(),
            },
        }
    }

    fn report(estimations: Vec<Estimation>) -> LearnReport {
        LearnReport::new(Uuid::new_v4(), StrategyId::Crossover, 5, 30, estimations)
    }

    #[test]
    fn best_must_beat_breakeven() {
        let report = report(vec![completed(1, 6, dec!(0.9)), completed(1, 11, Decimal::ONE)]);
        assert!(report.best.is_none());
    }

    #[test]
    fn earliest_cell_wins_ties() {
        let report = report(vec![
            completed(1, 6, dec!(1.2)),
            failed(1, 11),
            completed(6, 11, dec!(1.2)),
            completed(6, 16, dec!(1.1)),
        ]);
        assert_eq!(
            report.best,
            Some(Best {
                periods: MaPeriods::new(1, 6),
                average: dec!(1.2)
            })
        );
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn ranking_puts_failures_last() {
        let report = report(vec![
            failed(1, 6),
            completed(1, 11, dec!(1.05)),
            completed(6, 11, dec!(1.3)),
        ]);
        let order: Vec<_> = report.ranked().iter().map(|e| e.periods).collect();
        assert_eq!(
            order,
            vec![
                MaPeriods::new(6, 11),
                MaPeriods::new(1, 11),
                MaPeriods::new(1, 6)
            ]
        );
    }

    #[test]
    fn exports_tagged_outcomes() {
        let json = report(vec![completed(1, 6, dec!(1.5)), failed(1, 11)])
            .to_json()
            .unwrap();
        assert!(json.contains("\"status\": \"completed\""));
        assert!(json.contains("\"status\": \"failed\""));
        assert!(json.contains("\"strategy\": \"crossover\""));
    }
}
