use core_types::{MaPeriods, StrategyId};
use rust_decimal::Decimal;
use serde::Serialize;

/// The compounded result of trading one ticker's sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerEstimate {
    pub ticker: String,
    /// Completed buy/sell round trips.
    pub trades: usize,
    /// Product of `1 + return` over all round trips; `1.0` when there were none.
    pub estimate: Decimal,
}

/// A ticker left out of the average, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// The outcome of evaluating one parameterization across the ticker universe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    pub strategy: StrategyId,
    pub periods: MaPeriods,
    pub tickers: Vec<TickerEstimate>,
    pub skipped: Vec<SkippedTicker>,
    /// Mean of the per-ticker estimates that were not skipped.
    pub average: Decimal,
}

impl TestReport {
    pub fn total_trades(&self) -> usize {
        self.tickers.iter().map(|t| t.trades).sum()
    }
}
