//! # Signal Strategy Library
//!
//! This crate turns a daily `BarSeries` into buy and sell signal dates. It defines a
//! universal `Strategy` trait and three moving-average based implementations.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O, no shared state. Every method is a function of the bar
//!   series and the immutable parameters the strategy was built with, so one instance
//!   per grid cell can be evaluated on any thread.
//! - **Shared Reconciliation:** Only signal generation differs between variants. The
//!   merge of buy and sell signals into a trade sequence is the trait's default method.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `create_strategy`: The factory function to construct a strategy instance.
//! - The concrete strategy structs themselves (e.g., `MACrossover`).

pub mod error;
pub mod factory;
pub mod indicators;
pub mod ma_band;
pub mod ma_crossover;
pub mod trailing_stop;

#[cfg(test)]
mod fixtures;

pub use error::StrategyError;
pub use factory::create_strategy;
pub use ma_band::MaBand;
pub use ma_crossover::MACrossover;
pub use trailing_stop::CrossoverTrailingStop;

pub use core_types::StrategyId;

use chrono::NaiveDate;
use core_types::{BarSeries, MaPeriods, TradeSequence};

/// The core trait that all signal strategies implement.
///
/// Implementors only describe *when* to buy and sell. `sequence` merges both lists
/// into an alternating trade sequence and should not normally be overridden.
///
/// The `Send + Sync` bounds allow one strategy per worker in the parallel learner.
pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    fn periods(&self) -> MaPeriods;

    /// Ascending dates on which the entry condition fired.
    fn buy_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError>;

    /// Ascending dates on which the exit condition fired.
    fn sell_points(&self, series: &BarSeries) -> Result<Vec<NaiveDate>, StrategyError>;

    /// Builds the alternating buy/sell trade sequence for `series`.
    fn sequence(&self, series: &BarSeries) -> Result<TradeSequence, StrategyError> {
        let sells = self.sell_points(series)?;
        let buys = self.buy_points(series)?;
        let sequence = TradeSequence::reconcile(&buys, &sells);
        tracing::debug!(
            strategy = %self.id(),
            periods = %self.periods(),
            buys = buys.len(),
            sells = sells.len(),
            trades = sequence.trade_count(),
            "Reconciled trade sequence"
        );
        Ok(sequence)
    }
}
