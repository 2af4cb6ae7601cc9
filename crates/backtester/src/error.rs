use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Ticker {ticker}: trade date {date} has no matching bar")]
    DataConsistency { ticker: String, date: NaiveDate },

    #[error("Ticker {ticker}: execution price on {date} is zero")]
    ZeroPrice { ticker: String, date: NaiveDate },

    #[error("Historical data for ticker {0} is missing from the cache.")]
    DataUnavailable(String),

    #[error("Every ticker was skipped; no estimate can be formed.")]
    NoUsableTickers,

    #[error("The tester needs at least one ticker.")]
    NoTickers,
}
