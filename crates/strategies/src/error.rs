use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),

    #[error("Moving average on {date} is {value}, cannot divide by it")]
    Domain { date: NaiveDate, value: f64 },
}
