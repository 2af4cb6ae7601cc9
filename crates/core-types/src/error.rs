use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Bars must have strictly increasing dates, but {current} follows {previous}")]
    UnorderedBars {
        previous: NaiveDate,
        current: NaiveDate,
    },
}
