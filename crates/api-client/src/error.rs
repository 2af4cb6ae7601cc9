use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("The API request returned an error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No instrument found for ticker '{0}'")]
    UnknownTicker(String),

    #[error("Downloaded bars do not form a valid series: {0}")]
    Series(#[from] core_types::CoreError),
}
