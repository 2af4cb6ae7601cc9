use indicatif::style::TemplateError;
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearnerError {
    #[error("Parameter grid is invalid: {0}")]
    InvalidGrid(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] JsonError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<TemplateError> for LearnerError {
    fn from(error: TemplateError) -> Self {
        LearnerError::ProgressBarTemplate(error.to_string())
    }
}
