use nhelper_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CozeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Workflow returned code {code}: {message}")]
    Workflow { code: i64, message: String },

    #[error("Unexpected workflow output: {0}")]
    Decode(String),
}

impl From<CozeError> for CoreError {
    fn from(err: CozeError) -> Self {
        CoreError::Narrative(err.to_string())
    }
}
