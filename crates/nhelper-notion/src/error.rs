use nhelper_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Workspace API returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<NotionError> for CoreError {
    fn from(err: NotionError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}
