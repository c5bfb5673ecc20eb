use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Upstream request failed: {0}")]
    Upstream(String),
    #[error("Publishing failed: {0}")]
    Publish(String),
    #[error("Narrative generation failed: {0}")]
    Narrative(String),
    #[error("Collection not configured: {0}")]
    MissingCollection(String),
}
