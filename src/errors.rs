use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nhelper_config::ConfigError;
use nhelper_core::CoreError;
use thiserror::Error;
use tracing::error;

use crate::server::envelope::Envelope;

/// Failures surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Core(CoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Core(CoreError::MissingCollection(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Core(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", self);
        }
        let body = Envelope::<()>::failure(status, self.to_string());
        (status, Json(body)).into_response()
    }
}
