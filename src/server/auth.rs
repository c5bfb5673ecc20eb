use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{errors::AppError, server::state::AppState};

/// Header carrying the shared application secret.
pub const SECRET_HEADER: &str = "request_secret";

/// Rejects requests whose `request_secret` header does not match the
/// configured secret. Without a configured secret every request is rejected.
pub async fn require_secret(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state
        .app_secret
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("no application secret is configured".into()))?;

    let presented = req
        .headers()
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {SECRET_HEADER} header")))?;

    if presented != expected {
        return Err(AppError::Unauthorized(format!("invalid {SECRET_HEADER}")));
    }
    Ok(next.run(req).await)
}
