use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Response body shared by every route: `{data, code, msg}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub code: u16,
    pub msg: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            code: StatusCode::OK.as_u16(),
            msg: "success".into(),
        })
    }

    pub fn failure(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            data: None,
            code: status.as_u16(),
            msg: msg.into(),
        }
    }
}
