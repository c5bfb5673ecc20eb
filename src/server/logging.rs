use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Opens a span per request and logs its outcome and latency.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!("request", %request_id, %method, %path);

    async move {
        debug!(headers = ?redacted_headers(&req), "request received");
        let started = Instant::now();
        let response = next.run(req).await;
        let status = response.status().as_u16();
        debug!(status, "response sent");
        info!(
            status,
            latency_ms = started.elapsed().as_millis() as u64,
            "handled request"
        );
        response
    }
    .instrument(span)
    .await
}

fn redacted_headers(req: &Request) -> Vec<(String, String)> {
    req.headers()
        .iter()
        .map(|(name, value)| {
            let shown = match name.as_str() {
                "authorization" | super::auth::SECRET_HEADER => "<redacted>".to_string(),
                _ => value.to_str().unwrap_or("<binary>").to_string(),
            };
            (name.to_string(), shown)
        })
        .collect()
}
