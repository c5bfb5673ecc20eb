//! HTTP surface: routes under `/notion` behind the secret guard, plus the
//! public `/version` route.

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod logging;
pub mod state;

use anyhow::Context;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use nhelper_config::Config;
use tracing::info;

pub use state::{AppState, ReportCollections};

pub fn router(state: AppState) -> Router {
    let protected = Router::<AppState>::new()
        .route("/todo/list", get(handlers::list_todos))
        .route("/todo/add", post(handlers::add_todo))
        .route("/bill/list", get(handlers::list_bills))
        .route("/bill/info", get(handlers::bill_info))
        .route("/bill/add", post(handlers::add_bill))
        .route("/note/add", post(handlers::add_note))
        .route("/task/report", get(handlers::task_report))
        .route("/report/create", post(handlers::create_report))
        .route("/report/daily", post(handlers::periodic_report))
        .layer(from_fn_with_state(state.clone(), auth::require_secret));

    Router::<AppState>::new()
        .route("/version", get(handlers::version))
        .nest("/notion", protected)
        .layer(from_fn(logging::log_requests))
        .with_state(state)
}

/// Binds `config.server.bind_addr` and serves until the process stops.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).context("building application state")?;
    if state.app_secret.is_none() {
        tracing::warn!("APP_SECRET is not set; every /notion request will be rejected");
    }
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    info!(addr = %listener.local_addr()?, "notion helper listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
