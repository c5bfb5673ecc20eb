use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use nhelper_core::PublishedDocument;
use nhelper_domain::{BillFact, BillInfo, TaskReport, TodoItem};
use serde::de::DeserializeOwned;

use crate::{
    errors::AppError,
    requests::{BillBody, NoteBody, PeriodQuery, ReportBody, TodoBody},
    server::{envelope::Envelope, state::AppState},
    utils::build_info::{self, BuildMetadata},
};

type Reply<T> = Result<Json<Envelope<T>>, AppError>;

/// JSON body, or the default value when the body is empty.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| AppError::BadRequest(err.to_string()))
}

pub async fn version() -> Json<Envelope<BuildMetadata>> {
    Envelope::success(build_info::current())
}

pub async fn list_todos(State(state): State<AppState>) -> Reply<Vec<TodoItem>> {
    Ok(Envelope::success(state.entries.list_todos().await?))
}

pub async fn add_todo(State(state): State<AppState>, body: Bytes) -> Reply<PublishedDocument> {
    let draft = parse_body::<TodoBody>(&body)?.into_draft();
    Ok(Envelope::success(state.entries.add_todo(&draft).await?))
}

pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Reply<Vec<BillFact>> {
    let request = query.to_request(state.timezone())?;
    let bills = state
        .reports
        .list_bills(request.period, request.reference_time)
        .await?;
    Ok(Envelope::success(bills))
}

pub async fn bill_info(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Reply<BillInfo> {
    let request = query.to_request(state.timezone())?;
    let info = state
        .reports
        .bill_info(request.period, request.reference_time)
        .await?;
    Ok(Envelope::success(info))
}

pub async fn add_bill(State(state): State<AppState>, body: Bytes) -> Reply<PublishedDocument> {
    let draft = parse_body::<BillBody>(&body)?.into_draft()?;
    Ok(Envelope::success(state.entries.add_bill(&draft).await?))
}

pub async fn add_note(State(state): State<AppState>, body: Bytes) -> Reply<PublishedDocument> {
    let draft = parse_body::<NoteBody>(&body)?.into_draft();
    Ok(Envelope::success(state.entries.add_note(&draft).await?))
}

pub async fn task_report(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Reply<TaskReport> {
    let request = query.to_request(state.timezone())?;
    Ok(Envelope::success(state.reports.task_report(&request).await?))
}

pub async fn create_report(State(state): State<AppState>, body: Bytes) -> Reply<PublishedDocument> {
    let body = parse_body::<ReportBody>(&body)?;
    let request = body.to_request(state.timezone())?;
    let published = state
        .reports
        .publish(&request, &state.collections.report)
        .await?;
    Ok(Envelope::success(published))
}

/// Publishes into the daily or weekly collection chosen by `target`.
pub async fn periodic_report(
    State(state): State<AppState>,
    body: Bytes,
) -> Reply<PublishedDocument> {
    let body = parse_body::<ReportBody>(&body)?;
    let target = body.target()?;
    let request = body.to_request(state.timezone())?;
    let published = state
        .reports
        .publish(&request, state.collections.for_target(target))
        .await?;
    Ok(Envelope::success(published))
}
