use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nhelper_domain::{BillInfo, Block, PropertyValue, TaskReport, TimeWindow};
use serde::{Deserialize, Serialize};

use crate::{records::RawRecord, CoreError};

/// Date bounds applied to one date-typed field of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub field: String,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub on_or_after: Option<DateTime<Utc>>,
    pub on_or_before: Option<DateTime<Utc>>,
}

impl RecordFilter {
    /// `[start, end)` of `window` on `field`; `None` for the degenerate window.
    pub fn within(field: impl Into<String>, window: &TimeWindow) -> Option<Self> {
        if window.is_degenerate() {
            return None;
        }
        Some(Self {
            field: field.into(),
            on_or_after: Some(window.start),
            before: Some(window.end),
            ..Self::default()
        })
    }
}

/// Trimmed collection id, or [`CoreError::MissingCollection`] when unset.
pub(crate) fn require_collection<'a>(id: &'a str, kind: &str) -> Result<&'a str, CoreError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CoreError::MissingCollection(format!("{kind} collection")));
    }
    Ok(id)
}

/// Handle to a document created by a [`DocumentPublisher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedDocument {
    pub id: String,
    pub url: String,
}

/// Free text produced by a [`NarrativeGenerator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    pub rationale: String,
}

/// Inputs handed to the narrative workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeParameters {
    pub task_report: Option<TaskReport>,
    pub bill_info: Option<BillInfo>,
    #[serde(rename = "startISO")]
    pub start_iso: String,
    #[serde(rename = "endISO")]
    pub end_iso: String,
}

/// Read access to record collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn query_records(
        &self,
        collection_id: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<RawRecord>, CoreError>;
}

/// Creates documents inside a collection.
#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    async fn create_document(
        &self,
        collection_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
        blocks: &[Block],
    ) -> Result<PublishedDocument, CoreError>;
}

/// Runs the workflow that writes a report narrative.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn run(
        &self,
        workflow_id: &str,
        parameters: &NarrativeParameters,
    ) -> Result<Narrative, CoreError>;
}

/// Turns markdown into content blocks.
pub trait MarkdownConverter: Send + Sync {
    fn convert(&self, markdown: &str) -> Vec<Block>;
}
