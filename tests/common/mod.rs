#![allow(dead_code)]

use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nhelper_core::{
    CoreError, DocumentPublisher, EntryCollections, EntryService, FixedClock, PublishedDocument,
    RawRecord, RecordFilter, RecordSource, ReportService, ReportSettings,
};
use nhelper_domain::{Block, PropertyValue};
use nhelper_notion::MarkdownBlocks;
use notion_helper::server::{self, AppState, ReportCollections};
use serde_json::json;
use tokio::sync::Mutex;

pub const SECRET: &str = "letmein";

pub type Created = (String, BTreeMap<String, PropertyValue>, Vec<Block>);

#[derive(Default)]
pub struct FakeWorkspace {
    pub collections: BTreeMap<String, Vec<RawRecord>>,
    pub failing: Vec<String>,
    pub queries: Mutex<Vec<(String, Option<RecordFilter>)>>,
    pub created: Mutex<Vec<Created>>,
}

impl FakeWorkspace {
    pub fn with(mut self, collection: &str, records: Vec<RawRecord>) -> Self {
        self.collections.insert(collection.to_string(), records);
        self
    }

    pub fn failing_on(mut self, collection: &str) -> Self {
        self.failing.push(collection.to_string());
        self
    }
}

#[async_trait]
impl RecordSource for FakeWorkspace {
    async fn query_records(
        &self,
        collection_id: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<RawRecord>, CoreError> {
        self.queries
            .lock()
            .await
            .push((collection_id.to_string(), filter.cloned()));
        if self.failing.iter().any(|id| id == collection_id) {
            return Err(CoreError::Upstream(format!("{collection_id} unavailable")));
        }
        Ok(self
            .collections
            .get(collection_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DocumentPublisher for FakeWorkspace {
    async fn create_document(
        &self,
        collection_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
        blocks: &[Block],
    ) -> Result<PublishedDocument, CoreError> {
        let mut created = self.created.lock().await;
        created.push((collection_id.to_string(), properties.clone(), blocks.to_vec()));
        Ok(PublishedDocument {
            id: format!("page-{}", created.len()),
            url: format!("https://workspace.example/page-{}", created.len()),
        })
    }
}

pub fn task(name: &str, categories: &[&str], estimated: f64, actual: f64) -> RawRecord {
    let options: Vec<_> = categories.iter().map(|c| json!({ "name": c })).collect();
    serde_json::from_value(json!({
        "id": name,
        "url": format!("https://workspace.example/{name}"),
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": name}]},
            "Type": {"type": "multi_select", "multi_select": options},
            "EstimatedTime": {"type": "formula", "formula": {"type": "number", "number": estimated}},
            "ActualTime": {"type": "number", "number": actual},
        }
    }))
    .expect("task record")
}

pub fn bill(name: &str, amount: f64, marker: &str, category: &str) -> RawRecord {
    serde_json::from_value(json!({
        "id": name,
        "created_time": "2024-01-15T03:00:00.000Z",
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": name}]},
            "Amount": {"type": "number", "number": amount},
            "InOrOut": {"type": "select", "select": {"name": marker}},
            "Type": {"type": "select", "select": {"name": category}},
        }
    }))
    .expect("bill record")
}

pub fn todo(name: &str, tag: &str) -> RawRecord {
    serde_json::from_value(json!({
        "id": format!("todo-{name}"),
        "url": format!("https://workspace.example/todo-{name}"),
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": name}]},
            "Tags": {"type": "multi_select", "multi_select": [{"name": tag}]},
        }
    }))
    .expect("todo record")
}

/// Tasks, bills and todos of the reference day 2024-01-15 (Asia/Shanghai).
pub fn seeded_workspace() -> FakeWorkspace {
    FakeWorkspace::default()
        .with(
            "tasks",
            vec![
                task("write", &["Work"], 100.0, 50.0),
                task("review", &["Work", "Personal"], 200.0, 100.0),
            ],
        )
        .with("bills", vec![bill("lunch", 30.0, "支出", "Food")])
        .with("todos", vec![todo("Water plants", "Home")])
}

pub fn app_state(workspace: Arc<FakeWorkspace>, secret: Option<&str>) -> AppState {
    let converter = Arc::new(MarkdownBlocks);
    let settings = ReportSettings {
        tasks_collection: "tasks".into(),
        bills_collection: "bills".into(),
        ..ReportSettings::default()
    };
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 1, 15, 4, 0, 0).unwrap(),
    ));
    let reports = ReportService::new(
        workspace.clone(),
        workspace.clone(),
        converter.clone(),
        settings,
    )
    .with_clock(clock);
    let entries = EntryService::new(
        workspace.clone(),
        workspace,
        converter,
        EntryCollections {
            todo: "todos".into(),
            bill: "bills".into(),
            note: "notes".into(),
        },
    );
    AppState::new(
        reports,
        entries,
        ReportCollections {
            report: "reports".into(),
            daily: "daily".into(),
            weekly: "weekly".into(),
        },
        secret.map(str::to_string),
    )
}

pub async fn spawn_app(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = server::router(state);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}
