use std::{
    collections::BTreeMap,
    io,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nhelper_core::{
    CoreError, DocumentPublisher, EntryCollections, EntryService, FixedClock, MarkdownConverter,
    Narrative, NarrativeGenerator, NarrativeParameters, PublishedDocument, RawRecord,
    RecordFilter, RecordSource, ReportRequest, ReportService, ReportSettings,
};
use nhelper_domain::{Block, NoteDraft, PeriodKind, PropertyValue, TaskSortKey};
use serde_json::json;
use tokio::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Default)]
struct FakeSource {
    collections: BTreeMap<String, Vec<RawRecord>>,
    failing: Vec<String>,
    queries: Mutex<Vec<(String, Option<RecordFilter>)>>,
}

impl FakeSource {
    fn with(mut self, collection: &str, records: Vec<RawRecord>) -> Self {
        self.collections.insert(collection.to_string(), records);
        self
    }

    fn failing_on(mut self, collection: &str) -> Self {
        self.failing.push(collection.to_string());
        self
    }
}

#[async_trait]
impl RecordSource for FakeSource {
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

#[derive(Default)]
struct FakePublisher {
    created: Mutex<Vec<(String, BTreeMap<String, PropertyValue>, Vec<Block>)>>,
}

#[async_trait]
impl DocumentPublisher for FakePublisher {
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

enum NarratorMode {
    Succeed,
    Fail,
    Stall,
}

struct FakeNarrator {
    mode: NarratorMode,
    seen: Mutex<Vec<(String, NarrativeParameters)>>,
}

impl FakeNarrator {
    fn new(mode: NarratorMode) -> Self {
        Self {
            mode,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for FakeNarrator {
    async fn run(
        &self,
        workflow_id: &str,
        parameters: &NarrativeParameters,
    ) -> Result<Narrative, CoreError> {
        self.seen
            .lock()
            .await
            .push((workflow_id.to_string(), parameters.clone()));
        match self.mode {
            NarratorMode::Succeed => Ok(Narrative {
                summary: "Steady day.".into(),
                rationale: "Half of the plan was done.".into(),
            }),
            NarratorMode::Fail => Err(CoreError::Narrative("workflow error".into())),
            NarratorMode::Stall => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(Narrative::default())
            }
        }
    }
}

struct LineConverter;

impl MarkdownConverter for LineConverter {
    fn convert(&self, markdown: &str) -> Vec<Block> {
        markdown.lines().map(|line| Block::paragraph(line)).collect()
    }
}

fn task(name: &str, categories: &[&str], estimated: f64, actual: f64) -> RawRecord {
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

fn bill(name: &str, amount: f64, marker: &str) -> RawRecord {
    serde_json::from_value(json!({
        "id": name,
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": name}]},
            "Amount": {"type": "number", "number": amount},
            "InOrOut": {"type": "select", "select": {"name": marker}},
            "Type": {"type": "select", "select": {"name": "Food"}},
        }
    }))
    .expect("bill record")
}

fn settings() -> ReportSettings {
    ReportSettings {
        tasks_collection: "tasks".into(),
        bills_collection: "bills".into(),
        narrative_workflow: Some("wf-1".into()),
        narrative_timeout: Duration::from_millis(100),
        ..ReportSettings::default()
    }
}

fn populated_source() -> FakeSource {
    FakeSource::default()
        .with(
            "tasks",
            vec![
                task("standup", &["Work"], 100.0, 50.0),
                task("planning", &["Work", "Personal"], 200.0, 100.0),
            ],
        )
        .with("bills", vec![bill("groceries", 30.0, "支出")])
}

fn service(source: Arc<FakeSource>, publisher: Arc<FakePublisher>) -> ReportService {
    ReportService::new(source, publisher, Arc::new(LineConverter), settings()).with_clock(
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 4, 0, 0).unwrap())),
    )
}

fn headings(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Heading { level: 1, text } => {
                Some(text.iter().map(|run| run.content.as_str()).collect())
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn publish_creates_report_in_target_collection() {
    let source = Arc::new(populated_source());
    let publisher = Arc::new(FakePublisher::default());
    let service = service(source.clone(), publisher.clone());

    let published = service
        .publish(&ReportRequest::default(), "daily-reports")
        .await
        .expect("publish");
    assert_eq!(published.id, "page-1");

    let created = publisher.created.lock().await;
    assert_eq!(created.len(), 1);
    let (collection, properties, blocks) = &created[0];
    assert_eq!(collection, "daily-reports");
    assert_eq!(
        properties.get("Name"),
        Some(&PropertyValue::Title("2024-01-15".into()))
    );
    assert_eq!(properties.get("ActualTime"), Some(&PropertyValue::Number(250.0)));
    assert_eq!(properties.get("NetAmount"), Some(&PropertyValue::Number(-30.0)));
    assert_eq!(headings(blocks), vec!["Summary", "Tasks", "Bills"]);
}

#[tokio::test]
async fn both_fetches_use_the_window_filter() {
    let source = Arc::new(populated_source());
    let service = service(source.clone(), Arc::new(FakePublisher::default()));
    let request = ReportRequest {
        period: PeriodKind::Week,
        ..ReportRequest::default()
    };
    let window = service.window(PeriodKind::Week, None);
    service.compose(&request).await.expect("compose");

    let queries = source.queries.lock().await;
    assert_eq!(queries.len(), 2);
    for (_, filter) in queries.iter() {
        let filter = filter.as_ref().expect("window filter");
        assert_eq!(filter.field, "Date");
        assert_eq!(filter.on_or_after, Some(window.start));
        assert_eq!(filter.before, Some(window.end));
    }
}

#[tokio::test]
async fn unrecognized_period_queries_without_filter() {
    let source = Arc::new(populated_source());
    let service = service(source.clone(), Arc::new(FakePublisher::default()));
    let request = ReportRequest {
        period: PeriodKind::Unrecognized,
        ..ReportRequest::default()
    };
    service.compose(&request).await.expect("compose");
    let queries = source.queries.lock().await;
    assert!(queries.iter().all(|(_, filter)| filter.is_none()));
}

#[tokio::test]
async fn failed_fetch_aborts_without_publishing() {
    let source = Arc::new(populated_source().failing_on("bills"));
    let publisher = Arc::new(FakePublisher::default());
    let service = service(source, publisher.clone());

    let result = service.publish(&ReportRequest::default(), "reports").await;
    assert!(matches!(result, Err(CoreError::Upstream(_))));
    assert!(publisher.created.lock().await.is_empty());
}

#[tokio::test]
async fn narrative_is_appended_when_generated() {
    let narrator = Arc::new(FakeNarrator::new(NarratorMode::Succeed));
    let service = service(
        Arc::new(populated_source()),
        Arc::new(FakePublisher::default()),
    )
    .with_narrator(narrator.clone());
    let request = ReportRequest {
        with_narrative: true,
        ..ReportRequest::default()
    };

    let document = service.compose(&request).await.expect("compose");
    assert_eq!(
        headings(&document.content_blocks),
        vec!["Summary", "Tasks", "Bills", "Narrative"]
    );
    assert!(document
        .content_blocks
        .contains(&Block::paragraph("Half of the plan was done.")));

    let seen = narrator.seen.lock().await;
    let (workflow, parameters) = &seen[0];
    assert_eq!(workflow, "wf-1");
    assert_eq!(parameters.start_iso, "2024-01-14T16:00:00Z");
    assert_eq!(parameters.end_iso, "2024-01-15T16:00:00Z");
    let tasks = parameters.task_report.as_ref().expect("task report");
    assert_eq!(tasks.estimated_seconds_sum, 500.0);
}

#[tokio::test]
async fn narrative_failure_degrades_to_plain_report() {
    let service = service(
        Arc::new(populated_source()),
        Arc::new(FakePublisher::default()),
    )
    .with_narrator(Arc::new(FakeNarrator::new(NarratorMode::Fail)));
    let request = ReportRequest {
        with_narrative: true,
        sort_key: TaskSortKey::Concentration,
        ..ReportRequest::default()
    };
    let document = service.compose(&request).await.expect("compose");
    assert_eq!(
        headings(&document.content_blocks),
        vec!["Summary", "Tasks", "Bills"]
    );
}

#[tokio::test]
async fn stalled_narrative_times_out() {
    let service = service(
        Arc::new(populated_source()),
        Arc::new(FakePublisher::default()),
    )
    .with_narrator(Arc::new(FakeNarrator::new(NarratorMode::Stall)));
    let request = ReportRequest {
        with_narrative: true,
        ..ReportRequest::default()
    };
    let document = service.compose(&request).await.expect("compose");
    assert!(!headings(&document.content_blocks).contains(&"Narrative".to_string()));
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<StdMutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn requested_narrative_without_generator_is_logged() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let service = service(
        Arc::new(populated_source()),
        Arc::new(FakePublisher::default()),
    );
    let request = ReportRequest {
        with_narrative: true,
        ..ReportRequest::default()
    };
    let document = service.compose(&request).await.expect("compose");

    assert!(!headings(&document.content_blocks).contains(&"Narrative".to_string()));
    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("no narrative generator is configured"), "{output}");
}

#[tokio::test]
async fn narrative_is_skipped_unless_requested() {
    let narrator = Arc::new(FakeNarrator::new(NarratorMode::Succeed));
    let service = service(
        Arc::new(populated_source()),
        Arc::new(FakePublisher::default()),
    )
    .with_narrator(narrator.clone());
    service
        .compose(&ReportRequest::default())
        .await
        .expect("compose");
    assert!(narrator.seen.lock().await.is_empty());
}

#[tokio::test]
async fn missing_report_collection_is_rejected() {
    let service = service(
        Arc::new(populated_source()),
        Arc::new(FakePublisher::default()),
    );
    let result = service.publish(&ReportRequest::default(), " ").await;
    assert!(matches!(result, Err(CoreError::MissingCollection(_))));
}

#[tokio::test]
async fn bill_info_nets_the_window() {
    let source = populated_source().with(
        "bills",
        vec![bill("salary", 100.0, "收入"), bill("dinner", 40.0, "支出")],
    );
    let service = service(Arc::new(source), Arc::new(FakePublisher::default()));
    let info = service
        .bill_info(PeriodKind::Month, None)
        .await
        .expect("bill info");
    assert_eq!(info.income_total, 100.0);
    assert_eq!(info.expenditure_total, 40.0);
    assert_eq!(info.net_total, 60.0);
    assert_eq!(info.category_shares.len(), 1);
}

#[tokio::test]
async fn entry_service_lists_todos_and_writes_notes() {
    let todo: RawRecord = serde_json::from_value(json!({
        "id": "todo-1",
        "url": "https://workspace.example/todo-1",
        "properties": {
            "Name": {"type": "title", "title": [{"plain_text": "Water plants"}]},
            "Tags": {"type": "multi_select", "multi_select": [{"name": "Home"}]},
            "Description": {"type": "rich_text", "rich_text": [{"plain_text": "balcony"}]},
        }
    }))
    .expect("todo record");
    let source = Arc::new(FakeSource::default().with("todos", vec![todo]));
    let publisher = Arc::new(FakePublisher::default());
    let entries = EntryService::new(
        source,
        publisher.clone(),
        Arc::new(LineConverter),
        EntryCollections {
            todo: "todos".into(),
            bill: "bills".into(),
            note: "notes".into(),
        },
    );

    let todos = entries.list_todos().await.expect("list todos");
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].name, "Water plants");
    assert_eq!(todos[0].tags, vec!["Home"]);
    assert_eq!(todos[0].description, "balcony");

    let note = NoteDraft {
        title: "Reading".into(),
        tags: vec!["Rust".into()],
        url: "https://example.com/post".into(),
        content: "first line\nsecond line".into(),
    };
    entries.add_note(&note).await.expect("add note");
    let created = publisher.created.lock().await;
    let (collection, _, blocks) = &created[0];
    assert_eq!(collection, "notes");
    assert_eq!(blocks.len(), 2);
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_publisher() {
    let publisher = Arc::new(FakePublisher::default());
    let entries = EntryService::new(
        Arc::new(FakeSource::default()),
        publisher.clone(),
        Arc::new(LineConverter),
        EntryCollections {
            note: "notes".into(),
            ..EntryCollections::default()
        },
    );
    let note = NoteDraft {
        title: String::new(),
        tags: Vec::new(),
        url: "https://example.com".into(),
        content: "body".into(),
    };
    assert!(matches!(
        entries.add_note(&note).await,
        Err(CoreError::Validation(_))
    ));
    assert!(publisher.created.lock().await.is_empty());
}
