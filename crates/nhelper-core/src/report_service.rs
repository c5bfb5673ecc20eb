//! Report orchestration: window, fetch, aggregate, narrate, compose, publish.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use nhelper_domain::{
    BillFact, BillInfo, PeriodKind, ReportDocument, TaskFact, TaskReport, TaskSortKey, TimeWindow,
};
use tracing::{debug, info, warn};

use crate::{
    bill_service::BillService,
    collaborators::{
        require_collection, DocumentPublisher, MarkdownConverter, Narrative, NarrativeGenerator,
        NarrativeParameters, PublishedDocument, RecordFilter, RecordSource,
    },
    composer::{ComposeOptions, ReportComposer},
    schema::{bill_fields, task_fields},
    task_service::TaskService,
    time::{Clock, SystemClock},
    window_service::{WindowService, WindowSettings},
    CoreError,
};

/// Collections, calendar and presentation settings for report generation.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub window: WindowSettings,
    pub tasks_collection: String,
    pub bills_collection: String,
    pub narrative_workflow: Option<String>,
    pub narrative_timeout: Duration,
    pub compose: ComposeOptions,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            tasks_collection: String::new(),
            bills_collection: String::new(),
            narrative_workflow: None,
            narrative_timeout: Duration::from_secs(60),
            compose: ComposeOptions::default(),
        }
    }
}

/// What to report on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub period: PeriodKind,
    /// Defaults to the service clock's current instant.
    pub reference_time: Option<DateTime<Utc>>,
    pub sort_key: TaskSortKey,
    pub with_narrative: bool,
}

pub struct ReportService {
    records: Arc<dyn RecordSource>,
    publisher: Arc<dyn DocumentPublisher>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
    converter: Arc<dyn MarkdownConverter>,
    clock: Arc<dyn Clock>,
    settings: ReportSettings,
}

impl ReportService {
    pub fn new(
        records: Arc<dyn RecordSource>,
        publisher: Arc<dyn DocumentPublisher>,
        converter: Arc<dyn MarkdownConverter>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            records,
            publisher,
            narrator: None,
            converter,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn window(&self, period: PeriodKind, reference: Option<DateTime<Utc>>) -> TimeWindow {
        WindowService::window_at(period, reference, &self.settings.window, self.clock.as_ref())
    }

    /// Task facts recorded inside `window`.
    pub async fn fetch_tasks(&self, window: &TimeWindow) -> Result<Vec<TaskFact>, CoreError> {
        let collection = require_collection(&self.settings.tasks_collection, "task")?;
        let filter = RecordFilter::within(task_fields::DATE, window);
        let records = self.records.query_records(collection, filter.as_ref()).await?;
        debug!(collection, count = records.len(), "fetched task records");
        let tz = self.settings.window.timezone;
        Ok(records
            .iter()
            .map(|raw| TaskService::normalize(raw, tz))
            .collect())
    }

    /// Bill facts recorded inside `window`.
    pub async fn fetch_bills(&self, window: &TimeWindow) -> Result<Vec<BillFact>, CoreError> {
        let collection = require_collection(&self.settings.bills_collection, "bill")?;
        let filter = RecordFilter::within(bill_fields::DATE, window);
        let records = self.records.query_records(collection, filter.as_ref()).await?;
        debug!(collection, count = records.len(), "fetched bill records");
        let tz = self.settings.window.timezone;
        Ok(records
            .iter()
            .map(|raw| BillService::normalize(raw, tz))
            .collect())
    }

    pub async fn task_report(&self, request: &ReportRequest) -> Result<TaskReport, CoreError> {
        let window = self.window(request.period, request.reference_time);
        let facts = self.fetch_tasks(&window).await?;
        Ok(TaskService::build_report(&facts, &window, request.sort_key))
    }

    pub async fn list_bills(
        &self,
        period: PeriodKind,
        reference: Option<DateTime<Utc>>,
    ) -> Result<Vec<BillFact>, CoreError> {
        let window = self.window(period, reference);
        self.fetch_bills(&window).await
    }

    pub async fn bill_info(
        &self,
        period: PeriodKind,
        reference: Option<DateTime<Utc>>,
    ) -> Result<BillInfo, CoreError> {
        Ok(BillService::aggregate(self.list_bills(period, reference).await?))
    }

    /// Fetches tasks and bills concurrently and composes the report. Either
    /// fetch failing fails the whole call; a failed or slow narrative only
    /// drops the narrative section.
    pub async fn compose(&self, request: &ReportRequest) -> Result<ReportDocument, CoreError> {
        let window = self.window(request.period, request.reference_time);
        let (tasks, bills) =
            tokio::try_join!(self.fetch_tasks(&window), self.fetch_bills(&window))?;

        let task_report = TaskService::build_report(&tasks, &window, request.sort_key);
        let bill_info = BillService::aggregate(bills);
        let narrative = if request.with_narrative {
            self.narrative(&window, &task_report, &bill_info).await
        } else {
            None
        };

        let composer = ReportComposer::new(self.converter.as_ref(), self.settings.compose.clone());
        Ok(composer.compose(
            &window,
            Some(&task_report),
            Some(&bill_info),
            narrative.as_ref(),
        ))
    }

    /// Composes the report and creates it in `collection_id`.
    pub async fn publish(
        &self,
        request: &ReportRequest,
        collection_id: &str,
    ) -> Result<PublishedDocument, CoreError> {
        let collection = require_collection(collection_id, "report")?;
        let document = self.compose(request).await?;
        let published = self
            .publisher
            .create_document(collection, &document.properties, &document.content_blocks)
            .await?;
        info!(
            collection,
            period = %request.period,
            blocks = document.content_blocks.len(),
            url = %published.url,
            "published report"
        );
        Ok(published)
    }

    async fn narrative(
        &self,
        window: &TimeWindow,
        task_report: &TaskReport,
        bill_info: &BillInfo,
    ) -> Option<Narrative> {
        let Some(narrator) = self.narrator.as_ref() else {
            warn!("narrative requested but no narrative generator is configured");
            return None;
        };
        let Some(workflow) = self.settings.narrative_workflow.as_deref() else {
            warn!("narrative requested but no workflow is configured");
            return None;
        };
        let parameters = NarrativeParameters {
            task_report: Some(task_report.clone()),
            bill_info: Some(bill_info.clone()),
            start_iso: window.start_iso.clone(),
            end_iso: window.end_iso.clone(),
        };

        match tokio::time::timeout(
            self.settings.narrative_timeout,
            narrator.run(workflow, &parameters),
        )
        .await
        {
            Ok(Ok(narrative)) => Some(narrative),
            Ok(Err(err)) => {
                warn!("narrative generation failed, composing without it: {}", err);
                None
            }
            Err(_) => {
                warn!(
                    "narrative generation timed out after {:?}, composing without it",
                    self.settings.narrative_timeout
                );
                None
            }
        }
    }
}
