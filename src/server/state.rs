use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use nhelper_config::{Config, ConfigError};
use nhelper_core::{
    ComposeOptions, EntryCollections, EntryService, ReportService, ReportSettings, WindowSettings,
};
use nhelper_coze::{CozeClient, CozeClientSettings};
use nhelper_notion::{MarkdownBlocks, NotionClient, NotionClientSettings};

use crate::{errors::AppError, requests::ReportTarget};

/// Collections that composed reports are published into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportCollections {
    pub report: String,
    pub daily: String,
    pub weekly: String,
}

impl ReportCollections {
    pub fn for_target(&self, target: ReportTarget) -> &str {
        match target {
            ReportTarget::Day => &self.daily,
            ReportTarget::Week => &self.weekly,
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportService>,
    pub entries: Arc<EntryService>,
    pub collections: ReportCollections,
    pub app_secret: Option<String>,
}

impl AppState {
    pub fn new(
        reports: ReportService,
        entries: EntryService,
        collections: ReportCollections,
        app_secret: Option<String>,
    ) -> Self {
        Self {
            reports: Arc::new(reports),
            entries: Arc::new(entries),
            collections,
            app_secret: app_secret.filter(|secret| !secret.is_empty()),
        }
    }

    /// Wires the workspace and workflow clients described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let notion = Arc::new(
            NotionClient::new(NotionClientSettings {
                token: config.notion.token.clone(),
                base_url: config.notion.base_url.clone(),
                version: config.notion.version.clone(),
                ..NotionClientSettings::default()
            })
            .map_err(|err| ConfigError::Invalid(err.to_string()))?,
        );
        let converter = Arc::new(MarkdownBlocks);
        let databases = &config.notion.databases;

        let settings = ReportSettings {
            window: WindowSettings {
                timezone: config.timezone()?,
                week_start: config.week_start(),
            },
            tasks_collection: databases.task.clone(),
            bills_collection: databases.bill.clone(),
            narrative_workflow: config.coze.workflow_id.clone(),
            narrative_timeout: Duration::from_secs(config.coze.timeout_secs),
            compose: ComposeOptions {
                table_of_contents: config.report.table_of_contents,
                category_delimiter: config.report.category_delimiter.clone(),
            },
        };
        let mut reports =
            ReportService::new(notion.clone(), notion.clone(), converter.clone(), settings);
        if !config.coze.token.is_empty() {
            let coze = CozeClient::new(CozeClientSettings {
                token: config.coze.token.clone(),
                base_url: config.coze.base_url.clone(),
                timeout: Duration::from_secs(config.coze.timeout_secs),
            })
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
            reports = reports.with_narrator(Arc::new(coze));
        }

        let entries = EntryService::new(
            notion.clone(),
            notion,
            converter,
            EntryCollections {
                todo: databases.todo.clone(),
                bill: databases.bill.clone(),
                note: databases.note.clone(),
            },
        );
        let collections = ReportCollections {
            report: databases.report.clone(),
            daily: databases.daily_report.clone(),
            weekly: databases.weekly_report.clone(),
        };
        Ok(Self::new(
            reports,
            entries,
            collections,
            config.server.app_secret.clone(),
        ))
    }

    pub fn timezone(&self) -> Tz {
        self.reports.settings().window.timezone
    }
}
