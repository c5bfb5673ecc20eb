//! Request bodies and query strings accepted by the HTTP routes.
//!
//! Field names follow the client's camelCase. Required fields are optional
//! here so that a missing value surfaces as a validation error with a message
//! instead of a generic deserialization failure.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use nhelper_core::ReportRequest;
use nhelper_domain::{BillDraft, Direction, NoteDraft, PeriodKind, TaskSortKey, TodoDraft};
use serde::Deserialize;

use crate::errors::AppError;

/// A single label or a list of labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        let labels = match self {
            OneOrMany::One(label) => vec![label],
            OneOrMany::Many(labels) => labels,
        };
        labels
            .into_iter()
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect()
    }
}

fn labels(value: Option<OneOrMany>) -> Vec<String> {
    value.map(OneOrMany::into_vec).unwrap_or_default()
}

/// Reference instant as epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BaseTime {
    Millis(i64),
    Text(String),
}

impl BaseTime {
    /// Resolves to an instant; bare dates mean local midnight in `timezone`.
    /// Blank text resolves to `None`.
    pub fn resolve(&self, timezone: Tz) -> Result<Option<DateTime<Utc>>, AppError> {
        match self {
            BaseTime::Millis(millis) => DateTime::<Utc>::from_timestamp_millis(*millis)
                .map(Some)
                .ok_or_else(|| AppError::BadRequest(format!("baseTime {millis} is out of range"))),
            BaseTime::Text(text) => parse_base_time(text, timezone),
        }
    }
}

pub fn parse_base_time(text: &str, timezone: Tz) -> Result<Option<DateTime<Utc>>, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(millis) = text.parse::<i64>() {
        return BaseTime::Millis(millis).resolve(timezone);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("baseTime `{text}` is not a date")))?;
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    timezone
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| Some(local.with_timezone(&Utc)))
        .ok_or_else(|| AppError::BadRequest(format!("baseTime `{text}` does not exist locally")))
}

fn period(label: Option<&str>) -> PeriodKind {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => PeriodKind::from_label(label),
        _ => PeriodKind::default(),
    }
}

fn sort_key(label: Option<&str>) -> TaskSortKey {
    label.map(TaskSortKey::from_label).unwrap_or_default()
}

/// `?timeType=&baseTime=&sortBy=` on the listing routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub time_type: Option<String>,
    pub base_time: Option<String>,
    pub sort_by: Option<String>,
}

impl PeriodQuery {
    pub fn to_request(&self, timezone: Tz) -> Result<ReportRequest, AppError> {
        let reference_time = match &self.base_time {
            Some(text) => parse_base_time(text, timezone)?,
            None => None,
        };
        Ok(ReportRequest {
            period: period(self.time_type.as_deref()),
            reference_time,
            sort_key: sort_key(self.sort_by.as_deref()),
            with_narrative: false,
        })
    }
}

/// Where a `/report/daily` document is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportTarget {
    #[default]
    Day,
    Week,
}

impl ReportTarget {
    pub fn from_label(label: &str) -> Result<Self, AppError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "day" => Ok(ReportTarget::Day),
            "week" => Ok(ReportTarget::Week),
            other => Err(AppError::BadRequest(format!(
                "target must be `day` or `week`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    pub time_type: Option<String>,
    pub base_time: Option<BaseTime>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub with_narrative: bool,
    pub target: Option<String>,
}

impl ReportBody {
    pub fn to_request(&self, timezone: Tz) -> Result<ReportRequest, AppError> {
        let reference_time = match &self.base_time {
            Some(base_time) => base_time.resolve(timezone)?,
            None => None,
        };
        Ok(ReportRequest {
            period: period(self.time_type.as_deref()),
            reference_time,
            sort_key: sort_key(self.sort_by.as_deref()),
            with_narrative: self.with_narrative,
        })
    }

    pub fn target(&self) -> Result<ReportTarget, AppError> {
        self.target
            .as_deref()
            .map(ReportTarget::from_label)
            .unwrap_or(Ok(ReportTarget::Day))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoBody {
    pub name: Option<String>,
    pub tags: Option<OneOrMany>,
    pub description: Option<String>,
}

impl TodoBody {
    pub fn into_draft(self) -> TodoDraft {
        TodoDraft {
            name: self.name.unwrap_or_default(),
            tags: labels(self.tags),
            description: self.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillBody {
    pub name: Option<String>,
    pub method: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<OneOrMany>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_input: bool,
}

impl BillBody {
    pub fn into_draft(self) -> Result<BillDraft, AppError> {
        let amount = self
            .amount
            .ok_or_else(|| AppError::BadRequest("amount is required".into()))?;
        let direction = if self.is_input {
            Direction::Income
        } else {
            Direction::Expenditure
        };
        Ok(BillDraft {
            name: self.name.unwrap_or_default(),
            method: self.method.unwrap_or_default(),
            categories: labels(self.kind),
            amount,
            description: self.description.unwrap_or_default(),
            direction,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteBody {
    pub title: Option<String>,
    pub tags: Option<OneOrMany>,
    pub url: Option<String>,
    pub content: Option<String>,
}

impl NoteBody {
    pub fn into_draft(self) -> NoteDraft {
        NoteDraft {
            title: self.title.unwrap_or_default(),
            tags: labels(self.tags),
            url: self.url.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
        }
    }
}
