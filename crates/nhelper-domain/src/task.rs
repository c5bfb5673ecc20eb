//! Task facts and the aggregated task report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{common::*, window::TimeWindow};

/// Scheduled range of a single task as recorded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One tracked task with its estimated and actual durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFact {
    pub name: String,
    pub categories: Vec<String>,
    pub span: TaskSpan,
    pub estimated_seconds: f64,
    pub actual_seconds: f64,
    pub source_url: String,
    /// `actual_seconds / estimated_seconds`; undefined when nothing was estimated.
    pub concentration: Ratio,
}

impl TaskFact {
    pub fn new(
        name: impl Into<String>,
        categories: Vec<String>,
        span: TaskSpan,
        estimated_seconds: f64,
        actual_seconds: f64,
        source_url: impl Into<String>,
    ) -> Self {
        let estimated_seconds = non_negative(estimated_seconds);
        let actual_seconds = non_negative(actual_seconds);
        Self {
            name: name.into(),
            categories: normalize_categories(categories),
            span,
            estimated_seconds,
            actual_seconds,
            source_url: source_url.into(),
            concentration: Ratio::of(actual_seconds, estimated_seconds),
        }
    }
}

impl NamedEntity for TaskFact {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Categorized for TaskFact {
    fn categories(&self) -> &[String] {
        &self.categories
    }
}

/// All tasks sharing one category, with summed durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCategoryGroup {
    pub category: String,
    pub tasks: Vec<TaskFact>,
    pub actual_seconds_sum: f64,
    pub estimated_seconds_sum: f64,
    /// Ratio of the sums, not the mean of per-task ratios.
    pub concentration: Ratio,
    pub window: TimeWindow,
}

impl TaskCategoryGroup {
    pub fn new(category: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            category: category.into(),
            tasks: Vec::new(),
            actual_seconds_sum: 0.0,
            estimated_seconds_sum: 0.0,
            concentration: Ratio::Undefined,
            window,
        }
    }

    pub fn push(&mut self, task: TaskFact) {
        self.actual_seconds_sum += task.actual_seconds;
        self.estimated_seconds_sum += task.estimated_seconds;
        self.concentration = Ratio::of(self.actual_seconds_sum, self.estimated_seconds_sum);
        self.tasks.push(task);
    }
}

/// Task groups for a window, sorted descending by the requested key.
///
/// Totals are summed across groups, so a task listed under several
/// categories is counted once per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub groups: Vec<TaskCategoryGroup>,
    pub actual_seconds_sum: f64,
    pub estimated_seconds_sum: f64,
    pub concentration: Ratio,
    pub actual_seconds_str: String,
    pub estimated_seconds_str: String,
    pub window: TimeWindow,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
