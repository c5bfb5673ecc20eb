//! Aggregation of tracked tasks into the task report.

use std::collections::HashMap;

use chrono_tz::Tz;
use nhelper_domain::{
    epoch, Categorized, Ratio, TaskCategoryGroup, TaskFact, TaskReport, TaskSortKey, TaskSpan,
    TimeWindow,
};

use crate::{format::format_seconds_to_time, records::RawRecord, schema::task_fields};

/// Turns raw task records into grouped, sorted task reports.
pub struct TaskService;

impl TaskService {
    /// Reads a task record. Missing numbers become `0`, missing text becomes
    /// empty, and a missing date becomes the epoch span. All-day dates are
    /// read in `tz`.
    pub fn normalize(raw: &RawRecord, tz: Tz) -> TaskFact {
        let span = match raw.date_range(task_fields::DATE, tz) {
            Some((start, end)) => TaskSpan {
                start,
                end: end.unwrap_or(start),
            },
            None => TaskSpan {
                start: epoch(),
                end: epoch(),
            },
        };
        TaskFact::new(
            raw.text(task_fields::NAME),
            raw.labels(task_fields::CATEGORIES),
            span,
            raw.number(task_fields::ESTIMATED),
            raw.number(task_fields::ACTUAL),
            raw.url.clone(),
        )
    }

    /// Folds facts into one group per category, in first-seen order. A fact
    /// with several categories lands in each of their groups.
    pub fn group_by_category(facts: &[TaskFact], window: &TimeWindow) -> Vec<TaskCategoryGroup> {
        let mut groups: Vec<TaskCategoryGroup> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for fact in facts {
            for category in fact.categories() {
                let slot = *index.entry(category.as_str()).or_insert_with(|| {
                    groups.push(TaskCategoryGroup::new(category.clone(), window.clone()));
                    groups.len() - 1
                });
                groups[slot].push(fact.clone());
            }
        }
        groups
    }

    /// Groups facts, sorts the groups descending by `sort_key` (stable, so
    /// ties keep first-seen order) and totals them.
    pub fn build_report(
        facts: &[TaskFact],
        window: &TimeWindow,
        sort_key: TaskSortKey,
    ) -> TaskReport {
        let mut groups = Self::group_by_category(facts, window);
        groups.sort_by(|a, b| match sort_key {
            TaskSortKey::EstimatedSecondsSum => b
                .estimated_seconds_sum
                .total_cmp(&a.estimated_seconds_sum),
            TaskSortKey::ActualSecondsSum => b.actual_seconds_sum.total_cmp(&a.actual_seconds_sum),
            TaskSortKey::Concentration => b.concentration.total_cmp(&a.concentration),
        });

        let actual_seconds_sum: f64 = groups.iter().map(|group| group.actual_seconds_sum).sum();
        let estimated_seconds_sum: f64 =
            groups.iter().map(|group| group.estimated_seconds_sum).sum();

        TaskReport {
            groups,
            actual_seconds_sum,
            estimated_seconds_sum,
            concentration: Ratio::of(actual_seconds_sum, estimated_seconds_sum),
            actual_seconds_str: format_seconds_to_time(actual_seconds_sum),
            estimated_seconds_str: format_seconds_to_time(estimated_seconds_sum),
            window: window.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Shanghai;
    use serde_json::json;

    fn fact(name: &str, categories: &[&str], estimated: f64, actual: f64) -> TaskFact {
        TaskFact::new(
            name,
            categories.iter().map(|c| c.to_string()).collect(),
            TaskSpan {
                start: epoch(),
                end: epoch(),
            },
            estimated,
            actual,
            format!("https://workspace.example/{name}"),
        )
    }

    #[test]
    fn normalize_reads_task_properties() {
        let raw: RawRecord = serde_json::from_value(json!({
            "id": "t1",
            "url": "https://workspace.example/t1",
            "properties": {
                "Name": {"type": "title", "title": [{"plain_text": "Review"}]},
                "Type": {"type": "multi_select", "multi_select": [{"name": "Work"}]},
                "Date": {"type": "date", "date": {"start": "2024-01-15T01:00:00Z", "end": "2024-01-15T02:00:00Z"}},
                "EstimatedTime": {"type": "formula", "formula": {"type": "number", "number": 3600}},
                "ActualTime": {"type": "number", "number": 1800},
            }
        }))
        .unwrap();
        let task = TaskService::normalize(&raw, Shanghai);
        assert_eq!(task.name, "Review");
        assert_eq!(task.categories, vec!["Work"]);
        assert_eq!(task.estimated_seconds, 3600.0);
        assert_eq!(task.actual_seconds, 1800.0);
        assert_eq!(task.concentration, Ratio::Defined(0.5));
        assert_eq!(task.source_url, "https://workspace.example/t1");
        assert!(task.span.end > task.span.start);
    }

    #[test]
    fn normalize_defaults_missing_fields() {
        let task = TaskService::normalize(&RawRecord::default(), Shanghai);
        assert_eq!(task.name, "");
        assert_eq!(task.estimated_seconds, 0.0);
        assert_eq!(task.actual_seconds, 0.0);
        assert_eq!(task.concentration, Ratio::Undefined);
        assert_eq!(task.span.start, epoch());
    }

    #[test]
    fn multi_category_facts_join_every_group() {
        let facts = vec![fact("a", &["A", "B"], 10.0, 5.0), fact("b", &["A"], 20.0, 5.0)];
        let groups = TaskService::group_by_category(&facts, &TimeWindow::degenerate());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "A");
        assert_eq!(groups[0].tasks.len(), 2);
        assert_eq!(groups[1].category, "B");
        assert_eq!(groups[1].tasks.len(), 1);
        assert_eq!(groups[1].tasks[0].name, "a");
    }

    #[test]
    fn group_concentration_is_ratio_of_sums() {
        let facts = vec![fact("a", &["A"], 10.0, 5.0), fact("b", &["A"], 20.0, 5.0)];
        let groups = TaskService::group_by_category(&facts, &TimeWindow::degenerate());
        let concentration = groups[0].concentration.value().unwrap();
        assert!((concentration - 1.0 / 3.0).abs() < 1e-9);
        assert!((concentration - 0.375).abs() > 1e-3);
    }

    #[test]
    fn report_sorts_descending_by_key() {
        let facts = vec![
            fact("small", &["Small"], 10.0, 9.0),
            fact("large", &["Large"], 100.0, 10.0),
        ];
        let window = TimeWindow::degenerate();

        let by_estimate = TaskService::build_report(&facts, &window, TaskSortKey::EstimatedSecondsSum);
        assert_eq!(by_estimate.groups[0].category, "Large");

        let by_concentration = TaskService::build_report(&facts, &window, TaskSortKey::Concentration);
        assert_eq!(by_concentration.groups[0].category, "Small");

        let by_actual = TaskService::build_report(&facts, &window, TaskSortKey::ActualSecondsSum);
        assert_eq!(by_actual.groups[0].category, "Large");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let facts = vec![
            fact("x", &["First"], 10.0, 5.0),
            fact("y", &["Second"], 10.0, 5.0),
            fact("z", &["Third"], 10.0, 5.0),
        ];
        let report =
            TaskService::build_report(&facts, &TimeWindow::degenerate(), TaskSortKey::EstimatedSecondsSum);
        let order: Vec<&str> = report.groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn undefined_concentration_sorts_last() {
        let facts = vec![
            fact("unestimated", &["Loose"], 0.0, 50.0),
            fact("planned", &["Planned"], 100.0, 10.0),
        ];
        let report =
            TaskService::build_report(&facts, &TimeWindow::degenerate(), TaskSortKey::Concentration);
        assert_eq!(report.groups[0].category, "Planned");
        assert_eq!(report.groups[1].concentration, Ratio::Undefined);
    }

    #[test]
    fn report_totals_count_multi_category_tasks_per_group() {
        let facts = vec![fact("both", &["A", "B"], 100.0, 40.0)];
        let report =
            TaskService::build_report(&facts, &TimeWindow::degenerate(), TaskSortKey::EstimatedSecondsSum);
        assert_eq!(report.estimated_seconds_sum, 200.0);
        assert_eq!(report.actual_seconds_sum, 80.0);
        assert_eq!(report.estimated_seconds_str, "3m20s");
        assert_eq!(report.actual_seconds_str, "1m20s");
    }

    #[test]
    fn empty_input_yields_undefined_concentration() {
        let report = TaskService::build_report(&[], &TimeWindow::degenerate(), TaskSortKey::default());
        assert!(report.groups.is_empty());
        assert_eq!(report.concentration, Ratio::Undefined);
        assert_eq!(report.actual_seconds_str, "0s");
    }
}
