//! Report windows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` interval of instants, together with the first
/// and last calendar day it covers in the timezone it was computed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "startISO")]
    pub start_iso: String,
    #[serde(rename = "endISO")]
    pub end_iso: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl TimeWindow {
    /// Builds a window; an `end` before `start` collapses onto `start`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> Self {
        let end = end.max(start);
        Self {
            start,
            end,
            start_iso: format_iso8601(start),
            end_iso: format_iso8601(end),
            first_day,
            last_day: last_day.max(first_day),
        }
    }

    /// The `{start: 0, end: 0}` sentinel meaning "no filtering".
    pub fn degenerate() -> Self {
        let epoch = epoch();
        let day = epoch.date_naive();
        Self::new(epoch, epoch, day, day)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == epoch() && self.end == epoch()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.first_day == self.last_day
    }

    /// `YYYY-MM-DD` for single-day windows, `YYYY-MM-DD - YYYY-MM-DD` otherwise.
    pub fn label(&self) -> String {
        let first = self.first_day.format("%Y-%m-%d");
        if self.is_single_day() {
            first.to_string()
        } else {
            format!("{} - {}", first, self.last_day.format("%Y-%m-%d"))
        }
    }
}

/// 1970-01-01T00:00:00Z.
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(NaiveDateTime::default(), Utc)
}

/// Second-precision ISO 8601 in UTC, e.g. `2024-01-15T16:00:00Z`.
pub fn format_iso8601(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
