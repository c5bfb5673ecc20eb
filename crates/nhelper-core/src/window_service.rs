//! Day/week/month window computation in a fixed timezone.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use nhelper_domain::{PeriodKind, TimeWindow};

use crate::time::Clock;

/// Calendar settings every window is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    pub timezone: Tz,
    pub week_start: Weekday,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Shanghai,
            week_start: Weekday::Sun,
        }
    }
}

/// Computes half-open `[start, end)` report windows.
pub struct WindowService;

impl WindowService {
    /// Window of `kind` containing `reference`, with boundaries at local
    /// midnight in `settings.timezone`. Unrecognized kinds yield the
    /// degenerate window.
    pub fn compute_window(
        kind: PeriodKind,
        reference: DateTime<Utc>,
        settings: &WindowSettings,
    ) -> TimeWindow {
        let local_day = reference.with_timezone(&settings.timezone).date_naive();
        let (first, next) = match kind {
            PeriodKind::Day => (local_day, local_day + Duration::days(1)),
            PeriodKind::Week => {
                let offset = days_since_week_start(local_day.weekday(), settings.week_start);
                let first = local_day - Duration::days(offset);
                (first, first + Duration::days(7))
            }
            PeriodKind::Month => {
                let first = local_day.with_day(1).unwrap_or(local_day);
                let next = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(first + Duration::days(31));
                (first, next)
            }
            PeriodKind::Unrecognized => return TimeWindow::degenerate(),
        };
        let start = local_midnight(settings.timezone, first);
        let end = local_midnight(settings.timezone, next);
        let last = next.pred_opt().unwrap_or(first);
        TimeWindow::new(start, end, first, last)
    }

    /// Same as [`WindowService::compute_window`], defaulting the reference
    /// instant to the clock's current time.
    pub fn window_at(
        kind: PeriodKind,
        reference: Option<DateTime<Utc>>,
        settings: &WindowSettings,
        clock: &dyn Clock,
    ) -> TimeWindow {
        let reference = reference.unwrap_or_else(|| clock.now());
        Self::compute_window(kind, reference, settings)
    }
}

fn days_since_week_start(day: Weekday, week_start: Weekday) -> i64 {
    let day = day.num_days_from_monday() as i64;
    let start = week_start.num_days_from_monday() as i64;
    (day - start).rem_euclid(7)
}

/// First instant of `date` in `tz`. When midnight falls inside a DST gap the
/// day starts at the end of the gap.
pub(crate) fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(instant) => instant.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let after_gap = midnight + Duration::hours(1);
            tz.from_local_datetime(&after_gap)
                .earliest()
                .map(|instant| instant.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        }
    }
}
