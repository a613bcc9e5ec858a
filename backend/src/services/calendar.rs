//! Local calendar day boundaries.
//!
//! Timestamps are stored in UTC, but a "day" for habits is a day of the
//! configured local time zone. All windows are half-open: `[start, end)`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Upper bound on the 15 minute steps searched for the first valid local time of a day.
const DAY_START_SEARCH_STEPS: i64 = 24 * 4;

/// A half-open `[start, end)` window of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Calendar date of `instant` in `tz`
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// First instant of `date` in `tz`.
///
/// When a DST transition skips local midnight the day starts at the first local
/// time that exists; when midnight happens twice the earlier one is used.
pub fn start_of_date(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=DAY_START_SEARCH_STEPS)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Start of the local day containing `instant`
pub fn start_of_day(instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    start_of_date(local_date(instant, tz), tz)
}

/// Window covering the whole local `date`
pub fn date_range(date: NaiveDate, tz: Tz) -> DateRange {
    DateRange {
        start: start_of_date(date, tz),
        end: start_of_date(date + Duration::days(1), tz),
    }
}

/// Window covering the local day containing `instant`
pub fn day_range(instant: DateTime<Utc>, tz: Tz) -> DateRange {
    date_range(local_date(instant, tz), tz)
}

/// `today` followed by the `count - 1` dates before it, newest first.
pub fn trailing_dates(today: NaiveDate, count: i64) -> Vec<NaiveDate> {
    (0..count).map(|offset| today - Duration::days(offset)).collect()
}

/// Every date of the given month, or `None` for an invalid year/month.
pub fn month_dates(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(
        first
            .iter_days()
            .take_while(|date| date.month() == month)
            .collect(),
    )
}
