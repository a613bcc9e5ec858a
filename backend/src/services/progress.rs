use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::SqlitePool;
use std::collections::HashMap;
use thiserror::Error;

use crate::services::calendar::{self, DateRange};
use crate::services::store::{self, HabitFilter, StoreError};
use shared::{
    CalendarDay, CalendarMonth, Completion, DayCompletion, Habit, ProgressSummary, SlotProgress,
    TimeOfDay,
};

/// Days covered by the weekly history
pub const HISTORY_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Completed vs. total habits per slot, from the "done today" flags
pub async fn progress_summary(pool: &SqlitePool) -> Result<ProgressSummary, ProgressError> {
    let mut conn = pool.acquire().await.map_err(StoreError::from)?;
    let habits = store::query_habits(&mut conn, HabitFilter::default()).await?;
    Ok(summarize(&habits))
}

fn summarize(habits: &[Habit]) -> ProgressSummary {
    let slots = TimeOfDay::ALL
        .iter()
        .map(|&time_of_day| {
            let in_slot = habits.iter().filter(|h| h.time_of_day == time_of_day);
            let total = in_slot.clone().count() as u32;
            let completed = in_slot.filter(|h| h.is_completed).count() as u32;
            SlotProgress {
                time_of_day,
                completed,
                total,
                percent: ratio(completed, total),
            }
        })
        .collect();

    ProgressSummary { slots }
}

fn ratio(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

/// Per-day slot completion for a calendar month.
///
/// A slot counts as complete on a day when it has habits and at least as many
/// completion records as habits.
pub async fn calendar_month(
    pool: &SqlitePool,
    year: i32,
    month: u32,
    tz: Tz,
) -> Result<CalendarMonth, ProgressError> {
    let dates = calendar::month_dates(year, month).ok_or(ProgressError::InvalidMonth { year, month })?;
    let (first, last) = match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(ProgressError::InvalidMonth { year, month }),
    };

    let mut conn = pool.acquire().await.map_err(StoreError::from)?;
    let habits = store::query_habits(&mut conn, HabitFilter::default()).await?;
    let window = DateRange {
        start: calendar::start_of_date(first, tz),
        end: calendar::start_of_date(last + Duration::days(1), tz),
    };
    let completions = store::query_completions(&mut conn, None, Some(window)).await?;

    let habits_per_slot = count_habits_per_slot(&habits);
    let days = dates
        .into_iter()
        .map(|date| calendar_day(date, &completions, &habits_per_slot, tz))
        .collect();

    Ok(CalendarMonth { year, month, days })
}

fn count_habits_per_slot(habits: &[Habit]) -> HashMap<TimeOfDay, i64> {
    let mut counts = HashMap::new();
    for habit in habits {
        *counts.entry(habit.time_of_day).or_insert(0) += 1;
    }
    counts
}

fn calendar_day(
    date: NaiveDate,
    completions: &[Completion],
    habits_per_slot: &HashMap<TimeOfDay, i64>,
    tz: Tz,
) -> CalendarDay {
    let range = calendar::date_range(date, tz);
    let complete_slots: Vec<TimeOfDay> = TimeOfDay::ALL
        .iter()
        .copied()
        .filter(|slot| {
            let habit_count = habits_per_slot.get(slot).copied().unwrap_or(0);
            let done = completions
                .iter()
                .filter(|c| c.time_of_day == *slot && range.contains(c.date))
                .count() as i64;
            habit_count > 0 && done >= habit_count
        })
        .collect();

    CalendarDay {
        date,
        perfect_day: complete_slots.len() == TimeOfDay::ALL.len(),
        complete_slots,
    }
}

/// Completions per day over the last week, oldest first
pub async fn weekly_history(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Vec<DayCompletion>, ProgressError> {
    let mut conn = pool.acquire().await.map_err(StoreError::from)?;

    let mut dates = calendar::trailing_dates(calendar::local_date(now, tz), HISTORY_DAYS);
    dates.reverse();

    let mut history = Vec::with_capacity(dates.len());
    for date in dates {
        let completions = store::count_completions(&mut conn, None, calendar::date_range(date, tz)).await?;
        history.push(DayCompletion {
            date,
            completions,
            percent: day_percent(completions),
        });
    }
    Ok(history)
}

/// Share of the day's slots covered, capped at a full day
fn day_percent(completions: i64) -> f64 {
    (completions as f64 / TimeOfDay::ALL.len() as f64).min(1.0)
}
