use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::services::calendar;
use crate::services::store::{self, StoreError};
use shared::{Completion, Habit, TimeOfDay};

/// Days scanned for a streak: today plus the six days before it.
pub const STREAK_WINDOW_DAYS: i64 = 7;

/// Added to the streak when every slot has a completion today.
pub const PERFECT_DAY_BONUS: u32 = 1;

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("Habit not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Flip a habit's "done today" state and recompute its streak.
///
/// Marking done records one completion for the habit's slot at `now`. Marking
/// undone deletes every completion of that slot within today. The flag, the
/// completion records and the new streak are committed together.
pub async fn toggle_habit(
    pool: &SqlitePool,
    habit_id: &Uuid,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Habit, ToggleError> {
    let mut tx = store::begin(pool).await?;

    // Write first so the transaction holds the write lock for the whole read-modify-write.
    if !store::flip_completed(&mut tx, habit_id).await? {
        return Err(ToggleError::NotFound);
    }
    let mut habit = store::get_habit(&mut tx, habit_id)
        .await?
        .ok_or(ToggleError::NotFound)?;

    let today = calendar::day_range(now, tz);

    if habit.is_completed {
        store::insert_completion(
            &mut tx,
            &Completion {
                id: Uuid::new_v4(),
                date: now,
                time_of_day: habit.time_of_day,
            },
        )
        .await?;
        habit.last_completed_date = Some(now);
    } else {
        let removed = store::delete_completions(&mut tx, habit.time_of_day, today).await?;
        log::debug!(
            "Removed {} {} completion(s) for today",
            removed,
            habit.time_of_day
        );
    }

    habit.streak = calculate_streak(&mut tx, habit.time_of_day, now, tz).await?;
    store::update_habit(&mut tx, &habit).await?;
    store::commit(tx).await?;

    log::info!(
        "Habit {} marked {} (streak {})",
        habit.id,
        if habit.is_completed { "done" } else { "not done" },
        habit.streak
    );

    Ok(habit)
}

/// Consecutive days, ending today, with at least one completion in `time_of_day`,
/// looking back at most [`STREAK_WINDOW_DAYS`], plus the perfect day bonus.
pub async fn calculate_streak(
    conn: &mut SqliteConnection,
    time_of_day: TimeOfDay,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<u32, StoreError> {
    let mut daily_counts = Vec::new();
    for date in calendar::trailing_dates(calendar::local_date(now, tz), STREAK_WINDOW_DAYS) {
        let count =
            store::count_completions(conn, Some(time_of_day), calendar::date_range(date, tz))
                .await?;
        daily_counts.push(count);
        if count == 0 {
            break;
        }
    }

    let today = store::query_completions(conn, None, Some(calendar::day_range(now, tz))).await?;
    let slots: HashSet<TimeOfDay> = today.iter().map(|c| c.time_of_day).collect();

    Ok(streak_from_counts(&daily_counts) + perfect_day_bonus(&slots))
}

/// Length of the leading run of non-zero counts (newest day first).
pub fn streak_from_counts(daily_counts: &[i64]) -> u32 {
    daily_counts.iter().take_while(|&&count| count > 0).count() as u32
}

pub fn perfect_day_bonus(completed_slots: &HashSet<TimeOfDay>) -> u32 {
    if completed_slots.len() == TimeOfDay::ALL.len() {
        PERFECT_DAY_BONUS
    } else {
        0
    }
}
