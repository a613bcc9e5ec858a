//! Record store for habits and completions.
//!
//! Every function takes a `&mut SqliteConnection`, so the same calls work on a
//! pooled connection and inside an open transaction (`&mut tx`).

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CompletionRow, HabitRow};
use crate::services::calendar::DateRange;
use shared::{Completion, Habit, InvalidSlotError, TimeOfDay};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error(transparent)]
    InvalidSlot(#[from] InvalidSlotError),
    #[error("Invalid record id: {0}")]
    InvalidId(#[from] uuid::Error),
    #[error("Habit name must not be empty")]
    EmptyName,
    #[error("Habit not found")]
    NotFound,
}

/// Optional filters for [`query_habits`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HabitFilter {
    pub time_of_day: Option<TimeOfDay>,
    pub is_completed: Option<bool>,
}

impl HabitFilter {
    pub fn slot(time_of_day: TimeOfDay) -> Self {
        Self {
            time_of_day: Some(time_of_day),
            ..Self::default()
        }
    }
}

pub async fn begin(pool: &SqlitePool) -> Result<Transaction<'_, Sqlite>, StoreError> {
    Ok(pool.begin().await?)
}

/// Commit a unit of work. On failure the transaction is rolled back when dropped.
pub async fn commit(tx: Transaction<'_, Sqlite>) -> Result<(), StoreError> {
    tx.commit().await?;
    Ok(())
}

// ============================================================================
// Completions
// ============================================================================

fn push_completion_filters(
    query: &mut QueryBuilder<'_, Sqlite>,
    time_of_day: Option<TimeOfDay>,
    range: Option<DateRange>,
) {
    if let Some(slot) = time_of_day {
        query.push(" AND time_of_day = ").push_bind(slot.as_str());
    }
    if let Some(range) = range {
        query
            .push(" AND date >= ")
            .push_bind(range.start)
            .push(" AND date < ")
            .push_bind(range.end);
    }
}

pub async fn query_completions(
    conn: &mut SqliteConnection,
    time_of_day: Option<TimeOfDay>,
    range: Option<DateRange>,
) -> Result<Vec<Completion>, StoreError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM completions WHERE 1 = 1");
    push_completion_filters(&mut query, time_of_day, range);
    query.push(" ORDER BY date ASC");

    let rows = query.build_query_as::<CompletionRow>().fetch_all(&mut *conn).await?;
    rows.iter().map(CompletionRow::to_shared).collect()
}

pub async fn count_completions(
    conn: &mut SqliteConnection,
    time_of_day: Option<TimeOfDay>,
    range: DateRange,
) -> Result<i64, StoreError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM completions WHERE 1 = 1");
    push_completion_filters(&mut query, time_of_day, Some(range));

    let count = query
        .build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn insert_completion(
    conn: &mut SqliteConnection,
    completion: &Completion,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO completions (id, date, time_of_day) VALUES (?, ?, ?)")
        .bind(completion.id.to_string())
        .bind(completion.date)
        .bind(completion.time_of_day.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Delete every completion of `time_of_day` inside `range`. Returns the number removed.
pub async fn delete_completions(
    conn: &mut SqliteConnection,
    time_of_day: TimeOfDay,
    range: DateRange,
) -> Result<u64, StoreError> {
    let result =
        sqlx::query("DELETE FROM completions WHERE time_of_day = ? AND date >= ? AND date < ?")
            .bind(time_of_day.as_str())
            .bind(range.start)
            .bind(range.end)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

// ============================================================================
// Habits
// ============================================================================

/// Habits ordered by slot position; equal positions keep insertion order.
pub async fn query_habits(
    conn: &mut SqliteConnection,
    filter: HabitFilter,
) -> Result<Vec<Habit>, StoreError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM habits WHERE 1 = 1");
    if let Some(slot) = filter.time_of_day {
        query.push(" AND time_of_day = ").push_bind(slot.as_str());
    }
    if let Some(is_completed) = filter.is_completed {
        query.push(" AND is_completed = ").push_bind(is_completed);
    }
    query.push(" ORDER BY sort_order ASC, rowid ASC");

    let rows = query.build_query_as::<HabitRow>().fetch_all(&mut *conn).await?;
    rows.iter().map(HabitRow::to_shared).collect()
}

pub async fn get_habit(
    conn: &mut SqliteConnection,
    habit_id: &Uuid,
) -> Result<Option<Habit>, StoreError> {
    let row: Option<HabitRow> = sqlx::query_as("SELECT * FROM habits WHERE id = ?")
        .bind(habit_id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(HabitRow::to_shared).transpose()
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(())
}

pub async fn insert_habit(conn: &mut SqliteConnection, habit: &Habit) -> Result<(), StoreError> {
    validate_name(&habit.name)?;

    sqlx::query(
        r#"
        INSERT INTO habits (id, name, time_of_day, is_completed, streak, last_completed_date, sort_order)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(habit.id.to_string())
    .bind(&habit.name)
    .bind(habit.time_of_day.as_str())
    .bind(habit.is_completed)
    .bind(habit.streak)
    .bind(habit.last_completed_date)
    .bind(habit.order)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update_habit(conn: &mut SqliteConnection, habit: &Habit) -> Result<(), StoreError> {
    validate_name(&habit.name)?;

    let result = sqlx::query(
        r#"
        UPDATE habits
        SET name = ?, time_of_day = ?, is_completed = ?, streak = ?, last_completed_date = ?, sort_order = ?
        WHERE id = ?
        "#,
    )
    .bind(&habit.name)
    .bind(habit.time_of_day.as_str())
    .bind(habit.is_completed)
    .bind(habit.streak)
    .bind(habit.last_completed_date)
    .bind(habit.order)
    .bind(habit.id.to_string())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Returns `false` when no habit had that id.
pub async fn delete_habit(conn: &mut SqliteConnection, habit_id: &Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM habits WHERE id = ?")
        .bind(habit_id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Flip `is_completed` in place. Returns `false` when no habit had that id.
pub async fn flip_completed(
    conn: &mut SqliteConnection,
    habit_id: &Uuid,
) -> Result<bool, StoreError> {
    let result = sqlx::query("UPDATE habits SET is_completed = NOT is_completed WHERE id = ?")
        .bind(habit_id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Clear the "done today" flag on every habit. Returns the number of flags cleared.
pub async fn clear_completed_flags(conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    let result = sqlx::query("UPDATE habits SET is_completed = FALSE WHERE is_completed = TRUE")
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Position for a habit appended to the end of `time_of_day`
pub async fn next_order(
    conn: &mut SqliteConnection,
    time_of_day: TimeOfDay,
) -> Result<i32, StoreError> {
    let max_order: Option<i32> =
        sqlx::query_scalar("SELECT MAX(sort_order) FROM habits WHERE time_of_day = ?")
            .bind(time_of_day.as_str())
            .fetch_one(&mut *conn)
            .await?;

    Ok(max_order.map_or(0, |order| order + 1))
}
