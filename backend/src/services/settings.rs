//! Application settings kept in `app_settings`.
//!
//! Functions take a `&mut SqliteConnection` so the reset marker can be read and
//! written in the same transaction as the reset itself.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use thiserror::Error;

/// Key under which the time of the last daily reset is kept
pub const LAST_DAILY_RESET_KEY: &str = "last_daily_reset";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Setting {key} holds an invalid timestamp: {value:?}")]
    InvalidTimestamp { key: &'static str, value: String },
}

fn parse_marker(value: Option<String>) -> Result<Option<DateTime<Utc>>, SettingsError> {
    value
        .map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|_| SettingsError::InvalidTimestamp {
                    key: LAST_DAILY_RESET_KEY,
                    value,
                })
        })
        .transpose()
}

/// When the daily reset last ran, if ever.
///
/// Reads with a write statement that stamps `updated_at` with `checked_at`.
/// Inside a transaction this takes SQLite's write lock before the marker is
/// read, so a second caller waits instead of acting on the same stale marker.
pub async fn claim_last_daily_reset(
    conn: &mut SqliteConnection,
    checked_at: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, SettingsError> {
    let value: Option<String> =
        sqlx::query_scalar("UPDATE app_settings SET updated_at = ? WHERE key = ? RETURNING value")
            .bind(checked_at)
            .bind(LAST_DAILY_RESET_KEY)
            .fetch_optional(&mut *conn)
            .await?;

    parse_marker(value)
}

pub async fn set_last_daily_reset(
    conn: &mut SqliteConnection,
    at: DateTime<Utc>,
) -> Result<(), SettingsError> {
    sqlx::query(
        r#"
        INSERT INTO app_settings (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(LAST_DAILY_RESET_KEY)
    .bind(at.to_rfc3339())
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
