use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tokio::time;

use crate::services::store::{self, StoreError};
use crate::services::{calendar, daily_reset, settings};
use shared::ResetOutcome;

#[derive(Debug, Error)]
pub enum BackgroundJobError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Settings error: {0}")]
    SettingsError(#[from] settings::SettingsError),
}

/// Configuration for the background job scheduler
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Time zone whose midnight triggers the daily reset
    pub timezone: Tz,
    /// Seconds to wait past local midnight before resetting
    pub delay_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            delay_secs: 5,
        }
    }
}

/// Run the daily reset against the persisted marker and store the new marker.
///
/// Reading the marker, clearing the flags and writing the new marker commit
/// together, so a failed marker write also undoes the clear.
pub async fn run_daily_reset(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<ResetOutcome, BackgroundJobError> {
    let mut tx = store::begin(pool).await?;

    let last_reset = settings::claim_last_daily_reset(&mut tx, now).await?;
    let outcome = match daily_reset::reset_if_needed(&mut tx, now, last_reset, tz).await? {
        Some(marker) => {
            settings::set_last_daily_reset(&mut tx, marker).await?;
            ResetOutcome {
                reset: true,
                last_reset: Some(marker),
            }
        }
        None => ResetOutcome {
            reset: false,
            last_reset,
        },
    };

    store::commit(tx).await?;

    if outcome.reset {
        log::info!("Daily reset done for {}", calendar::local_date(now, tz));
    }
    Ok(outcome)
}

/// When the next reset check should run: just after the coming local midnight.
pub fn next_run_at(now: DateTime<Utc>, config: &JobConfig) -> DateTime<Utc> {
    let tomorrow = calendar::local_date(now, config.timezone) + Duration::days(1);
    calendar::start_of_date(tomorrow, config.timezone) + Duration::seconds(config.delay_secs as i64)
}

/// Start the background job scheduler
/// Resets once on startup, then again after every local midnight
pub async fn start_scheduler(pool: Arc<SqlitePool>, config: JobConfig) {
    log::info!(
        "Background job scheduler started. Daily reset runs {}s after midnight ({})",
        config.delay_secs,
        config.timezone
    );

    loop {
        match run_daily_reset(&pool, Utc::now(), config.timezone).await {
            Ok(outcome) if outcome.reset => log::debug!("Scheduled daily reset complete"),
            Ok(_) => log::debug!("Daily reset not due"),
            Err(e) => log::error!("Error running daily reset: {}", e),
        }

        let now = Utc::now();
        let sleep_duration = (next_run_at(now, &config) - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(3600));

        log::debug!(
            "Next daily reset check scheduled in {} seconds",
            sleep_duration.as_secs()
        );

        time::sleep(sleep_duration).await;
    }
}
