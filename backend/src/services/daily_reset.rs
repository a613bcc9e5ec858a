use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::SqliteConnection;

use crate::services::calendar;
use crate::services::store::{self, StoreError};

/// Whether the "done today" flags still belong to an earlier local day.
pub fn reset_due(now: DateTime<Utc>, last_reset: Option<DateTime<Utc>>, tz: Tz) -> bool {
    match last_reset {
        Some(last_reset) => calendar::start_of_day(last_reset, tz) < calendar::start_of_day(now, tz),
        None => true,
    }
}

/// Clear every habit's completed flag once per local day.
///
/// Returns the new reset marker (`now`) when a reset happened. Runs on the given
/// connection without committing: the caller wraps it in the transaction that
/// also reads and stores the marker. Streaks and completion records are left
/// untouched.
pub async fn reset_if_needed(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
    last_reset: Option<DateTime<Utc>>,
    tz: Tz,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    if !reset_due(now, last_reset, tz) {
        log::debug!("Daily reset already done for {}", calendar::local_date(now, tz));
        return Ok(None);
    }

    let cleared = store::clear_completed_flags(conn).await?;
    log::debug!(
        "Daily reset for {}: clearing {} completed habit(s)",
        calendar::local_date(now, tz),
        cleared
    );
    Ok(Some(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completions::toggle_habit;
    use crate::services::store::test_support::setup_test_db;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Europe;
    use sqlx::SqlitePool;
    use shared::{Habit, TimeOfDay};
    use uuid::Uuid;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    async fn add_habit(pool: &SqlitePool, name: &str, time_of_day: TimeOfDay) -> Habit {
        let mut conn = pool.acquire().await.unwrap();
        let habit = Habit {
            id: Uuid::new_v4(),
            name: name.to_string(),
            time_of_day,
            is_completed: false,
            streak: 0,
            last_completed_date: None,
            order: 0,
        };
        store::insert_habit(&mut conn, &habit).await.unwrap();
        habit
    }

    async fn all_habits(pool: &SqlitePool) -> Vec<Habit> {
        let mut conn = pool.acquire().await.unwrap();
        store::query_habits(&mut conn, store::HabitFilter::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_reset_due() {
        let tz = chrono_tz::UTC;
        let now = utc(2024, 1, 10, 8, 0, 0);

        assert!(reset_due(now, None, tz));
        assert!(reset_due(now, Some(utc(2024, 1, 9, 23, 59, 59)), tz));
        assert!(!reset_due(now, Some(utc(2024, 1, 10, 0, 0, 0)), tz));
        assert!(!reset_due(now, Some(utc(2024, 1, 10, 7, 0, 0)), tz));
        // A marker from the future still counts as already reset
        assert!(!reset_due(now, Some(utc(2024, 1, 12, 0, 0, 0)), tz));
    }

    #[test]
    fn test_reset_due_uses_local_days() {
        // 21:30 UTC Jan 9 is 23:30 in Helsinki, 22:30 UTC is 00:30 Jan 10
        let last_reset = utc(2024, 1, 9, 21, 30, 0);
        let now = utc(2024, 1, 9, 22, 30, 0);

        assert!(reset_due(now, Some(last_reset), Europe::Helsinki));
        assert!(!reset_due(now, Some(last_reset), chrono_tz::UTC));
    }

    #[tokio::test]
    async fn test_reset_clears_flags_only() {
        let pool = setup_test_db().await;
        let read = add_habit(&pool, "Read", TimeOfDay::Evening).await;
        let walk = add_habit(&pool, "Walk", TimeOfDay::Afternoon).await;
        let yesterday = utc(2024, 1, 9, 20, 0, 0);
        toggle_habit(&pool, &read.id, yesterday, chrono_tz::UTC).await.unwrap();
        toggle_habit(&pool, &walk.id, yesterday, chrono_tz::UTC).await.unwrap();
        let before = all_habits(&pool).await;

        let now = utc(2024, 1, 10, 0, 0, 5);
        let mut conn = pool.acquire().await.unwrap();
        let marker = reset_if_needed(&mut conn, now, Some(yesterday - Duration::hours(12)), chrono_tz::UTC)
            .await
            .unwrap();
        assert_eq!(marker, Some(now));
        drop(conn);

        let after = all_habits(&pool).await;
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after.iter()) {
            assert!(old.is_completed);
            assert!(!new.is_completed);
            assert_eq!(old.streak, new.streak);
            assert_eq!(old.last_completed_date, new.last_completed_date);
        }

        let mut conn = pool.acquire().await.unwrap();
        let records = store::query_completions(&mut conn, None, None).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_second_reset_same_day_is_noop() {
        let pool = setup_test_db().await;
        let read = add_habit(&pool, "Read", TimeOfDay::Evening).await;
        let tz = chrono_tz::UTC;

        let mut conn = pool.acquire().await.unwrap();
        let marker = reset_if_needed(&mut conn, utc(2024, 1, 10, 6, 0, 0), None, tz)
            .await
            .unwrap();
        assert_eq!(marker, Some(utc(2024, 1, 10, 6, 0, 0)));
        drop(conn);

        toggle_habit(&pool, &read.id, utc(2024, 1, 10, 7, 0, 0), tz).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let second = reset_if_needed(&mut conn, utc(2024, 1, 10, 22, 0, 0), marker, tz)
            .await
            .unwrap();
        assert_eq!(second, None);
        drop(conn);
        assert!(all_habits(&pool).await[0].is_completed);
    }
}
