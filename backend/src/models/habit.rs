use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::store::StoreError;

/// Database model for habits
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HabitRow {
    pub id: String,
    pub name: String,
    pub time_of_day: String,
    pub is_completed: bool,
    pub streak: u32,
    pub last_completed_date: Option<DateTime<Utc>>,
    pub sort_order: i32,
}

impl HabitRow {
    /// Fails on an unknown slot tag instead of falling back to a default slot.
    pub fn to_shared(&self) -> Result<shared::Habit, StoreError> {
        Ok(shared::Habit {
            id: Uuid::parse_str(&self.id)?,
            name: self.name.clone(),
            time_of_day: self.time_of_day.parse()?,
            is_completed: self.is_completed,
            streak: self.streak,
            last_completed_date: self.last_completed_date,
            order: self.sort_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TimeOfDay;

    fn row(time_of_day: &str) -> HabitRow {
        HabitRow {
            id: Uuid::new_v4().to_string(),
            name: "Drink water".to_string(),
            time_of_day: time_of_day.to_string(),
            is_completed: true,
            streak: 4,
            last_completed_date: Some(Utc::now()),
            sort_order: 2,
        }
    }

    #[test]
    fn test_habit_row_to_shared() {
        let row = row("Evening");
        let habit = row.to_shared().unwrap();

        assert_eq!(habit.id.to_string(), row.id);
        assert_eq!(habit.name, "Drink water");
        assert_eq!(habit.time_of_day, TimeOfDay::Evening);
        assert!(habit.is_completed);
        assert_eq!(habit.streak, 4);
        assert_eq!(habit.order, 2);
        assert_eq!(habit.last_completed_date, row.last_completed_date);
    }

    #[test]
    fn test_habit_row_with_unknown_slot_is_rejected() {
        let err = row("Night").to_shared().unwrap_err();
        assert!(matches!(err, StoreError::InvalidSlot(_)));
    }

    #[test]
    fn test_habit_row_with_bad_id_is_rejected() {
        let mut row = row("Morning");
        row.id = "not-a-uuid".to_string();
        assert!(matches!(row.to_shared(), Err(StoreError::InvalidId(_))));
    }
}
