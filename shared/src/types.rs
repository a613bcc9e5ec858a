use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Time of Day
// ============================================================================

/// The slot of the day a habit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// All slots in display order.
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored slot tag that is not one of the known slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid time of day: {0:?}")]
pub struct InvalidSlotError(pub String);

impl FromStr for TimeOfDay {
    type Err = InvalidSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Morning" => Ok(TimeOfDay::Morning),
            "Afternoon" => Ok(TimeOfDay::Afternoon),
            "Evening" => Ok(TimeOfDay::Evening),
            _ => Err(InvalidSlotError(s.to_string())),
        }
    }
}

// ============================================================================
// Habit Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub time_of_day: TimeOfDay,
    /// "Done today" flag, cleared by the daily reset.
    pub is_completed: bool,
    pub streak: u32,
    pub last_completed_date: Option<DateTime<Utc>>,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    pub time_of_day: TimeOfDay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
}

/// Moves the habit at position `from` of a slot so it lands before the habit
/// currently at position `to` (`to == len` appends).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveHabitRequest {
    pub time_of_day: TimeOfDay,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitSection {
    pub time_of_day: TimeOfDay,
    pub habits: Vec<Habit>,
}

// ============================================================================
// Completion Types
// ============================================================================

/// A completion is keyed by slot and timestamp only, not by habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub time_of_day: TimeOfDay,
}

// ============================================================================
// Progress Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotProgress {
    pub time_of_day: TimeOfDay,
    pub completed: u32,
    pub total: u32,
    /// 0.0 ..= 1.0
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub slots: Vec<SlotProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub complete_slots: Vec<TimeOfDay>,
    pub perfect_day: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCompletion {
    pub date: NaiveDate,
    pub completions: i64,
    pub percent: f64,
}

// ============================================================================
// Daily Reset Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetOutcome {
    /// Whether completion flags were cleared by this run.
    pub reset: bool,
    pub last_reset: Option<DateTime<Utc>>,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_from_str() {
        assert_eq!("Morning".parse(), Ok(TimeOfDay::Morning));
        assert_eq!("Afternoon".parse(), Ok(TimeOfDay::Afternoon));
        assert_eq!("Evening".parse(), Ok(TimeOfDay::Evening));
        // Tags are exact, other spellings would not match slot queries
        assert_eq!(
            "morning".parse::<TimeOfDay>(),
            Err(InvalidSlotError("morning".to_string()))
        );
        assert!("EVENING".parse::<TimeOfDay>().is_err());
        assert_eq!(
            "Night".parse::<TimeOfDay>(),
            Err(InvalidSlotError("Night".to_string()))
        );
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_of_day_as_str_matches_stored_tag() {
        for slot in TimeOfDay::ALL {
            assert_eq!(slot.as_str().parse(), Ok(slot));
            assert_eq!(slot.to_string(), slot.as_str());
        }
    }

    #[test]
    fn test_time_of_day_serializes_as_tag() {
        let json = serde_json::to_string(&TimeOfDay::Afternoon).unwrap();
        assert_eq!(json, "\"Afternoon\"");

        let parsed: TimeOfDay = serde_json::from_str("\"Evening\"").unwrap();
        assert_eq!(parsed, TimeOfDay::Evening);
        assert!(serde_json::from_str::<TimeOfDay>("\"Noon\"").is_err());
    }

    #[test]
    fn test_invalid_slot_error_display() {
        let err = InvalidSlotError("Noon".to_string());
        assert_eq!(err.to_string(), "Invalid time of day: \"Noon\"");
    }

    #[test]
    fn test_api_success() {
        let success = ApiSuccess::new("test data");
        assert_eq!(success.data, "test data");
    }
}
