use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::store::StoreError;

/// Database model for completions
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompletionRow {
    pub id: String,
    pub date: DateTime<Utc>,
    pub time_of_day: String,
}

impl CompletionRow {
    pub fn to_shared(&self) -> Result<shared::Completion, StoreError> {
        Ok(shared::Completion {
            id: Uuid::parse_str(&self.id)?,
            date: self.date,
            time_of_day: self.time_of_day.parse()?,
        })
    }
}
