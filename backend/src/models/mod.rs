use sqlx::SqlitePool;

use crate::config::Config;

pub mod completion;
pub mod habit;

pub use completion::*;
pub use habit::*;

/// Application state shared across all handlers
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}
