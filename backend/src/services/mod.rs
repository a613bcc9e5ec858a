pub mod background_jobs;
pub mod calendar;
pub mod completions;
pub mod daily_reset;
pub mod habits;
pub mod progress;
pub mod settings;
pub mod store;
