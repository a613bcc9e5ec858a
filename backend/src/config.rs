use chrono_tz::Tz;
use std::env;
use thiserror::Error;

/// Exclusive upper bound for `DAILY_RESET_DELAY_SECS`: the reset has to run on the day it is for.
pub const MAX_DAILY_RESET_DELAY_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be below {max}, got {value}")]
    OutOfRange { var: &'static str, value: u64, max: u64 },
    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Time zone whose midnight separates one habit day from the next.
    pub timezone: Tz,
    pub cors_origins: Vec<String>,
    pub daily_reset_delay_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timezone_name = env::var("TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(timezone_name.clone()))?;

        let daily_reset_delay_secs: u64 = parse_number("DAILY_RESET_DELAY_SECS", "5")?;
        if daily_reset_delay_secs >= MAX_DAILY_RESET_DELAY_SECS {
            return Err(ConfigError::OutOfRange {
                var: "DAILY_RESET_DELAY_SECS",
                value: daily_reset_delay_secs,
                max: MAX_DAILY_RESET_DELAY_SECS,
            });
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_number("PORT", "8080")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:habits.db?mode=rwc".to_string()),
            timezone,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            daily_reset_delay_secs,
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}
