use actix_web::{web, HttpResponse, Result};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use shared::{ApiError, ApiSuccess};

use crate::models::AppState;
use crate::services::calendar;
use crate::services::progress::{self as progress_service, ProgressError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/progress")
            .route("/summary", web::get().to(get_summary))
            .route("/calendar", web::get().to(get_calendar))
            .route("/history", web::get().to(get_history)),
    );
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

fn internal_error(action: &str, e: ProgressError) -> HttpResponse {
    log::error!("Error loading {}: {:?}", action, e);
    HttpResponse::InternalServerError().json(ApiError {
        error: "internal_error".to_string(),
        message: format!("Failed to load {}", action),
    })
}

async fn get_summary(state: web::Data<AppState>) -> Result<HttpResponse> {
    match progress_service::progress_summary(&state.db).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiSuccess::new(summary))),
        Err(e) => Ok(internal_error("progress summary", e)),
    }
}

/// Defaults to the current local month
async fn get_calendar(
    state: web::Data<AppState>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse> {
    let tz = state.config.timezone;
    let today = calendar::local_date(Utc::now(), tz);
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    match progress_service::calendar_month(&state.db, year, month, tz).await {
        Ok(calendar) => Ok(HttpResponse::Ok().json(ApiSuccess::new(calendar))),
        Err(e @ ProgressError::InvalidMonth { .. }) => Ok(HttpResponse::BadRequest().json(ApiError {
            error: "invalid_month".to_string(),
            message: e.to_string(),
        })),
        Err(e) => Ok(internal_error("calendar", e)),
    }
}

async fn get_history(state: web::Data<AppState>) -> Result<HttpResponse> {
    match progress_service::weekly_history(&state.db, Utc::now(), state.config.timezone).await {
        Ok(history) => Ok(HttpResponse::Ok().json(ApiSuccess::new(history))),
        Err(e) => Ok(internal_error("history", e)),
    }
}
