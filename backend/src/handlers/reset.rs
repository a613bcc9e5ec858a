use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use shared::{ApiError, ApiSuccess};

use crate::models::AppState;
use crate::services::background_jobs;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/daily-reset", web::post().to(daily_reset));
}

/// Runs the daily reset on demand, e.g. when a client comes to the foreground.
/// A no-op when the reset already happened today.
async fn daily_reset(state: web::Data<AppState>) -> Result<HttpResponse> {
    match background_jobs::run_daily_reset(&state.db, Utc::now(), state.config.timezone).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(ApiSuccess::new(outcome))),
        Err(e) => {
            log::error!("Error running daily reset: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to run daily reset".to_string(),
            }))
        }
    }
}
