use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use shared::{ApiError, ApiSuccess, CreateHabitRequest, MoveHabitRequest, UpdateHabitRequest};
use uuid::Uuid;

use crate::models::AppState;
use crate::services::completions::{self as completion_service, ToggleError};
use crate::services::habits::{self as habit_service, HabitError};
use crate::services::store::StoreError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/habits")
            .route("", web::get().to(list_habits))
            .route("", web::post().to(create_habit))
            .route("/move", web::post().to(move_habit))
            .route("/{habit_id}", web::get().to(get_habit))
            .route("/{habit_id}", web::put().to(update_habit))
            .route("/{habit_id}", web::delete().to(delete_habit))
            .route("/{habit_id}/toggle", web::post().to(toggle_habit)),
    );
}

fn parse_habit_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        HttpResponse::BadRequest().json(ApiError {
            error: "invalid_id".to_string(),
            message: "Invalid habit ID format".to_string(),
        })
    })
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiError {
        error: "not_found".to_string(),
        message: "Habit not found".to_string(),
    })
}

fn habit_error_response(e: HabitError, action: &str) -> HttpResponse {
    match e {
        HabitError::NotFound | HabitError::Store(StoreError::NotFound) => not_found(),
        HabitError::Store(StoreError::EmptyName) => HttpResponse::BadRequest().json(ApiError {
            error: "validation_error".to_string(),
            message: "Habit name is required".to_string(),
        }),
        invalid @ HabitError::InvalidMove { .. } => HttpResponse::BadRequest().json(ApiError {
            error: "invalid_move".to_string(),
            message: invalid.to_string(),
        }),
        HabitError::Store(e) => {
            log::error!("Error trying to {}: {:?}", action, e);
            HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: format!("Failed to {}", action),
            })
        }
    }
}

async fn list_habits(state: web::Data<AppState>) -> Result<HttpResponse> {
    match habit_service::list_sections(&state.db).await {
        Ok(sections) => Ok(HttpResponse::Ok().json(ApiSuccess::new(sections))),
        Err(e) => Ok(habit_error_response(e, "list habits")),
    }
}

async fn create_habit(
    state: web::Data<AppState>,
    body: web::Json<CreateHabitRequest>,
) -> Result<HttpResponse> {
    match habit_service::create_habit(&state.db, &body.into_inner()).await {
        Ok(habit) => Ok(HttpResponse::Created().json(ApiSuccess::new(habit))),
        Err(e) => Ok(habit_error_response(e, "create habit")),
    }
}

async fn get_habit(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let habit_id = match parse_habit_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match habit_service::get_habit(&state.db, &habit_id).await {
        Ok(habit) => Ok(HttpResponse::Ok().json(ApiSuccess::new(habit))),
        Err(e) => Ok(habit_error_response(e, "get habit")),
    }
}

async fn update_habit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateHabitRequest>,
) -> Result<HttpResponse> {
    let habit_id = match parse_habit_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match habit_service::update_habit(&state.db, &habit_id, &body.into_inner()).await {
        Ok(habit) => Ok(HttpResponse::Ok().json(ApiSuccess::new(habit))),
        Err(e) => Ok(habit_error_response(e, "update habit")),
    }
}

async fn delete_habit(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let habit_id = match parse_habit_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match habit_service::delete_habit(&state.db, &habit_id).await {
        Ok(_) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(habit_error_response(e, "delete habit")),
    }
}

async fn move_habit(
    state: web::Data<AppState>,
    body: web::Json<MoveHabitRequest>,
) -> Result<HttpResponse> {
    match habit_service::move_habit(&state.db, &body.into_inner()).await {
        Ok(habits) => Ok(HttpResponse::Ok().json(ApiSuccess::new(habits))),
        Err(e) => Ok(habit_error_response(e, "move habit")),
    }
}

async fn toggle_habit(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let habit_id = match parse_habit_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match completion_service::toggle_habit(&state.db, &habit_id, Utc::now(), state.config.timezone).await {
        Ok(habit) => Ok(HttpResponse::Ok().json(ApiSuccess::new(habit))),
        Err(ToggleError::NotFound) => Ok(not_found()),
        Err(e) => {
            log::error!("Error toggling habit {}: {:?}", habit_id, e);
            Ok(HttpResponse::InternalServerError().json(ApiError {
                error: "internal_error".to_string(),
                message: "Failed to toggle habit".to_string(),
            }))
        }
    }
}
