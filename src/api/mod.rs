use axum::Json;
use axum::extract::Path;
use axum::routing::{delete, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{NaiveDate, Utc};

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::scheduler::Availability;
use crate::services::{ScheduleService, WorkoutService};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/users", post(create_user))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/profile", put(update_profile))
        .route("/api/users/{id}/workouts/plans", get(list_plans))
        .route("/api/users/{id}/workouts/generate-ai", post(generate_ai_plans))
        .route("/api/users/{id}/workouts/ai-plans", get(list_ai_plans))
        .route("/api/users/{id}/workouts/journey", get(journey))
        .route("/api/users/{id}/workouts/complete", post(complete_workout))
        .route("/api/users/{id}/progress", get(get_progress))
        .route("/api/users/{id}/achievements", get(get_achievements))
        .route("/api/users/{id}/schedule/generate", post(generate_schedule))
        .route("/api/users/{id}/schedule/calendar", get(calendar))
        .route("/api/users/{id}/schedule/reset", delete(reset_schedule))
        .route("/api/users/{id}/schedule/complete/{entry_id}", post(complete_entry))
        .with_state(state)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn schedule_service(state: &AppState) -> ScheduleService {
    ScheduleService::new(state.db.clone(), state.planner.clone(), state.locks.clone())
}

fn workout_service(state: &AppState) -> WorkoutService {
    WorkoutService::new(state.db.clone(), state.planner.clone(), state.locks.clone())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<NewUserRequest>
) -> Result<(StatusCode, Json<User>), AppError> {
    if req.email.trim().is_empty() || req.name.trim().is_empty() {
        return Err(AppError::BadRequest("email and name are required".to_string()));
    }
    if repository::email_exists(&state.db, &req.email).await? {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user = repository::insert_user(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<User>, AppError> {
    let user = repository::find_user_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>
) -> Result<Json<User>, AppError> {
    if let Some(days) = req.available_days.as_deref() {
        // An empty list clears availability.
        if !days.is_empty() {
            Availability::from_entries(days)?;
        }
    }
    if req.plan_duration == Some(0) {
        return Err(AppError::BadRequest("plan_duration must be positive".to_string()));
    }

    if !repository::user_exists(&state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    let _guard = state.locks.lock(&id).await;
    let user = repository::update_profile(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

async fn list_plans(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Vec<WorkoutPlan>>, AppError> {
    let plans = workout_service(&state).plans(&id).await?;
    Ok(Json(plans))
}

async fn generate_ai_plans(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<GeneratedPlansResponse>, AppError> {
    let plans = workout_service(&state).generate_ai_plans(&id).await?;
    Ok(Json(GeneratedPlansResponse {
        success: true,
        plans,
    }))
}

async fn list_ai_plans(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Vec<WorkoutPlan>>, AppError> {
    let plans = workout_service(&state).ai_plans(&id).await?;
    Ok(Json(plans))
}

async fn journey(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Vec<JourneyStep>>, AppError> {
    let steps = workout_service(&state).journey(&id).await?;
    Ok(Json(steps))
}

async fn complete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteWorkoutRequest>
) -> Result<Json<CompletionResult>, AppError> {
    let result = workout_service(&state)
        .complete_workout(&id, &req.workout_plan_id, req.duration_minutes, today())
        .await?;
    Ok(Json(result))
}

async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Progress>, AppError> {
    let progress = workout_service(&state).progress(&id).await?;
    Ok(Json(progress))
}

async fn get_achievements(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<AchievementsResponse>, AppError> {
    let achievements = workout_service(&state).achievements(&id).await?;
    Ok(Json(achievements))
}

async fn generate_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<GenerateScheduleResponse>, AppError> {
    let response = schedule_service(&state).generate(&id, today()).await?;
    Ok(Json(response))
}

async fn calendar(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Vec<CalendarEntry>>, AppError> {
    let entries = schedule_service(&state).calendar(&id).await?;
    Ok(Json(entries))
}

async fn reset_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<ResetScheduleResponse>, AppError> {
    let response = schedule_service(&state).reset(&id).await?;
    Ok(Json(response))
}

async fn complete_entry(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(String, String)>,
    Json(req): Json<CompleteEntryRequest>
) -> Result<Json<CompletionResult>, AppError> {
    let result = schedule_service(&state)
        .complete_entry(&id, &entry_id, req.duration_minutes, today())
        .await?;
    Ok(Json(result))
}
