//! Progress statistics endpoints.
//!
//! - GET /api/v1/stats/weekly-mileage
//! - GET /api/v1/stats/pace-progression
//! - GET /api/v1/stats/long-run-progression
//! - GET /api/v1/stats/completion-rate
//! - GET /api/v1/stats/summary
//!
//! Each handler is a thin projection: load the run log and the plan start
//! date, then delegate to the pure functions in `services::stats`. Without
//! a training plan there is no week model to project against, so every
//! endpoint returns its empty shape.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;

use crate::db::models::TrainingPlanRow;
use crate::db::queries;
use crate::errors::AppError;
use crate::routes::suggestions::AppState;
use crate::services::plan;
use crate::services::stats::{
    self, CompletionRate, LongRunPoint, PaceProgressionPoint, StatsSummary, WeeklyMileagePoint,
};

async fn plan_start(state: &AppState) -> Result<Option<NaiveDate>, AppError> {
    Ok(queries::get_training_plan(&state.pool)
        .await?
        .map(|TrainingPlanRow { start_date }| start_date))
}

/// Weekly completed mileage vs. target.
#[utoipa::path(
    get,
    path = "/api/v1/stats/weekly-mileage",
    tag = "Stats",
    responses(
        (status = 200, description = "One point per week, earliest run through today", body = Vec<WeeklyMileagePoint>),
    )
)]
pub async fn get_weekly_mileage(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeeklyMileagePoint>>, AppError> {
    let Some(start) = plan_start(&state).await? else {
        return Ok(Json(Vec::new()));
    };
    let runs = queries::list_runs(&state.pool).await?;
    let today = plan::local_today(state.utc_offset_hours);
    Ok(Json(stats::weekly_mileage(&runs, start, today)))
}

/// Distance-weighted average pace per training week.
#[utoipa::path(
    get,
    path = "/api/v1/stats/pace-progression",
    tag = "Stats",
    responses(
        (status = 200, description = "One point per week; pace is null for weeks without a parseable pace", body = Vec<PaceProgressionPoint>),
    )
)]
pub async fn get_pace_progression(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaceProgressionPoint>>, AppError> {
    let Some(start) = plan_start(&state).await? else {
        return Ok(Json(Vec::new()));
    };
    let runs = queries::list_runs(&state.pool).await?;
    let today = plan::local_today(state.utc_offset_hours);
    Ok(Json(stats::pace_progression(&runs, start, today)))
}

/// Longest completed long run per training week vs. target.
#[utoipa::path(
    get,
    path = "/api/v1/stats/long-run-progression",
    tag = "Stats",
    responses(
        (status = 200, description = "One point per week", body = Vec<LongRunPoint>),
    )
)]
pub async fn get_long_run_progression(
    State(state): State<AppState>,
) -> Result<Json<Vec<LongRunPoint>>, AppError> {
    let Some(start) = plan_start(&state).await? else {
        return Ok(Json(Vec::new()));
    };
    let runs = queries::list_runs(&state.pool).await?;
    let today = plan::local_today(state.utc_offset_hours);
    Ok(Json(stats::long_run_progression(&runs, start, today)))
}

/// Completed vs. scheduled runs up to today, overall and by phase.
#[utoipa::path(
    get,
    path = "/api/v1/stats/completion-rate",
    tag = "Stats",
    responses(
        (status = 200, description = "Completion numbers", body = CompletionRate),
    )
)]
pub async fn get_completion_rate(
    State(state): State<AppState>,
) -> Result<Json<CompletionRate>, AppError> {
    let Some(start) = plan_start(&state).await? else {
        return Ok(Json(CompletionRate::default()));
    };
    let runs = queries::list_runs(&state.pool).await?;
    let today = plan::local_today(state.utc_offset_hours);
    Ok(Json(stats::completion_rate(&runs, start, today)))
}

/// Headline totals, average pace, streak, and longest run.
#[utoipa::path(
    get,
    path = "/api/v1/stats/summary",
    tag = "Stats",
    responses(
        (status = 200, description = "Summary over all completed runs", body = StatsSummary),
    )
)]
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<StatsSummary>, AppError> {
    let Some(start) = plan_start(&state).await? else {
        return Ok(Json(StatsSummary::default()));
    };
    let runs = queries::list_runs(&state.pool).await?;
    let today = plan::local_today(state.utc_offset_hours);
    Ok(Json(stats::summary(&runs, start, today)))
}
