//! Training plan endpoints.
//!
//! - GET /api/v1/plan/current-week

use axum::extract::State;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::routes::suggestions::AppState;
use crate::services::plan::{self, TrainingWeekTarget};

/// Get the training week containing today.
///
/// Returns the week number, phase, and distance targets — with this week's
/// persisted override applied when one exists. `null` when no training
/// plan has been configured; weeks before the plan start report the
/// pre-training phase with zero targets.
#[utoipa::path(
    get,
    path = "/api/v1/plan/current-week",
    tag = "Plan",
    responses(
        (status = 200, description = "Current week targets, or null without a training plan", body = TrainingWeekTarget),
    )
)]
pub async fn get_current_week(
    State(state): State<AppState>,
) -> Result<Json<Option<TrainingWeekTarget>>, AppError> {
    let Some(plan_row) = queries::get_training_plan(&state.pool).await? else {
        return Ok(Json(None));
    };

    let today = plan::local_today(state.utc_offset_hours);
    let target = plan::current_target(&state.pool, plan_row.start_date, today).await?;
    Ok(Json(Some(target)))
}
