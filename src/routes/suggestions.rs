//! Run suggestion endpoint.
//!
//! - GET /api/v1/suggestions?days=N&location=LABEL

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::db::queries;
use crate::errors::{AppError, ErrorResponse};
use crate::services::forecast;
use crate::services::plan;
use crate::services::scheduler::{self, RunSuggestion};
use crate::services::weather::ForecastProvider;

/// Longest forecast window a request may ask for.
const MAX_FORECAST_DAYS: u8 = 21;
/// Window used when the caller does not specify one.
const DEFAULT_FORECAST_DAYS: u8 = 7;

/// Shared application state for planner endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: sqlx::SqlitePool,
    pub(crate) provider: Arc<dyn ForecastProvider>,
    pub(crate) location_name: String,
    pub(crate) utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SuggestionQuery {
    /// Forecast window in days (1–21, default 7)
    pub days: Option<u8>,
    /// Forecast cache label (defaults to the configured home location)
    pub location: Option<String>,
}

/// Propose runs for the coming days.
///
/// Combines the forecast window, this week's targets, and the existing
/// run schedule into dated run proposals. Without an active training plan
/// (or during pre-training weeks) there is nothing to propose and the
/// response is an empty list, not an error.
#[utoipa::path(
    get,
    path = "/api/v1/suggestions",
    tag = "Suggestions",
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Proposed runs ordered by date; empty without an active training plan", body = Vec<RunSuggestion>),
        (status = 400, description = "days outside 1–21", body = ErrorResponse),
        (status = 503, description = "Forecast provider unavailable", body = ErrorResponse),
    )
)]
pub async fn generate_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<RunSuggestion>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    if days < 1 || days > MAX_FORECAST_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {}, got {}",
            MAX_FORECAST_DAYS, days
        )));
    }

    let Some(plan_row) = queries::get_training_plan(&state.pool).await? else {
        return Ok(Json(Vec::new()));
    };

    let today = plan::local_today(state.utc_offset_hours);
    let target = plan::current_target(&state.pool, plan_row.start_date, today).await?;
    if target.weekly_mileage_km <= 0.0 {
        // Pre-training week: skip the forecast fetch, nothing to place.
        return Ok(Json(Vec::new()));
    }

    let location = query.location.unwrap_or_else(|| state.location_name.clone());
    let window =
        forecast::get_forecast(&state.pool, state.provider.as_ref(), &location, days, today)
            .await?;

    let occupied: HashSet<_> = queries::occupied_dates_after(&state.pool, today)
        .await?
        .into_iter()
        .collect();

    Ok(Json(scheduler::suggest(&window, today, &target, &occupied)))
}
