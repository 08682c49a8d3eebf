use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled (or completed) run. Owned by the run store; this service
/// only ever reads these rows.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledRun {
    pub id: Uuid,
    pub date: NaiveDate,
    pub distance_km: f64,
    /// Pace per km in "M:SS" form. Free text upstream, so may be malformed.
    pub pace: Option<String>,
    pub duration_seconds: Option<i64>,
    pub run_type: String,
    pub completed: bool,
    pub notes: Option<String>,
}

/// The active training plan (singleton row).
#[derive(Debug, Clone, FromRow)]
pub struct TrainingPlanRow {
    pub start_date: NaiveDate,
}

/// Explicit target override for one training week.
#[derive(Debug, Clone, FromRow)]
pub struct TargetOverrideRow {
    pub week_number: i64,
    pub weekly_mileage_km: f64,
    pub long_run_km: f64,
}

/// One cached forecast day, keyed by (location, date).
/// Valid only while `expires_at` is in the future; rows expire passively.
#[derive(Debug, Clone, FromRow)]
pub struct WeatherCacheRow {
    pub location: String,
    pub date: NaiveDate,
    pub condition: String,
    pub temperature_c: f64,
    pub precipitation: f64,
    pub wind_speed_kmh: f64,
    pub humidity_pct: f64,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
