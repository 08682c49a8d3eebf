use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use super::models::{ScheduledRun, TargetOverrideRow, TrainingPlanRow, WeatherCacheRow};

/// List every scheduled run, oldest first.
pub async fn list_runs(pool: &SqlitePool) -> Result<Vec<ScheduledRun>, sqlx::Error> {
    sqlx::query_as::<_, ScheduledRun>(
        "SELECT id, date, distance_km, pace, duration_seconds, run_type, completed, notes
         FROM scheduled_runs
         ORDER BY date",
    )
    .fetch_all(pool)
    .await
}

/// Dates strictly after `after` that already have a run scheduled.
/// The scheduler treats these as unavailable.
pub async fn occupied_dates_after(
    pool: &SqlitePool,
    after: NaiveDate,
) -> Result<Vec<NaiveDate>, sqlx::Error> {
    sqlx::query_scalar::<_, NaiveDate>(
        "SELECT date FROM scheduled_runs WHERE date > ? ORDER BY date",
    )
    .bind(after)
    .fetch_all(pool)
    .await
}

/// Get the active training plan, if one has been configured.
pub async fn get_training_plan(
    pool: &SqlitePool,
) -> Result<Option<TrainingPlanRow>, sqlx::Error> {
    sqlx::query_as::<_, TrainingPlanRow>("SELECT start_date FROM training_plan WHERE id = 1")
        .fetch_optional(pool)
        .await
}

/// Create or replace the singleton training plan row.
pub async fn upsert_training_plan(
    pool: &SqlitePool,
    start_date: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO training_plan (id, start_date) VALUES (1, ?)
         ON CONFLICT (id) DO UPDATE SET start_date = excluded.start_date",
    )
    .bind(start_date)
    .execute(pool)
    .await?;
    Ok(())
}

/// Explicit target override for a given week, if present.
pub async fn get_target_override(
    pool: &SqlitePool,
    week_number: i64,
) -> Result<Option<TargetOverrideRow>, sqlx::Error> {
    sqlx::query_as::<_, TargetOverrideRow>(
        "SELECT week_number, weekly_mileage_km, long_run_km
         FROM target_overrides
         WHERE week_number = ?",
    )
    .bind(week_number)
    .fetch_optional(pool)
    .await
}

/// Fetch cache rows for a date window that are still fresh at `now`,
/// ordered by date. Expired rows are simply not returned (passive expiry).
pub async fn get_fresh_cache_days(
    pool: &SqlitePool,
    location: &str,
    from: NaiveDate,
    to: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<WeatherCacheRow>, sqlx::Error> {
    sqlx::query_as::<_, WeatherCacheRow>(
        "SELECT location, date, condition, temperature_c, precipitation,
                wind_speed_kmh, humidity_pct, cached_at, expires_at
         FROM weather_cache
         WHERE location = ? AND date >= ? AND date <= ? AND expires_at > ?
         ORDER BY date",
    )
    .bind(location)
    .bind(from)
    .bind(to)
    .bind(now)
    .fetch_all(pool)
    .await
}

/// Write-through a freshly fetched forecast day.
///
/// Atomic per (location, date): two racing refreshes converge to one row
/// (last writer wins; both hold equivalent fresh data).
pub async fn upsert_cache_day(
    pool: &SqlitePool,
    row: &WeatherCacheRow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO weather_cache (
            location, date, condition, temperature_c, precipitation,
            wind_speed_kmh, humidity_pct, cached_at, expires_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (location, date) DO UPDATE SET
            condition = excluded.condition,
            temperature_c = excluded.temperature_c,
            precipitation = excluded.precipitation,
            wind_speed_kmh = excluded.wind_speed_kmh,
            humidity_pct = excluded.humidity_pct,
            cached_at = excluded.cached_at,
            expires_at = excluded.expires_at",
    )
    .bind(&row.location)
    .bind(row.date)
    .bind(&row.condition)
    .bind(row.temperature_c)
    .bind(row.precipitation)
    .bind(row.wind_speed_kmh)
    .bind(row.humidity_pct)
    .bind(row.cached_at)
    .bind(row.expires_at)
    .execute(pool)
    .await?;
    Ok(())
}
