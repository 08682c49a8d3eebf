//! Forecast cache service.
//!
//! Cache-first read-through over the `weather_cache` table, keyed by
//! (location, date). A request for an N-day window first collects the
//! still-fresh cached days; if any day is missing, one batched provider
//! fetch covers the whole window and every returned day is written through
//! with a fresh TTL. Entries expire passively — they are upserted, never
//! deleted, and a failed refresh leaves whatever is already cached intact.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::models::WeatherCacheRow;
use crate::db::queries;
use crate::errors::AppError;
use crate::services::weather::{ForecastDay, ForecastProvider};

/// How long a cached forecast day stays fresh.
const CACHE_TTL_HOURS: i64 = 1;

fn row_to_day(row: WeatherCacheRow) -> ForecastDay {
    ForecastDay {
        location: row.location,
        date: row.date,
        condition: row.condition,
        temperature_c: row.temperature_c,
        precipitation: row.precipitation,
        wind_speed_kmh: row.wind_speed_kmh,
        humidity_pct: row.humidity_pct,
    }
}

fn day_to_row(
    day: &ForecastDay,
    cached_at: chrono::DateTime<Utc>,
    expires_at: chrono::DateTime<Utc>,
) -> WeatherCacheRow {
    WeatherCacheRow {
        location: day.location.clone(),
        date: day.date,
        condition: day.condition.clone(),
        temperature_c: day.temperature_c,
        precipitation: day.precipitation,
        wind_speed_kmh: day.wind_speed_kmh,
        humidity_pct: day.humidity_pct,
        cached_at,
        expires_at,
    }
}

/// Get `days` consecutive forecast days starting at `today`, oldest first.
///
/// Fully-warm windows are served without touching the provider. Any miss
/// triggers a single batched fetch for the whole window; fetched days are
/// upserted (atomic per key, so racing refreshes converge to one row) and
/// supersede overlapping cached days in the returned sequence. A provider
/// failure while misses remain surfaces as `WeatherUnavailable` — the
/// entries already held are not invalidated.
pub async fn get_forecast(
    pool: &SqlitePool,
    provider: &dyn ForecastProvider,
    location: &str,
    days: u8,
    today: NaiveDate,
) -> Result<Vec<ForecastDay>, AppError> {
    let now = Utc::now();
    let last = today + Duration::days(days as i64 - 1);

    let cached = queries::get_fresh_cache_days(pool, location, today, last, now).await?;
    let mut by_date: BTreeMap<NaiveDate, ForecastDay> = cached
        .into_iter()
        .map(|row| (row.date, row_to_day(row)))
        .collect();

    let missing = (0..days as i64)
        .map(|offset| today + Duration::days(offset))
        .filter(|date| !by_date.contains_key(date))
        .count();

    if missing == 0 {
        tracing::debug!("Forecast cache hit for '{}' ({} days)", location, days);
        return Ok(by_date.into_values().collect());
    }

    tracing::debug!(
        "Forecast cache miss for '{}' ({} of {} days), fetching window",
        location,
        missing,
        days
    );

    let fetched = provider.fetch_forecast(location, days).await?;

    let expires_at = now + Duration::hours(CACHE_TTL_HOURS);
    for day in &fetched {
        // The provider is asked for exactly the window, but clamp anyway so
        // stray dates never pollute the cache or the response.
        if day.date < today || day.date > last {
            continue;
        }
        queries::upsert_cache_day(pool, &day_to_row(day, now, expires_at)).await?;
        by_date.insert(day.date, day.clone());
    }

    Ok(by_date.into_values().collect())
}
