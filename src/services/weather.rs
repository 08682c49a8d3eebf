//! Open-Meteo daily forecast client.
//!
//! Fetches day-granularity forecasts from the Open-Meteo API.
//! See: https://open-meteo.com/en/docs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;

/// Daily variables requested from Open-Meteo, index-aligned with `time`.
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,\
precipitation_probability_max,windspeed_10m_max,relative_humidity_2m_mean";

/// Request-level timeout; a slow provider surfaces as WeatherUnavailable
/// rather than hanging the request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One day of forecast for a location. Immutable snapshot; day granularity,
/// no time component.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ForecastDay {
    pub location: String,
    pub date: NaiveDate,
    /// Condition label derived from the WMO weather code (e.g. "Clear",
    /// "Rain", "Thunderstorm").
    pub condition: String,
    pub temperature_c: f64,
    /// Precipitation probability, 0–100.
    pub precipitation: f64,
    pub wind_speed_kmh: f64,
    pub humidity_pct: f64,
}

/// External forecast source consumed by the cache layer.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch `days` consecutive forecast days starting today, oldest first.
    async fn fetch_forecast(&self, location: &str, days: u8)
        -> Result<Vec<ForecastDay>, AppError>;
}

/// Client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

// --- Open-Meteo JSON response types ---

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<NaiveDate>,
    weathercode: Vec<Option<i64>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    windspeed_10m_max: Vec<Option<f64>>,
    relative_humidity_2m_mean: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, latitude: f64, longitude: f64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            latitude,
            longitude,
        }
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn fetch_forecast(
        &self,
        location: &str,
        days: u8,
    ) -> Result<Vec<ForecastDay>, AppError> {
        let url = format!(
            "{}/v1/forecast?latitude={:.4}&longitude={:.4}&daily={}&forecast_days={}&timezone=auto",
            self.base_url, self.latitude, self.longitude, DAILY_FIELDS, days
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::WeatherUnavailable(format!("forecast request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::WeatherUnavailable(format!(
                "forecast provider returned HTTP {}",
                response.status()
            )));
        }

        let body: OpenMeteoResponse = response.json().await.map_err(|e| {
            AppError::WeatherUnavailable(format!("forecast response parse error: {}", e))
        })?;

        Ok(parse_daily(location, &body.daily))
    }
}

/// Convert Open-Meteo's column-oriented daily arrays into ForecastDays.
///
/// Pure function (no I/O). Missing values in the aligned arrays degrade to
/// neutral defaults rather than dropping the day.
fn parse_daily(location: &str, daily: &OpenMeteoDaily) -> Vec<ForecastDay> {
    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let t_max = at(&daily.temperature_2m_max, i);
            let t_min = at(&daily.temperature_2m_min, i);
            let temperature_c = match (t_max, t_min) {
                (Some(hi), Some(lo)) => (hi + lo) / 2.0,
                (Some(t), None) | (None, Some(t)) => t,
                (None, None) => 0.0,
            };

            let condition = daily
                .weathercode
                .get(i)
                .copied()
                .flatten()
                .map(condition_label)
                .unwrap_or("Unknown");

            ForecastDay {
                location: location.to_string(),
                date,
                condition: condition.to_string(),
                temperature_c,
                precipitation: at(&daily.precipitation_probability_max, i).unwrap_or(0.0),
                wind_speed_kmh: at(&daily.windspeed_10m_max, i).unwrap_or(0.0),
                humidity_pct: at(&daily.relative_humidity_2m_mean, i).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Map a WMO weather code to a condition label.
pub fn condition_label(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 | 2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing Drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing Rain",
        71 | 73 | 75 | 77 => "Snow",
        80 | 81 | 82 => "Rain Showers",
        85 | 86 => "Snow Showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Unknown",
    }
}
