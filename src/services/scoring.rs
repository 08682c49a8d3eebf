//! Weather suitability scoring.
//!
//! Rates one forecast day against one run type's tolerance profile on a
//! 0–100 scale. The scorer is a transparent rule evaluator: precipitation
//! and wind penalties scale with how close the day is to the profile's
//! limits, out-of-range temperature costs a flat penalty, and a
//! disqualifying condition caps the score at 30 without hard-excluding
//! the day (callers decide whether to use it).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::weather::ForecastDay;

/// Score at or above which a day counts as optimal for the run.
pub const OPTIMAL_SCORE: i64 = 80;

/// Score cap applied when a disqualifying condition is present.
const DISQUALIFIED_CAP: i64 = 30;

/// Maximum penalty from precipitation.
const PRECIP_PENALTY_MAX: f64 = 60.0;
/// Maximum penalty from wind.
const WIND_PENALTY_MAX: f64 = 30.0;
/// Flat penalty for temperature outside the profile's comfort range.
const TEMP_PENALTY: f64 = 15.0;

/// The kinds of run a training plan schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    Long,
    Easy,
    Tempo,
    Interval,
    Recovery,
    Race,
}

impl RunType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Easy => "easy",
            Self::Tempo => "tempo",
            Self::Interval => "interval",
            Self::Recovery => "recovery",
            Self::Race => "race",
        }
    }
}

impl std::str::FromStr for RunType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Self::Long),
            "easy" => Ok(Self::Easy),
            "tempo" => Ok(Self::Tempo),
            "interval" => Ok(Self::Interval),
            "recovery" => Ok(Self::Recovery),
            "race" => Ok(Self::Race),
            _ => Err(format!("Unknown run type: {}", s)),
        }
    }
}

/// Per-run-type weather thresholds.
///
/// Precipitation is on the forecast's 0–100 probability scale, wind in
/// km/h, temperatures in °C. `disqualifying` lists condition labels that
/// cap the score regardless of the numeric values.
#[derive(Debug, Clone)]
pub struct ToleranceProfile {
    pub max_precipitation: f64,
    pub max_wind_kmh: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub disqualifying: &'static [&'static str],
}

impl ToleranceProfile {
    /// Built-in defaults. Every run type has one; long runs and hard
    /// sessions are the pickiest, recovery jogs and races the most
    /// forgiving (a race happens in almost anything).
    pub fn for_run_type(run_type: RunType) -> Self {
        match run_type {
            RunType::Long => Self {
                max_precipitation: 40.0,
                max_wind_kmh: 25.0,
                min_temperature_c: -5.0,
                max_temperature_c: 28.0,
                disqualifying: &["Thunderstorm", "Freezing Rain", "Freezing Drizzle"],
            },
            RunType::Easy => Self {
                max_precipitation: 60.0,
                max_wind_kmh: 35.0,
                min_temperature_c: -10.0,
                max_temperature_c: 32.0,
                disqualifying: &["Thunderstorm"],
            },
            RunType::Tempo => Self {
                max_precipitation: 50.0,
                max_wind_kmh: 30.0,
                min_temperature_c: -5.0,
                max_temperature_c: 30.0,
                disqualifying: &["Thunderstorm", "Freezing Rain", "Freezing Drizzle"],
            },
            RunType::Interval => Self {
                max_precipitation: 45.0,
                max_wind_kmh: 28.0,
                min_temperature_c: -5.0,
                max_temperature_c: 28.0,
                disqualifying: &[
                    "Thunderstorm",
                    "Freezing Rain",
                    "Freezing Drizzle",
                    "Snow",
                    "Snow Showers",
                ],
            },
            RunType::Recovery => Self {
                max_precipitation: 70.0,
                max_wind_kmh: 40.0,
                min_temperature_c: -12.0,
                max_temperature_c: 33.0,
                disqualifying: &["Thunderstorm"],
            },
            RunType::Race => Self {
                max_precipitation: 80.0,
                max_wind_kmh: 45.0,
                min_temperature_c: -15.0,
                max_temperature_c: 35.0,
                disqualifying: &["Thunderstorm"],
            },
        }
    }
}

/// A scored day: 0–100 plus a human-readable one-liner.
#[derive(Debug, Clone)]
pub struct WeatherScore {
    pub score: i64,
    pub reason: String,
}

/// Score a forecast day against a tolerance profile.
pub fn score(day: &ForecastDay, profile: &ToleranceProfile) -> WeatherScore {
    let precip_penalty = (PRECIP_PENALTY_MAX * day.precipitation
        / profile.max_precipitation.max(1.0))
    .min(PRECIP_PENALTY_MAX);

    let wind_penalty =
        (WIND_PENALTY_MAX * day.wind_speed_kmh / profile.max_wind_kmh.max(1.0))
            .min(WIND_PENALTY_MAX);

    let temp_penalty = if day.temperature_c < profile.min_temperature_c
        || day.temperature_c > profile.max_temperature_c
    {
        TEMP_PENALTY
    } else {
        0.0
    };

    let raw = 100.0 - precip_penalty - wind_penalty - temp_penalty;
    let mut value = raw.clamp(0.0, 100.0).round() as i64;

    if profile.disqualifying.contains(&day.condition.as_str()) {
        value = value.min(DISQUALIFIED_CAP);
    }

    let quality = match value {
        v if v >= 80 => "Excellent",
        v if v >= 60 => "Good",
        v if v >= 40 => "Fair",
        _ => "Challenging",
    };

    WeatherScore {
        score: value,
        reason: format!(
            "{} conditions ({}/100). {}, {:.0}°C.",
            quality, value, day.condition, day.temperature_c
        ),
    }
}
