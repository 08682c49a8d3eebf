//! Run suggestion scheduling.
//!
//! Turns a forecast window, the current week's targets, and the set of
//! already-occupied dates into an ordered list of proposed runs: the long
//! run goes on the best-scoring weekend day, then easy runs fill the
//! remaining weekly distance budget on the best-scoring weekdays, with
//! rest days blocked out after every assignment. The whole pass is a pure
//! function of its inputs — rerunning it on the same forecast and run set
//! yields the same proposals.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::helpers::round_km;
use crate::services::plan::TrainingWeekTarget;
use crate::services::scoring::{self, RunType, ToleranceProfile, WeatherScore, OPTIMAL_SCORE};
use crate::services::weather::ForecastDay;

/// Recovery days blocked out after a long run.
const LONG_RUN_REST_DAYS: i64 = 2;
/// Recovery days blocked out after an easy run.
const EASY_RUN_REST_DAYS: i64 = 1;
/// Leftover budget below this is considered spent.
const BUDGET_EPSILON_KM: f64 = 0.05;

/// A proposed run. Produced fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunSuggestion {
    /// Proposed date
    pub date: NaiveDate,
    /// Kind of run to do
    pub run_type: RunType,
    /// Proposed distance in kilometres
    pub distance_km: f64,
    /// Weather suitability, 0–100
    pub score: i64,
    /// True when the day scores 80 or above for this run type
    pub is_optimal: bool,
    /// One-line explanation of the score
    pub reason: String,
    /// Forecast snapshot the proposal is based on
    pub weather: ForecastDay,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn make_suggestion(
    day: &ForecastDay,
    run_type: RunType,
    distance_km: f64,
    score: WeatherScore,
) -> RunSuggestion {
    RunSuggestion {
        date: day.date,
        run_type,
        distance_km: round_km(distance_km),
        score: score.score,
        is_optimal: score.score >= OPTIMAL_SCORE,
        reason: score.reason,
        weather: day.clone(),
    }
}

/// Propose runs for the forecast window against this week's targets.
///
/// Only dates strictly after `today` without an existing run are eligible.
/// Degenerate inputs — no eligible weekend day, a budget already exhausted
/// by the long run, an empty forecast — reduce the output instead of
/// failing; a week with no distance target yields no proposals at all.
pub fn suggest(
    forecast: &[ForecastDay],
    today: NaiveDate,
    target: &TrainingWeekTarget,
    occupied: &HashSet<NaiveDate>,
) -> Vec<RunSuggestion> {
    if target.weekly_mileage_km <= 0.0 {
        return Vec::new();
    }

    let candidates: Vec<&ForecastDay> = forecast
        .iter()
        .filter(|day| day.date > today && !occupied.contains(&day.date))
        .collect();

    let mut suggestions = Vec::new();
    let mut excluded: HashSet<NaiveDate> = HashSet::new();

    // Long run: single best-scoring weekend day, earliest date on ties.
    let long_profile = ToleranceProfile::for_run_type(RunType::Long);
    let long_run = candidates
        .iter()
        .filter(|day| is_weekend(day.date))
        .map(|day| (*day, scoring::score(day, &long_profile)))
        .max_by(|(a, score_a), (b, score_b)| {
            score_a.score.cmp(&score_b.score).then(b.date.cmp(&a.date))
        });

    if let Some((day, score)) = long_run {
        for offset in 1..=LONG_RUN_REST_DAYS {
            excluded.insert(day.date + Duration::days(offset));
        }
        suggestions.push(make_suggestion(day, RunType::Long, target.long_run_km, score));
    }

    // Easy runs fill the rest of the weekly budget on weekdays, best
    // weather first. Each pick takes an even share of what is left, so the
    // running total converges on the budget however many slots survive.
    let easy_profile = ToleranceProfile::for_run_type(RunType::Easy);
    let mut easy_days: Vec<(&ForecastDay, WeatherScore)> = candidates
        .iter()
        .filter(|day| !is_weekend(day.date))
        .map(|day| (*day, scoring::score(day, &easy_profile)))
        .collect();
    easy_days.sort_by(|(a, score_a), (b, score_b)| {
        score_b.score.cmp(&score_a.score).then(a.date.cmp(&b.date))
    });

    let mut remaining = (target.weekly_mileage_km - target.long_run_km).max(0.0);
    while remaining > BUDGET_EPSILON_KM {
        easy_days.retain(|(day, _)| !excluded.contains(&day.date));
        if easy_days.is_empty() {
            break;
        }
        let share = remaining / easy_days.len() as f64;
        let (day, score) = easy_days.remove(0);
        remaining -= share;
        for offset in 1..=EASY_RUN_REST_DAYS {
            excluded.insert(day.date + Duration::days(offset));
        }
        suggestions.push(make_suggestion(day, RunType::Easy, share, score));
    }

    suggestions.sort_by_key(|s| s.date);
    suggestions
}
