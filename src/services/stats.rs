//! Progress statistics over the historical run log.
//!
//! Read-only projections of the scheduled-run set against the training
//! week model: weekly mileage vs. target, distance-weighted pace
//! progression, long-run progression, completion rates by phase, and the
//! consistency streak. Everything here is a pure function of the run rows,
//! the plan start date, and "today" — the handlers own all I/O.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::db::models::ScheduledRun;
use crate::helpers::{format_pace, parse_pace, round_km};
use crate::services::plan::{self, TrainingPhase, TrainingWeek};
use crate::services::scoring::RunType;

/// Minimum completed weekly mileage for a week to extend the streak.
const STREAK_THRESHOLD_KM: f64 = 10.0;

/// Completed mileage vs. target for one training week.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyMileagePoint {
    pub week_number: i64,
    /// Chart label: "Week 3", or "Pre 1" for pre-training weeks
    pub label: String,
    pub completed_km: f64,
    pub target_km: f64,
}

/// Distance-weighted average pace for one training week.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaceProgressionPoint {
    pub week_number: i64,
    pub label: String,
    /// Seconds per km; null when the week has no completed run with a
    /// parseable pace
    pub avg_pace_seconds: Option<i64>,
    /// Same value as "M:SS"
    pub avg_pace: Option<String>,
}

/// Longest completed long run vs. target for one training week.
#[derive(Debug, Serialize, ToSchema)]
pub struct LongRunPoint {
    pub week_number: i64,
    pub label: String,
    /// 0 when the week has no completed long run
    pub longest_km: f64,
    pub target_km: f64,
}

/// Completion numbers for one training phase.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhaseCompletion {
    pub phase: TrainingPhase,
    pub completed: i64,
    pub scheduled: i64,
    pub rate_pct: f64,
}

/// Completed vs. scheduled-up-to-today, overall and per phase.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct CompletionRate {
    pub completed: i64,
    pub scheduled: i64,
    pub rate_pct: f64,
    pub by_phase: Vec<PhaseCompletion>,
}

/// Headline numbers over all completed runs.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct StatsSummary {
    pub total_runs: i64,
    pub total_distance_km: f64,
    /// Distance-weighted over all completed runs; "" when no run carries a
    /// parseable pace
    pub avg_pace: String,
    pub streak_weeks: i64,
    pub longest_run_km: f64,
}

fn rate_pct(completed: i64, scheduled: i64) -> f64 {
    if scheduled == 0 {
        0.0
    } else {
        (completed as f64 * 1000.0 / scheduled as f64).round() / 10.0
    }
}

/// Completed km summed per training week.
fn completed_km_by_week(
    runs: &[ScheduledRun],
    start: NaiveDate,
) -> HashMap<i64, f64> {
    let mut by_week: HashMap<i64, f64> = HashMap::new();
    for run in runs.iter().filter(|r| r.completed) {
        let week = TrainingWeek::for_date(start, run.date).number();
        *by_week.entry(week).or_default() += run.distance_km;
    }
    by_week
}

/// Weekly completed mileage vs. target, from the earliest completed run's
/// week (or week 1) through the current week. Pre-training weeks are
/// labelled "Pre N" and carry a zero target.
pub fn weekly_mileage(
    runs: &[ScheduledRun],
    start: NaiveDate,
    today: NaiveDate,
) -> Vec<WeeklyMileagePoint> {
    let current = TrainingWeek::for_date(start, today).number();
    let by_week = completed_km_by_week(runs, start);
    let first = by_week.keys().copied().min().unwrap_or(1).min(1);

    (first..=current)
        .map(|number| {
            let week = TrainingWeek::new(number);
            WeeklyMileagePoint {
                week_number: number,
                label: week.label(),
                completed_km: round_km(by_week.get(&number).copied().unwrap_or(0.0)),
                target_km: round_km(plan::weekly_mileage_target(week)),
            }
        })
        .collect()
}

/// Distance-weighted average pace per training week 1..=current.
///
/// Runs whose pace does not parse are left out of the weighted sum, so a
/// junk pace string can never drag a week's average toward zero.
pub fn pace_progression(
    runs: &[ScheduledRun],
    start: NaiveDate,
    today: NaiveDate,
) -> Vec<PaceProgressionPoint> {
    let current = TrainingWeek::for_date(start, today).number();

    // (Σ pace·km, Σ km) per week, valid paces only.
    let mut sums: HashMap<i64, (f64, f64)> = HashMap::new();
    for run in runs.iter().filter(|r| r.completed && r.distance_km > 0.0) {
        let Some(pace) = run.pace.as_deref().and_then(parse_pace) else {
            continue;
        };
        let week = TrainingWeek::for_date(start, run.date).number();
        let entry = sums.entry(week).or_insert((0.0, 0.0));
        entry.0 += pace as f64 * run.distance_km;
        entry.1 += run.distance_km;
    }

    (1..=current)
        .map(|number| {
            let avg = sums
                .get(&number)
                .map(|(weighted, km)| (weighted / km).round() as i64);
            PaceProgressionPoint {
                week_number: number,
                label: TrainingWeek::new(number).label(),
                avg_pace_seconds: avg,
                avg_pace: avg.map(format_pace),
            }
        })
        .collect()
}

/// Longest completed long run per training week 1..=current, vs. target.
pub fn long_run_progression(
    runs: &[ScheduledRun],
    start: NaiveDate,
    today: NaiveDate,
) -> Vec<LongRunPoint> {
    let current = TrainingWeek::for_date(start, today).number();

    let mut longest: HashMap<i64, f64> = HashMap::new();
    for run in runs
        .iter()
        .filter(|r| r.completed && r.run_type.parse() == Ok(RunType::Long))
    {
        let week = TrainingWeek::for_date(start, run.date).number();
        let entry = longest.entry(week).or_insert(0.0);
        if run.distance_km > *entry {
            *entry = run.distance_km;
        }
    }

    (1..=current)
        .map(|number| {
            let week = TrainingWeek::new(number);
            LongRunPoint {
                week_number: number,
                label: week.label(),
                longest_km: round_km(longest.get(&number).copied().unwrap_or(0.0)),
                target_km: round_km(plan::long_run_target(week)),
            }
        })
        .collect()
}

/// Completed vs. scheduled ratio over runs dated up to `today`, overall
/// and grouped by the phase of the week each run falls in.
pub fn completion_rate(
    runs: &[ScheduledRun],
    start: NaiveDate,
    today: NaiveDate,
) -> CompletionRate {
    let due: Vec<&ScheduledRun> = runs.iter().filter(|r| r.date <= today).collect();
    let completed = due.iter().filter(|r| r.completed).count() as i64;
    let scheduled = due.len() as i64;

    let mut per_phase: HashMap<TrainingPhase, (i64, i64)> = HashMap::new();
    for run in &due {
        let phase = TrainingWeek::for_date(start, run.date).phase();
        let entry = per_phase.entry(phase).or_insert((0, 0));
        entry.1 += 1;
        if run.completed {
            entry.0 += 1;
        }
    }

    let mut by_phase: Vec<PhaseCompletion> = per_phase
        .into_iter()
        .map(|(phase, (completed, scheduled))| PhaseCompletion {
            phase,
            completed,
            scheduled,
            rate_pct: rate_pct(completed, scheduled),
        })
        .collect();
    by_phase.sort_by_key(|p| p.phase);

    CompletionRate {
        completed,
        scheduled,
        rate_pct: rate_pct(completed, scheduled),
        by_phase,
    }
}

/// Consecutive weeks ending at the current week whose completed mileage
/// exceeds the streak threshold. 0 when the current week itself falls
/// short.
pub fn streak_weeks(runs: &[ScheduledRun], start: NaiveDate, today: NaiveDate) -> i64 {
    let by_week = completed_km_by_week(runs, start);
    let mut week = TrainingWeek::for_date(start, today).number();
    let mut streak = 0;
    while by_week.get(&week).copied().unwrap_or(0.0) > STREAK_THRESHOLD_KM {
        streak += 1;
        week -= 1;
    }
    streak
}

/// Headline numbers over all completed runs.
pub fn summary(runs: &[ScheduledRun], start: NaiveDate, today: NaiveDate) -> StatsSummary {
    let completed: Vec<&ScheduledRun> = runs.iter().filter(|r| r.completed).collect();

    let total_distance: f64 = completed.iter().map(|r| r.distance_km).sum();
    let longest = completed.iter().map(|r| r.distance_km).fold(0.0, f64::max);

    let (mut weighted, mut km) = (0.0, 0.0);
    for run in &completed {
        if run.distance_km <= 0.0 {
            continue;
        }
        if let Some(pace) = run.pace.as_deref().and_then(parse_pace) {
            weighted += pace as f64 * run.distance_km;
            km += run.distance_km;
        }
    }
    let avg_pace = if km > 0.0 {
        format_pace((weighted / km).round() as i64)
    } else {
        String::new()
    };

    StatsSummary {
        total_runs: completed.len() as i64,
        total_distance_km: round_km(total_distance),
        avg_pace,
        streak_weeks: streak_weeks(runs, start, today),
        longest_run_km: round_km(longest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Plan start Sunday 2026-06-07: week 1 is Jun 7–13, week 2 Jun 14–20,
    /// week 3 Jun 21–27.
    fn start() -> NaiveDate {
        date("2026-06-07")
    }

    fn run(
        day: &str,
        distance_km: f64,
        pace: Option<&str>,
        run_type: &str,
        completed: bool,
    ) -> ScheduledRun {
        ScheduledRun {
            id: Uuid::new_v4(),
            date: date(day),
            distance_km,
            pace: pace.map(str::to_string),
            duration_seconds: None,
            run_type: run_type.to_string(),
            completed,
            notes: None,
        }
    }

    #[test]
    fn test_weekly_mileage_series() {
        let runs = vec![
            run("2026-06-03", 4.0, None, "easy", true), // pre-training week
            run("2026-06-08", 5.0, Some("5:30"), "easy", true),
            run("2026-06-12", 10.0, Some("6:00"), "long", true),
            run("2026-06-25", 8.0, None, "easy", true),
            run("2026-06-26", 6.0, None, "easy", false), // not completed
        ];
        let series = weekly_mileage(&runs, start(), date("2026-06-24"));

        assert_eq!(series.len(), 4); // Pre 1 through week 3
        assert_eq!(series[0].week_number, 0);
        assert_eq!(series[0].label, "Pre 1");
        assert_eq!(series[0].completed_km, 4.0);
        assert_eq!(series[0].target_km, 0.0);

        assert_eq!(series[1].label, "Week 1");
        assert_eq!(series[1].completed_km, 15.0);
        assert_eq!(series[1].target_km, 10.0);

        // Week 2 had no runs at all.
        assert_eq!(series[2].completed_km, 0.0);
        assert_eq!(series[2].target_km, 11.5);

        assert_eq!(series[3].completed_km, 8.0);
    }

    #[test]
    fn test_weekly_mileage_without_runs_spans_plan_weeks() {
        let series = weekly_mileage(&[], start(), date("2026-06-24"));
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].label, "Week 1");
        assert!(series.iter().all(|p| p.completed_km == 0.0));
    }

    #[test]
    fn test_pace_progression_is_distance_weighted() {
        let runs = vec![
            run("2026-06-08", 5.0, Some("5:30"), "easy", true),
            run("2026-06-12", 10.0, Some("6:00"), "long", true),
            run("2026-06-13", 3.0, Some("abc"), "easy", true), // junk pace
            run("2026-06-25", 8.0, None, "easy", true),        // no pace
        ];
        let series = pace_progression(&runs, start(), date("2026-06-24"));

        assert_eq!(series.len(), 3);
        // (330·5 + 360·10) / 15 = 350 — the junk pace is excluded, not
        // counted as zero.
        assert_eq!(series[0].avg_pace_seconds, Some(350));
        assert_eq!(series[0].avg_pace.as_deref(), Some("5:50"));
        assert_eq!(series[1].avg_pace_seconds, None);
        assert_eq!(series[2].avg_pace_seconds, None);
    }

    #[test]
    fn test_pace_progression_skips_incomplete_runs() {
        let runs = vec![run("2026-06-08", 5.0, Some("5:30"), "easy", false)];
        let series = pace_progression(&runs, start(), date("2026-06-10"));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].avg_pace_seconds, None);
    }

    #[test]
    fn test_long_run_progression() {
        let runs = vec![
            run("2026-06-08", 10.0, None, "long", true),
            run("2026-06-13", 12.0, None, "long", true),
            run("2026-06-12", 14.0, None, "easy", true), // not a long run
            run("2026-06-25", 16.0, None, "long", false), // not completed
        ];
        let series = long_run_progression(&runs, start(), date("2026-06-24"));

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].longest_km, 12.0);
        assert_eq!(series[0].target_km, 7.0);
        assert_eq!(series[1].longest_km, 0.0);
        assert_eq!(series[2].longest_km, 0.0);
        assert_eq!(series[2].target_km, 8.0);
    }

    #[test]
    fn test_completion_rate_counts_only_due_runs() {
        let runs = vec![
            run("2026-06-03", 4.0, None, "easy", true), // pre-training
            run("2026-06-08", 5.0, None, "easy", true),
            run("2026-06-12", 10.0, None, "long", true),
            run("2026-06-23", 6.0, None, "easy", false),
            run("2026-06-25", 8.0, None, "easy", false), // future, ignored
        ];
        let rate = completion_rate(&runs, start(), date("2026-06-24"));

        assert_eq!(rate.scheduled, 4);
        assert_eq!(rate.completed, 3);
        assert_eq!(rate.rate_pct, 75.0);

        assert_eq!(rate.by_phase.len(), 2);
        assert_eq!(rate.by_phase[0].phase, TrainingPhase::PreTraining);
        assert_eq!(rate.by_phase[0].rate_pct, 100.0);
        assert_eq!(rate.by_phase[1].phase, TrainingPhase::Base);
        assert_eq!(rate.by_phase[1].completed, 2);
        assert_eq!(rate.by_phase[1].scheduled, 3);
        assert_eq!(rate.by_phase[1].rate_pct, 66.7);
    }

    #[test]
    fn test_streak_counts_consecutive_qualifying_weeks() {
        let runs = vec![
            run("2026-06-08", 12.0, None, "easy", true),
            run("2026-06-15", 11.0, None, "easy", true),
            run("2026-06-22", 12.0, None, "easy", true),
        ];
        assert_eq!(streak_weeks(&runs, start(), date("2026-06-24")), 3);
    }

    #[test]
    fn test_streak_zero_when_current_week_falls_short() {
        let runs = vec![
            run("2026-06-08", 20.0, None, "easy", true),
            run("2026-06-15", 20.0, None, "easy", true),
            run("2026-06-22", 8.0, None, "easy", true),
        ];
        assert_eq!(streak_weeks(&runs, start(), date("2026-06-24")), 0);
    }

    #[test]
    fn test_streak_breaks_at_first_short_week() {
        // Week 2 falls short; the strong week 1 behind it cannot extend
        // the streak past the break.
        let runs = vec![
            run("2026-06-08", 20.0, None, "easy", true),
            run("2026-06-15", 5.0, None, "easy", true),
            run("2026-06-22", 12.0, None, "easy", true),
        ];
        assert_eq!(streak_weeks(&runs, start(), date("2026-06-24")), 1);
    }

    #[test]
    fn test_streak_threshold_is_strict() {
        let runs = vec![run("2026-06-08", 10.0, None, "easy", true)];
        assert_eq!(streak_weeks(&runs, start(), date("2026-06-10")), 0);
    }

    #[test]
    fn test_summary_of_zero_runs() {
        let summary = summary(&[], start(), date("2026-06-24"));
        assert_eq!(summary, StatsSummary::default());
        assert_eq!(summary.avg_pace, "");
    }

    #[test]
    fn test_summary_totals() {
        let runs = vec![
            run("2026-06-08", 5.0, Some("5:30"), "easy", true),
            run("2026-06-12", 10.0, Some("6:00"), "long", true),
            run("2026-06-13", 20.0, None, "long", false), // scheduled only
        ];
        let summary = summary(&runs, start(), date("2026-06-13"));

        assert_eq!(summary.total_runs, 2);
        assert_eq!(summary.total_distance_km, 15.0);
        assert_eq!(summary.avg_pace, "5:50");
        assert_eq!(summary.longest_run_km, 10.0);
        assert_eq!(summary.streak_weeks, 1);
    }
}
