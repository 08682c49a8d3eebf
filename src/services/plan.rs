//! Training week arithmetic and target progression.
//!
//! Weeks run Sunday–Saturday and are numbered relative to the plan start:
//! week 1 is the week containing the start date, and dates before that
//! anchor yield week numbers ≤ 0 ("pre-training"). All functions here are
//! pure and total — the week number is defined for every date.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::db::models::TargetOverrideRow;
use crate::db::queries;

/// Goal distance the long-run progression builds toward (half marathon).
const HALF_MARATHON_KM: f64 = 21.1;

/// Last week of the base-building segment.
const BASE_END_WEEK: i64 = 11;
/// Last week of the extension segment.
const BUILD_END_WEEK: i64 = 26;
/// Week at which the long-run progression reaches its goal distance.
const LONG_RUN_PEAK_WEEK: i64 = 30;

/// A training week number. Negative and zero values are pre-training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TrainingWeek(i64);

impl TrainingWeek {
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// The week containing `date`, relative to the plan's `start_date`.
    pub fn for_date(start_date: NaiveDate, date: NaiveDate) -> Self {
        let anchor = week_anchor(start_date);
        let days = (date - anchor).num_days();
        Self(days.div_euclid(7) + 1)
    }

    pub fn number(self) -> i64 {
        self.0
    }

    pub fn phase(self) -> TrainingPhase {
        match self.0 {
            w if w <= 0 => TrainingPhase::PreTraining,
            w if w <= BASE_END_WEEK => TrainingPhase::Base,
            w if w <= BUILD_END_WEEK => TrainingPhase::Build,
            _ => TrainingPhase::Taper,
        }
    }

    /// Display label for chart axes: "Week 3", or "Pre 1" for the week
    /// immediately before the plan start.
    pub fn label(self) -> String {
        if self.0 >= 1 {
            format!("Week {}", self.0)
        } else {
            format!("Pre {}", 1 - self.0)
        }
    }
}

/// Progression stage a training week belongs to. Ordered by progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
    PreTraining,
    Base,
    Build,
    Taper,
}

impl std::fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreTraining => write!(f, "pre_training"),
            Self::Base => write!(f, "base"),
            Self::Build => write!(f, "build"),
            Self::Taper => write!(f, "taper"),
        }
    }
}

/// Sunday of the week containing `date`.
pub fn week_anchor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Today's date in the user's timezone (fixed UTC offset).
pub fn local_today(utc_offset_hours: i32) -> NaiveDate {
    (Utc::now() + Duration::hours(utc_offset_hours as i64)).date_naive()
}

/// Weekly mileage target in km.
///
/// Three segments: linear base building to week 11, a gentler extension to
/// week 26, then a taper that never drops below 25 km.
pub fn weekly_mileage_target(week: TrainingWeek) -> f64 {
    let w = week.number();
    if w <= 0 {
        0.0
    } else if w <= BASE_END_WEEK {
        10.0 + 1.5 * (w - 1) as f64
    } else if w <= BUILD_END_WEEK {
        25.0 + 1.33 * (w - BASE_END_WEEK) as f64
    } else {
        (45.0 - 3.0 * (w - BUILD_END_WEEK) as f64).max(25.0)
    }
}

/// Long-run target in km: 7 km in week 1 rising linearly to the half
/// marathon distance by week 30, then holding at 80% of it.
pub fn long_run_target(week: TrainingWeek) -> f64 {
    let w = week.number();
    if w <= 0 {
        0.0
    } else if w <= LONG_RUN_PEAK_WEEK {
        7.0 + (HALF_MARATHON_KM - 7.0) * (w - 1) as f64 / (LONG_RUN_PEAK_WEEK - 1) as f64
    } else {
        HALF_MARATHON_KM * 0.8
    }
}

/// Resolved targets for one training week.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrainingWeekTarget {
    pub week_number: i64,
    pub phase: TrainingPhase,
    pub weekly_mileage_km: f64,
    pub long_run_km: f64,
}

impl TrainingWeekTarget {
    /// Targets derived from the progression formulas alone.
    pub fn for_week(week: TrainingWeek) -> Self {
        Self {
            week_number: week.number(),
            phase: week.phase(),
            weekly_mileage_km: weekly_mileage_target(week),
            long_run_km: long_run_target(week),
        }
    }

    /// Apply a persisted override. The phase still derives from the week
    /// number; only the distance targets are replaced.
    pub fn with_override(mut self, o: &TargetOverrideRow) -> Self {
        self.weekly_mileage_km = o.weekly_mileage_km;
        self.long_run_km = o.long_run_km;
        self
    }
}

/// Resolve the target for the week containing `today`: the progression
/// formulas, plus the persisted override when one exists for that week.
/// Overrides for other weeks are never consulted.
pub async fn current_target(
    pool: &SqlitePool,
    start_date: NaiveDate,
    today: NaiveDate,
) -> Result<TrainingWeekTarget, sqlx::Error> {
    let week = TrainingWeek::for_date(start_date, today);
    let mut target = TrainingWeekTarget::for_week(week);
    if let Some(o) = queries::get_target_override(pool, week.number()).await? {
        target = target.with_override(&o);
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_week_anchor_is_sunday() {
        // 2026-08-05 is a Wednesday; its week's Sunday is 2026-08-02.
        assert_eq!(week_anchor(date("2026-08-05")), date("2026-08-02"));
        // A Sunday anchors itself.
        assert_eq!(week_anchor(date("2026-08-02")), date("2026-08-02"));
        // A Saturday belongs to the preceding Sunday's week.
        assert_eq!(week_anchor(date("2026-08-08")), date("2026-08-02"));
    }

    #[test]
    fn test_start_date_falls_in_week_one() {
        let start = date("2026-08-05"); // Wednesday
        assert_eq!(TrainingWeek::for_date(start, start).number(), 1);
        // Same Sunday–Saturday span is still week 1.
        assert_eq!(TrainingWeek::for_date(start, date("2026-08-02")).number(), 1);
        assert_eq!(TrainingWeek::for_date(start, date("2026-08-08")).number(), 1);
        // The following Sunday rolls into week 2.
        assert_eq!(TrainingWeek::for_date(start, date("2026-08-09")).number(), 2);
    }

    #[test]
    fn test_dates_before_anchor_are_pre_training() {
        let start = date("2026-08-05");
        let w0 = TrainingWeek::for_date(start, date("2026-08-01"));
        assert_eq!(w0.number(), 0);
        assert_eq!(w0.phase(), TrainingPhase::PreTraining);
        assert_eq!(w0.label(), "Pre 1");

        let w_minus1 = TrainingWeek::for_date(start, date("2026-07-25"));
        assert_eq!(w_minus1.number(), -1);
        assert_eq!(w_minus1.label(), "Pre 2");
    }

    #[test]
    fn test_targets_zero_before_plan() {
        for w in [-5, -1, 0] {
            assert_eq!(weekly_mileage_target(TrainingWeek::new(w)), 0.0);
            assert_eq!(long_run_target(TrainingWeek::new(w)), 0.0);
        }
    }

    #[test]
    fn test_weekly_mileage_segments() {
        assert_eq!(weekly_mileage_target(TrainingWeek::new(1)), 10.0);
        assert_eq!(weekly_mileage_target(TrainingWeek::new(11)), 25.0);
        assert!((weekly_mileage_target(TrainingWeek::new(12)) - 26.33).abs() < 1e-9);
        assert!((weekly_mileage_target(TrainingWeek::new(26)) - 44.95).abs() < 1e-9);
        // Taper: 45 - 3 per week, floored at 25.
        assert_eq!(weekly_mileage_target(TrainingWeek::new(27)), 42.0);
        assert_eq!(weekly_mileage_target(TrainingWeek::new(33)), 25.0);
        assert_eq!(weekly_mileage_target(TrainingWeek::new(50)), 25.0);
    }

    #[test]
    fn test_weekly_mileage_non_decreasing_through_build() {
        for w in 1..26 {
            assert!(
                weekly_mileage_target(TrainingWeek::new(w + 1))
                    >= weekly_mileage_target(TrainingWeek::new(w)),
                "mileage target decreased between weeks {} and {}",
                w,
                w + 1
            );
        }
    }

    #[test]
    fn test_long_run_progression() {
        assert_eq!(long_run_target(TrainingWeek::new(1)), 7.0);
        assert!((long_run_target(TrainingWeek::new(30)) - HALF_MARATHON_KM).abs() < 1e-9);
        for w in 1..30 {
            assert!(
                long_run_target(TrainingWeek::new(w + 1)) >= long_run_target(TrainingWeek::new(w))
            );
        }
        // After the peak the target holds at 80% of goal distance.
        assert!((long_run_target(TrainingWeek::new(31)) - 16.88).abs() < 1e-9);
        assert!((long_run_target(TrainingWeek::new(52)) - 16.88).abs() < 1e-9);
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(TrainingWeek::new(1).phase(), TrainingPhase::Base);
        assert_eq!(TrainingWeek::new(11).phase(), TrainingPhase::Base);
        assert_eq!(TrainingWeek::new(12).phase(), TrainingPhase::Build);
        assert_eq!(TrainingWeek::new(26).phase(), TrainingPhase::Build);
        assert_eq!(TrainingWeek::new(27).phase(), TrainingPhase::Taper);
    }

    #[test]
    fn test_override_replaces_distances_not_phase() {
        let target = TrainingWeekTarget::for_week(TrainingWeek::new(5)).with_override(
            &TargetOverrideRow {
                week_number: 5,
                weekly_mileage_km: 30.0,
                long_run_km: 14.0,
            },
        );
        assert_eq!(target.weekly_mileage_km, 30.0);
        assert_eq!(target.long_run_km, 14.0);
        assert_eq!(target.phase, TrainingPhase::Base);
        assert_eq!(target.week_number, 5);
    }

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_current_target_honors_current_week_override_only() {
        let pool = test_pool().await;
        let start = date("2026-06-07"); // Sunday; week 3 spans Jun 21–27
        let today = date("2026-06-24");

        for (week, mileage, long) in [(3_i64, 40.0, 18.0), (4, 99.0, 99.0)] {
            sqlx::query(
                "INSERT INTO target_overrides (week_number, weekly_mileage_km, long_run_km)
                 VALUES (?, ?, ?)",
            )
            .bind(week)
            .bind(mileage)
            .bind(long)
            .execute(&pool)
            .await
            .unwrap();
        }

        let target = current_target(&pool, start, today).await.unwrap();
        assert_eq!(target.week_number, 3);
        assert_eq!(target.weekly_mileage_km, 40.0);
        assert_eq!(target.long_run_km, 18.0);
        assert_eq!(target.phase, TrainingPhase::Base);

        // A week without an override falls back to the formulas.
        let week5 = current_target(&pool, start, date("2026-07-05")).await.unwrap();
        assert_eq!(week5.week_number, 5);
        assert_eq!(
            week5.weekly_mileage_km,
            weekly_mileage_target(TrainingWeek::new(5))
        );
    }
}
