//! Adaptive rebalancing of the upcoming week.
//!
//! Each check-in rewrites the next seven days from their snapshots, so the
//! result depends only on the latest scores:
//! - Joint pain (>= 5) converts hard sessions to cross-training and trims
//!   long runs to 70%
//! - Otherwise high exertion (>= 5) slows easy and long runs by 30 s/mi
//! - Otherwise the generated plan is restored
//!
//! Race days are never touched.

use crate::store::WorkoutStore;
use crate::types::{PlannedPace, WorkoutRecord, WorkoutType};
use chrono::NaiveDate;
use std::fmt;

/// Scores at or above this trigger an adjustment
pub const SCORE_THRESHOLD: i32 = 5;
/// Days rewritten by a check-in, starting today
pub const WINDOW_DAYS: usize = 7;
/// Share of the original long run kept under joint pain
pub const LONG_RUN_REDUCTION: f64 = 0.7;
/// Pace slowdown applied under high exertion
pub const SLOWDOWN_SECS: u32 = 30;

/// Which branch a check-in took
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceDecision {
    VolumeReduced { joint: i32 },
    PacesSlowed { rpe: i32 },
    GreenLight,
}

impl fmt::Display for RebalanceDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceDecision::VolumeReduced { joint } => {
                write!(f, "Joint score {}. Volume reduced.", joint)
            }
            RebalanceDecision::PacesSlowed { rpe } => write!(f, "RPE is {}. Paces slowed.", rpe),
            RebalanceDecision::GreenLight => f.write_str("Green light! Plan locked."),
        }
    }
}

/// Outcome of a check-in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalanceReport {
    pub decision: RebalanceDecision,
    /// Records in the window, in date order
    pub window: Vec<u32>,
    /// Records left altered after this check-in
    pub altered: Vec<u32>,
}

/// Parse a 1-10 style score from form input
///
/// Anything that is not an integer yields `None`, which never meets the
/// threshold.
pub fn parse_score(input: &str) -> Option<i32> {
    input.trim().parse().ok()
}

fn decide(joint: Option<i32>, rpe: Option<i32>) -> RebalanceDecision {
    match (joint, rpe) {
        (Some(joint), _) if joint >= SCORE_THRESHOLD => RebalanceDecision::VolumeReduced { joint },
        (_, Some(rpe)) if rpe >= SCORE_THRESHOLD => RebalanceDecision::PacesSlowed { rpe },
        _ => RebalanceDecision::GreenLight,
    }
}

/// Rebalance the seven records starting at `today`
pub fn rebalance(
    store: &mut WorkoutStore,
    joint: Option<i32>,
    rpe: Option<i32>,
    today: NaiveDate,
) -> RebalanceReport {
    let decision = decide(joint, rpe);
    let window: Vec<u32> = store.upcoming(today, WINDOW_DAYS).map(|r| r.id).collect();

    let mut altered = Vec::new();
    for &id in &window {
        let changed = store
            .update(id, |record| {
                record.ensure_snapshot();
                record.revert();
                apply_decision(record, decision)
            })
            .unwrap_or(false);
        if changed {
            altered.push(id);
        }
    }

    tracing::info!(
        "Check-in (joint {:?}, rpe {:?}) on {}: {:?}, {} of {} workouts altered",
        joint,
        rpe,
        today,
        decision,
        altered.len(),
        window.len()
    );

    RebalanceReport {
        decision,
        window,
        altered,
    }
}

/// Apply one branch to a record already reset to its snapshot
fn apply_decision(record: &mut WorkoutRecord, decision: RebalanceDecision) -> bool {
    let Some(original) = record.original.clone() else {
        return false;
    };
    let protected_long = record.kind == WorkoutType::Long && !record.is_race_day();

    match decision {
        RebalanceDecision::VolumeReduced { .. } => {
            if record.kind.is_hard() {
                record.kind = WorkoutType::CrossTrain;
                record.title = format!("Converted from {}", original.title);
                record.planned_miles = 0.0;
                record.planned_pace = PlannedPace::not_applicable();
                record.is_altered = true;
            } else if protected_long {
                record.planned_miles = (original.miles * LONG_RUN_REDUCTION).round();
                record.title = format!("{} (Reduced)", original.title);
                record.is_altered = true;
            }
        }
        RebalanceDecision::PacesSlowed { .. } => {
            if record.kind == WorkoutType::Recovery || protected_long {
                record.planned_pace = original.pace.slowed_by(SLOWDOWN_SECS);
                record.title = format!("{} (Slowed Down)", original.title);
                record.is_altered = true;
            }
        }
        RebalanceDecision::GreenLight => {}
    }

    record.is_altered
}

/// Restore every altered record in the upcoming window to its snapshot
///
/// Returns the ids that were reverted.
pub fn revert_window(store: &mut WorkoutStore, today: NaiveDate) -> Vec<u32> {
    let altered: Vec<u32> = store
        .upcoming(today, WINDOW_DAYS)
        .filter(|r| r.is_altered)
        .map(|r| r.id)
        .collect();

    for &id in &altered {
        store.update(id, |record| record.revert());
    }

    tracing::info!("Reverted {} altered workouts from {}", altered.len(), today);
    altered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Sunday 2026-06-07 .. Saturday 2026-06-13 (20 mi long run)
    fn build_week() -> NaiveDate {
        ymd(2026, 6, 7)
    }

    fn on(store: &WorkoutStore, date: NaiveDate) -> &WorkoutRecord {
        store.get_by_date(date).unwrap()
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(" 7 "), Some(7));
        assert_eq!(parse_score("seven"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("5.5"), None);
    }

    #[test]
    fn test_joint_pain_converts_hard_sessions() {
        crate::logging::init_test();
        let mut store = WorkoutStore::generate();
        let report = rebalance(&mut store, Some(6), Some(1), build_week());

        assert_eq!(report.decision, RebalanceDecision::VolumeReduced { joint: 6 });
        assert_eq!(report.window.len(), 7);

        let tuesday = on(&store, ymd(2026, 6, 9));
        assert_eq!(tuesday.kind, WorkoutType::CrossTrain);
        assert!(tuesday.title.starts_with("Converted from "));
        assert_eq!(tuesday.planned_miles, 0.0);
        assert_eq!(tuesday.planned_pace, PlannedPace::not_applicable());
        assert!(tuesday.is_altered);

        let thursday = on(&store, ymd(2026, 6, 11));
        assert_eq!(thursday.kind, WorkoutType::CrossTrain);

        let saturday = on(&store, ymd(2026, 6, 13));
        assert_eq!(saturday.planned_miles, 14.0);
        assert_eq!(saturday.title, "Long Run (Reduced)");
        assert!(saturday.is_altered);

        // Easy days are untouched under joint pain
        let wednesday = on(&store, ymd(2026, 6, 10));
        assert!(!wednesday.is_altered);
        assert_eq!(wednesday.title, "Mid-Week Easy");
        assert!(wednesday.original.is_some());

        assert_eq!(report.altered.len(), 3);
    }

    #[test]
    fn test_high_rpe_slows_easy_and_long_runs() {
        let mut store = WorkoutStore::generate();
        let report = rebalance(&mut store, Some(2), Some(8), build_week());
        assert_eq!(report.decision, RebalanceDecision::PacesSlowed { rpe: 8 });

        let wednesday = on(&store, ymd(2026, 6, 10));
        assert_eq!(wednesday.planned_pace.to_string(), "8:00/mi (+30s/mi)");
        assert_eq!(wednesday.title, "Mid-Week Easy (Slowed Down)");

        let saturday = on(&store, ymd(2026, 6, 13));
        assert_eq!(saturday.planned_pace.to_string(), "7:45/mi (+30s/mi)");
        assert_eq!(saturday.planned_miles, 20.0);

        let tuesday = on(&store, ymd(2026, 6, 9));
        assert_eq!(tuesday.kind, WorkoutType::Speed);
        assert!(!tuesday.is_altered);
    }

    #[test]
    fn test_joint_pain_takes_priority() {
        let mut store = WorkoutStore::generate();
        let report = rebalance(&mut store, Some(5), Some(5), build_week());
        assert_eq!(report.decision, RebalanceDecision::VolumeReduced { joint: 5 });

        let wednesday = on(&store, ymd(2026, 6, 10));
        assert_eq!(wednesday.planned_pace.to_string(), "8:00/mi");
        let saturday = on(&store, ymd(2026, 6, 13));
        assert_eq!(saturday.planned_pace.to_string(), "7:45/mi");
        assert_eq!(saturday.planned_miles, 14.0);
    }

    #[test]
    fn test_rebalance_is_idempotent() {
        let mut once = WorkoutStore::generate();
        rebalance(&mut once, Some(7), None, build_week());

        let mut twice = WorkoutStore::generate();
        rebalance(&mut twice, Some(7), None, build_week());
        rebalance(&mut twice, Some(7), None, build_week());

        assert_eq!(once.records(), twice.records());
        // Title is not compounded
        assert_eq!(on(&twice, ymd(2026, 6, 13)).title, "Long Run (Reduced)");
    }

    #[test]
    fn test_green_light_restores_originals() {
        let generated = WorkoutStore::generate();
        let mut store = generated.clone();
        rebalance(&mut store, Some(9), None, build_week());
        rebalance(&mut store, None, Some(9), build_week());
        let report = rebalance(&mut store, Some(1), Some(1), build_week());

        assert_eq!(report.decision, RebalanceDecision::GreenLight);
        assert!(report.altered.is_empty());
        for id in report.window {
            let now = store.get(id).unwrap();
            let before = generated.get(id).unwrap();
            assert_eq!(now.plan(), before.plan());
            assert!(!now.is_altered);
            assert_eq!(now.original.as_ref(), Some(&before.plan()));
        }
    }

    #[test]
    fn test_reloaded_altered_plan_restores_generator_values() {
        let generated = WorkoutStore::generate();
        let mut store = generated.clone();
        rebalance(&mut store, Some(8), None, build_week());

        let saved = serde_json::to_string(store.records()).unwrap();
        let records: Vec<WorkoutRecord> = serde_json::from_str(&saved).unwrap();
        let mut reloaded = WorkoutStore::from_records(records).unwrap();

        let tuesday = on(&reloaded, ymd(2026, 6, 9));
        assert!(tuesday.is_altered);
        assert_eq!(tuesday.original.as_ref().unwrap().kind, WorkoutType::Speed);

        rebalance(&mut reloaded, Some(1), Some(1), build_week());
        let tuesday = on(&reloaded, ymd(2026, 6, 9));
        assert_eq!(tuesday.plan(), on(&generated, ymd(2026, 6, 9)).plan());
        assert!(!tuesday.is_altered);
    }

    #[test]
    fn test_unparseable_scores_do_not_alter() {
        let mut store = WorkoutStore::generate();
        let report = rebalance(
            &mut store,
            parse_score("high"),
            parse_score("??"),
            build_week(),
        );
        assert_eq!(report.decision, RebalanceDecision::GreenLight);
        assert!(store.records().iter().all(|r| !r.is_altered));
    }

    #[test]
    fn test_race_day_never_altered() {
        // Window Sunday 2026-04-26 .. Saturday 2026-05-02 ends on the half marathon
        let mut store = WorkoutStore::generate();
        rebalance(&mut store, Some(10), None, ymd(2026, 4, 26));
        let race = on(&store, ymd(2026, 5, 2));
        assert_eq!(race.title, "🏁 TACOMA HM");
        assert_eq!(race.planned_miles, 13.1);
        assert!(!race.is_altered);

        rebalance(&mut store, None, Some(10), ymd(2026, 4, 26));
        let race = on(&store, ymd(2026, 5, 2));
        assert_eq!(race.planned_pace.to_string(), "Race Pace");
        assert!(!race.is_altered);
    }

    #[test]
    fn test_records_outside_window_untouched() {
        let mut store = WorkoutStore::generate();
        rebalance(&mut store, Some(10), None, build_week());
        let next_tuesday = on(&store, ymd(2026, 6, 16));
        assert_eq!(next_tuesday.kind, WorkoutType::Speed);
        assert!(next_tuesday.original.is_none());
    }

    #[test]
    fn test_reduced_long_run_rounds() {
        // 13 mi on 2026-03-21 -> 9.1 -> 9
        let mut store = WorkoutStore::generate();
        rebalance(&mut store, Some(5), None, ymd(2026, 3, 15));
        assert_eq!(on(&store, ymd(2026, 3, 21)).planned_miles, 9.0);
    }

    #[test]
    fn test_revert_window() {
        let mut store = WorkoutStore::generate();
        rebalance(&mut store, Some(8), None, build_week());
        let reverted = revert_window(&mut store, build_week());
        assert_eq!(reverted.len(), 3);
        assert!(store.records().iter().all(|r| !r.is_altered));
        assert_eq!(on(&store, ymd(2026, 6, 9)).kind, WorkoutType::Speed);
    }
}
