//! Plan generator.
//!
//! Builds one `WorkoutRecord` per day of the template horizon:
//! 1. Pick the periodized week index for the speed/tempo progressions
//! 2. Look up the week's long-run target and derive midweek easy mileage
//! 3. Fill the day from the weekday table (races override Saturdays)
//! 4. Apply date-window overrides in order: travel, taper, post-race

use crate::calendar::{date_range, days_between};
use crate::template::{template, Template, SPEED_PROGRESSION, TEMPO_PROGRESSION};
use crate::types::{PlannedPace, WorkoutRecord, WorkoutType};
use chrono::{Datelike, NaiveDate, Weekday};

/// Plan values for one day before an id is assigned
#[derive(Clone, Debug, PartialEq)]
struct DayPlan {
    kind: WorkoutType,
    title: String,
    miles: f64,
    pace: PlannedPace,
    description: String,
}

impl DayPlan {
    fn new(kind: WorkoutType, title: &str, miles: f64, pace: PlannedPace, description: &str) -> Self {
        DayPlan {
            kind,
            title: title.to_string(),
            miles,
            pace,
            description: description.to_string(),
        }
    }
}

/// Generate the full season plan
///
/// Deterministic: ids run from 1 in date order, one record per day.
pub fn generate() -> Vec<WorkoutRecord> {
    let t = template();

    let records: Vec<WorkoutRecord> = date_range(t.plan_start, t.plan_end)
        .zip(1u32..)
        .map(|(date, id)| {
            let plan = plan_for_day(t, date);
            WorkoutRecord {
                id,
                date,
                kind: plan.kind,
                title: plan.title,
                planned_miles: plan.miles,
                planned_pace: plan.pace,
                description: plan.description,
                actual_miles: None,
                actual_pace: None,
                actual_elev: None,
                actual_gap: None,
                notes: None,
                original: None,
                is_altered: false,
            }
        })
        .collect();

    tracing::info!(
        "Generated {} workouts from {} to {}",
        records.len(),
        t.plan_start,
        t.plan_end
    );
    records
}

/// Index into the speed/tempo progressions for a date
///
/// Days before the periodization start map to week 0; days past the end of
/// the progressions repeat the final entry.
pub fn week_index(t: &Template, date: NaiveDate) -> usize {
    let weeks = days_between(t.periodization_start, date).div_euclid(7);
    let last = SPEED_PROGRESSION.len() - 1;
    usize::try_from(weeks).map_or(0, |w| w.min(last))
}

fn plan_for_day(t: &Template, date: NaiveDate) -> DayPlan {
    let mut plan = weekday_plan(t, date);
    apply_overrides(t, date, &mut plan);
    plan
}

fn weekday_plan(t: &Template, date: NaiveDate) -> DayPlan {
    let index = week_index(t, date);
    let long_run = t.long_run_for_week(date);
    let wed_easy = (long_run * 0.35).floor().max(4.0);
    let fri_easy = (long_run * 0.25).floor().max(3.0);

    match date.weekday() {
        Weekday::Mon => DayPlan::new(
            WorkoutType::CrossTrain,
            "Rock Climb + Pre-Hab",
            0.0,
            PlannedPace::not_applicable(),
            "Climbing session + 15 mins dumbbell work.",
        ),
        Weekday::Tue => DayPlan::new(
            WorkoutType::Speed,
            SPEED_PROGRESSION[index],
            6.0,
            PlannedPace::see_calc(),
            "Hills or track intervals.",
        ),
        Weekday::Wed => DayPlan::new(
            WorkoutType::Recovery,
            "Mid-Week Easy",
            wed_easy,
            PlannedPace::per_mile(8, 0),
            "Strictly easy.",
        ),
        Weekday::Thu => DayPlan::new(
            WorkoutType::Tempo,
            TEMPO_PROGRESSION[index],
            7.0,
            PlannedPace::see_calc(),
            "Lactate threshold effort.",
        ),
        Weekday::Fri => DayPlan::new(
            WorkoutType::Recovery,
            "Easy Run",
            fri_easy,
            PlannedPace::per_mile(8, 0),
            "Shakeout.",
        ),
        Weekday::Sat => match t.race_on(date) {
            Some(race) if race.date == t.half_marathon.date => DayPlan::new(
                WorkoutType::Long,
                race.title,
                long_run,
                PlannedPace::race_pace(),
                race.description,
            ),
            Some(race) => DayPlan::new(
                WorkoutType::Long,
                race.title,
                long_run,
                PlannedPace::per_mile(6, 50),
                race.description,
            ),
            None => DayPlan::new(
                WorkoutType::Long,
                "Long Run",
                long_run,
                PlannedPace::per_mile(7, 45),
                "Aerobic development.",
            ),
        },
        Weekday::Sun => DayPlan::new(
            WorkoutType::Rest,
            "Full Rest",
            0.0,
            PlannedPace::not_applicable(),
            "Zero impact.",
        ),
    }
}

/// Date-window overrides; later rules overwrite earlier ones
///
/// Travel Day and Travel Taper days are real rest days here: 0 mi and `N/A`
/// pace, keeping only the weekday description. Weekday miles and pace are
/// not carried over, so the week of 2026-07-12 plans 10 mi where the
/// weekday table alone would give 26 mi.
fn apply_overrides(t: &Template, date: NaiveDate, plan: &mut DayPlan) {
    let weekday = date.weekday();

    if t.travel_blackout.contains(date) && weekday != Weekday::Sat {
        *plan = DayPlan::new(
            WorkoutType::Rest,
            "Travel Day",
            0.0,
            PlannedPace::not_applicable(),
            &plan.description,
        );
    }

    if t.race_taper.contains(date) && weekday != Weekday::Sat {
        if weekday == Weekday::Wed {
            plan.kind = WorkoutType::Recovery;
            plan.title = "Shakeout".into();
        } else {
            *plan = DayPlan::new(
                WorkoutType::Rest,
                "Travel Taper",
                0.0,
                PlannedPace::not_applicable(),
                &plan.description,
            );
        }
    }

    if t.is_post_race(date) {
        *plan = match weekday {
            Weekday::Mon | Weekday::Fri => DayPlan::new(
                WorkoutType::CrossTrain,
                "Light Climb / Walk",
                0.0,
                PlannedPace::not_applicable(),
                "Active recovery.",
            ),
            _ => DayPlan::new(
                WorkoutType::Rest,
                "Recovery Block",
                0.0,
                PlannedPace::not_applicable(),
                "Post-marathon healing.",
            ),
        };
    }
}
