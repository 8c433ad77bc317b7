//! The fixed periodization template.
//!
//! Dates, progressions and the long-run table are business rules for one
//! training season, not inputs. `validate` checks the tables for internal
//! consistency; the generator assumes they pass.

use crate::calendar::week_saturday;
use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// First day of the plan
pub const PLAN_START: (i32, u32, u32) = (2026, 2, 1);
/// Last day of the plan, inclusive
pub const PLAN_END: (i32, u32, u32) = (2026, 8, 31);
/// Week 0 of the speed/tempo progressions
pub const PERIODIZATION_START: (i32, u32, u32) = (2026, 3, 1);

/// Long-run target for Saturdays not in the table
pub const FALLBACK_LONG_RUN_MILES: f64 = 8.0;

/// Tuesday session titles, one per periodized week
pub const SPEED_PROGRESSION: [&str; 21] = [
    "8x400m",
    "4x1200m",
    "6x800m",
    "3x1600m",
    "10x400m",
    "5x1200m",
    "7x800m",
    "3x1600m",
    "12x400m",
    "8x800m",
    "4x1600m",
    "12x400m",
    "6x1200m",
    "7x800m",
    "3x1600m",
    "5x1000m",
    "Yasso 800s (8x)",
    "Yasso 800s (10x)",
    "4x1200m",
    "Fartlek",
    "Shakeout",
];

/// Thursday session titles, one per periodized week
pub const TEMPO_PROGRESSION: [&str; 21] = [
    "Short Tempo",
    "Mid Tempo",
    "Mid Tempo",
    "Short Tempo",
    "Mid Tempo",
    "Mid Tempo",
    "Long Tempo",
    "Long Tempo",
    "Short Tempo",
    "Mid Tempo",
    "Long Tempo",
    "Mid Tempo",
    "Mid Tempo",
    "Short Tempo",
    "Long Tempo",
    "Long Tempo",
    "Long Tempo",
    "Marathon Pace",
    "Mid Tempo",
    "Short Tempo",
    "Race Week Tempo",
];

const LONG_RUN_TABLE: [((i32, u32, u32), f64); 25] = [
    ((2026, 2, 7), 8.0),
    ((2026, 2, 14), 10.0),
    ((2026, 2, 21), 8.0),
    ((2026, 2, 28), 10.0),
    ((2026, 3, 7), 12.0),
    ((2026, 3, 14), 5.0),
    ((2026, 3, 21), 13.0),
    ((2026, 3, 28), 14.0),
    ((2026, 4, 4), 15.0),
    ((2026, 4, 11), 10.0),
    ((2026, 4, 18), 16.0),
    ((2026, 4, 25), 8.0),
    ((2026, 5, 2), 13.1),
    ((2026, 5, 9), 10.0),
    ((2026, 5, 16), 14.0),
    ((2026, 5, 23), 16.0),
    ((2026, 5, 30), 18.0),
    ((2026, 6, 6), 14.0),
    ((2026, 6, 13), 20.0),
    ((2026, 6, 20), 16.0),
    ((2026, 6, 27), 22.0),
    ((2026, 7, 4), 20.0),
    ((2026, 7, 11), 12.0),
    ((2026, 7, 18), 6.0),
    ((2026, 7, 25), 26.2),
];

/// A goal race replacing the Saturday long run
#[derive(Clone, Debug)]
pub struct RaceDay {
    pub date: NaiveDate,
    pub title: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
}

/// Inclusive date window
#[derive(Clone, Copy, Debug)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// All template dates resolved to `NaiveDate`
#[derive(Debug)]
pub struct Template {
    pub plan_start: NaiveDate,
    pub plan_end: NaiveDate,
    pub periodization_start: NaiveDate,
    pub long_runs: HashMap<NaiveDate, f64>,
    pub half_marathon: RaceDay,
    pub marathon: RaceDay,
    /// Travel blackout: rest on every non-Saturday
    pub travel_blackout: DateWindow,
    /// Pre-marathon travel taper
    pub race_taper: DateWindow,
}

impl Template {
    /// Race days in calendar order
    pub fn races(&self) -> [&RaceDay; 2] {
        [&self.half_marathon, &self.marathon]
    }

    /// Race scheduled on a date, if any
    pub fn race_on(&self, date: NaiveDate) -> Option<&RaceDay> {
        self.races().into_iter().find(|r| r.date == date)
    }

    /// Long-run target for the week containing `date`
    pub fn long_run_for_week(&self, date: NaiveDate) -> f64 {
        self.long_runs
            .get(&week_saturday(date))
            .copied()
            .unwrap_or(FALLBACK_LONG_RUN_MILES)
    }

    /// Days after the final race are recovery
    pub fn is_post_race(&self, date: NaiveDate) -> bool {
        date > self.marathon.date
    }

    /// Check the tables for internal consistency
    ///
    /// Returns a list of problems; empty means the template is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.plan_start > self.plan_end {
            errors.push("Plan start is after plan end".to_string());
        }
        if SPEED_PROGRESSION.len() != TEMPO_PROGRESSION.len() {
            errors.push("Speed and tempo progressions differ in length".to_string());
        }

        for (date, miles) in &self.long_runs {
            if date.weekday() != Weekday::Sat {
                errors.push(format!("Long run on {} is not a Saturday", date));
            }
            if *miles <= 0.0 {
                errors.push(format!("Long run on {} has no distance", date));
            }
        }

        for race in self.races() {
            if race.date.weekday() != Weekday::Sat {
                errors.push(format!("Race {} is not on a Saturday", race.short_name));
            }
            if !self.long_runs.contains_key(&race.date) {
                errors.push(format!("Race {} has no long-run entry", race.short_name));
            }
            if !race.title.contains(crate::types::RACE_MARKER) {
                errors.push(format!("Race {} title lacks the race marker", race.short_name));
            }
        }

        for window in [self.travel_blackout, self.race_taper] {
            if window.start > window.end {
                errors.push(format!("Window {} .. {} is inverted", window.start, window.end));
            }
        }

        errors
    }
}

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn build_template() -> Template {
    Template {
        plan_start: ymd(PLAN_START),
        plan_end: ymd(PLAN_END),
        periodization_start: ymd(PERIODIZATION_START),
        long_runs: LONG_RUN_TABLE
            .iter()
            .map(|(date, miles)| (ymd(*date), *miles))
            .collect(),
        half_marathon: RaceDay {
            date: ymd((2026, 5, 2)),
            title: "🏁 TACOMA HM",
            short_name: "Tacoma HM",
            description: "Sub-1:25 attempt.",
        },
        marathon: RaceDay {
            date: ymd((2026, 7, 25)),
            title: "🏁 JACK & JILL MARATHON",
            short_name: "Jack & Jill Marathon",
            description: "Sub-3 Attempt.",
        },
        travel_blackout: DateWindow {
            start: ymd((2026, 3, 13)),
            end: ymd((2026, 3, 17)),
        },
        race_taper: DateWindow {
            start: ymd((2026, 7, 12)),
            end: ymd((2026, 7, 18)),
        },
    }
}

/// Cached template - built once and reused
static TEMPLATE: Lazy<Template> = Lazy::new(build_template);

/// The season's template
pub fn template() -> &'static Template {
    &TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_validates() {
        let errors = template().validate();
        assert!(errors.is_empty(), "Template has validation errors: {:?}", errors);
    }

    #[test]
    fn test_long_run_lookup_uses_week_saturday() {
        let t = template();
        // Tuesday 2026-06-09 belongs to the week ending Saturday 2026-06-13 (20 mi)
        assert_eq!(t.long_run_for_week(ymd((2026, 6, 9))), 20.0);
        // Week ending 2026-08-01 is not in the table
        assert_eq!(t.long_run_for_week(ymd((2026, 7, 29))), FALLBACK_LONG_RUN_MILES);
    }

    #[test]
    fn test_race_lookup() {
        let t = template();
        assert_eq!(t.race_on(ymd((2026, 5, 2))).unwrap().short_name, "Tacoma HM");
        assert!(t.race_on(ymd((2026, 5, 9))).is_none());
    }

    #[test]
    fn test_windows_are_inclusive() {
        let t = template();
        assert!(t.travel_blackout.contains(ymd((2026, 3, 13))));
        assert!(t.travel_blackout.contains(ymd((2026, 3, 17))));
        assert!(!t.travel_blackout.contains(ymd((2026, 3, 18))));
        assert!(!t.is_post_race(ymd((2026, 7, 25))));
        assert!(t.is_post_race(ymd((2026, 7, 26))));
    }
}
