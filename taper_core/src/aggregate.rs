//! Derived views over the plan: weekly mileage buckets and dashboard widgets.

use crate::calendar::{days_between, short_label, week_anchor};
use crate::template::template;
use crate::types::WorkoutRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Mileage for one Sunday-anchored week
///
/// `achieved` and `future` stack into a single bar: logged miles plus the
/// planned miles still ahead.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyMileage {
    pub anchor: NaiveDate,
    pub label: String,
    pub achieved: f64,
    pub future: f64,
}

impl WeeklyMileage {
    pub fn total(&self) -> f64 {
        self.achieved + self.future
    }
}

/// Bucket records by week
///
/// A logged run always counts as achieved. An unlogged day counts its
/// planned miles as future only when it is today or later; missed past
/// workouts contribute nothing.
pub fn weekly_mileage(records: &[WorkoutRecord], today: NaiveDate) -> Vec<WeeklyMileage> {
    let mut weeks: BTreeMap<NaiveDate, WeeklyMileage> = BTreeMap::new();

    for record in records {
        let anchor = week_anchor(record.date);
        let week = weeks.entry(anchor).or_insert_with(|| WeeklyMileage {
            anchor,
            label: short_label(anchor),
            achieved: 0.0,
            future: 0.0,
        });

        if let Some(miles) = record.actual_miles {
            week.achieved += miles;
        } else if record.date >= today {
            week.future += record.planned_miles;
        }
    }

    weeks.into_values().collect()
}

// ============================================================================
// Widgets
// ============================================================================

/// Shoe wear bands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShoeStatus {
    Fresh,
    /// Over 250 mi
    Worn,
    /// Over 320 mi
    Replace,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShoeMileage {
    pub miles: f64,
    pub limit: f64,
    pub status: ShoeStatus,
}

impl ShoeMileage {
    /// Share of the limit used, capped at 100
    pub fn percent(&self) -> f64 {
        if self.limit <= 0.0 {
            return 100.0;
        }
        (self.miles / self.limit * 100.0).min(100.0)
    }
}

/// Logged miles split between easy and hard running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntensitySplit {
    pub easy_percent: u32,
    pub hard_percent: u32,
}

/// Days until a race, or passed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    Days(i64),
    Passed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RaceCountdown {
    pub name: &'static str,
    pub date: NaiveDate,
    pub countdown: Countdown,
}

/// Dashboard summary
#[derive(Clone, Debug, PartialEq)]
pub struct Widgets {
    pub shoe: ShoeMileage,
    /// `None` until any easy or hard miles are logged
    pub split: Option<IntensitySplit>,
    pub races: Vec<RaceCountdown>,
}

/// Compute the dashboard widgets
pub fn widgets(records: &[WorkoutRecord], today: NaiveDate, shoe_limit: f64) -> Widgets {
    let mut total = 0.0;
    let mut hard = 0.0;
    let mut easy = 0.0;

    for record in records {
        let miles = record.actual_miles.unwrap_or(0.0);
        total += miles;
        if record.kind.is_hard() {
            hard += miles;
        }
        if record.kind.is_easy_run() {
            easy += miles;
        }
    }

    let status = if total > 320.0 {
        ShoeStatus::Replace
    } else if total > 250.0 {
        ShoeStatus::Worn
    } else {
        ShoeStatus::Fresh
    };

    let running = easy + hard;
    let split = (running > 0.0).then(|| {
        let easy_percent = (easy / running * 100.0).round() as u32;
        IntensitySplit {
            easy_percent,
            hard_percent: 100 - easy_percent,
        }
    });

    let races = template()
        .races()
        .into_iter()
        .map(|race| {
            let days = days_between(today, race.date);
            RaceCountdown {
                name: race.short_name,
                date: race.date,
                countdown: if days > 0 {
                    Countdown::Days(days)
                } else {
                    Countdown::Passed
                },
            }
        })
        .collect();

    Widgets {
        shoe: ShoeMileage {
            miles: total,
            limit: shoe_limit,
            status,
        },
        split,
        races,
    }
}
