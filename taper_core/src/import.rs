//! Activity import.
//!
//! Converts activity-feed runs (Strava's summary format) into logged results
//! and applies them to the store. Fetching is left to the caller.

use crate::calendar::parse_iso_date;
use crate::pace::{grade_adjusted_pace, Pace};
use crate::store::WorkoutStore;
use crate::types::LoggedResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MILES_PER_METER: f64 = 0.000621371;
const FEET_PER_METER: f64 = 3.28084;
/// Meters per second at one mile per minute
const MPS_AT_ONE_MILE_PER_MIN: f64 = 26.8224;

/// Activity summary as returned by the activity feed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Meters per second
    #[serde(default)]
    pub average_speed: f64,
    /// Local start time, e.g. `2026-03-02T07:15:00Z`
    pub start_date_local: String,
}

impl Activity {
    pub fn is_run(&self) -> bool {
        self.activity_type == "Run"
    }

    /// Local calendar date the activity started on
    pub fn local_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.start_date_local)
    }

    /// Convert to a logged result
    ///
    /// `None` for non-runs, runs without speed, and speeds too slow to
    /// express as a pace.
    pub fn to_result(&self) -> Option<LoggedResult> {
        if !self.is_run() || self.average_speed.is_nan() || self.average_speed <= 0.0 {
            return None;
        }

        let miles = round_to(self.distance * MILES_PER_METER, 2);
        let elev_ft = (self.total_elevation_gain * FEET_PER_METER).round();

        let minutes_per_mile = MPS_AT_ONE_MILE_PER_MIN / self.average_speed;
        let whole_minutes = minutes_per_mile.floor();
        if !whole_minutes.is_finite() || whole_minutes > f64::from(u32::MAX) {
            return None;
        }
        let seconds = ((minutes_per_mile - whole_minutes) * 60.0).floor();
        let pace = Pace::checked_from_min_sec(whole_minutes as u32, seconds as u32)?;

        Some(LoggedResult {
            miles: Some(miles),
            pace: Some(pace),
            elev_ft: Some(elev_ft),
            gap: grade_adjusted_pace(miles, pace, elev_ft),
            notes: Some(format!("Strava Sync: {}", self.name)),
        })
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Result of applying an activity batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Dates that received a result
    pub synced: Vec<NaiveDate>,
    /// Runs with no matching workout, or whose workout was already logged
    pub skipped: usize,
    /// Non-run activities and runs without speed data
    pub ignored: usize,
}

/// Apply activities to the store in feed order
///
/// The first run for a date wins; existing logged results are never
/// overwritten.
pub fn apply_activities(store: &mut WorkoutStore, activities: &[Activity]) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for activity in activities {
        let (Some(result), Some(date)) = (activity.to_result(), activity.local_date()) else {
            summary.ignored += 1;
            continue;
        };

        if store.log_import(date, result) {
            tracing::info!("Imported '{}' into workout on {}", activity.name, date);
            summary.synced.push(date);
        } else {
            summary.skipped += 1;
        }
    }

    tracing::info!(
        "Activity import: {} synced, {} skipped, {} ignored",
        summary.synced.len(),
        summary.skipped,
        summary.ignored
    );
    summary
}
