//! Core domain types for the Taper training calendar.
//!
//! This module defines:
//! - Workout types and planned-pace targets as closed enums
//! - The per-day `WorkoutRecord` and its "original" snapshot layer
//! - Logged results entered by hand or imported from an activity feed
//!
//! Field names of `WorkoutRecord` are part of the persisted document format.

use crate::pace::{grade_adjusted_pace_str, parse_number, Pace};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title marker reserved for race days
pub const RACE_MARKER: &str = "🏁";

// ============================================================================
// Workout Types
// ============================================================================

/// Kind of session scheduled for a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkoutType {
    Recovery,
    Speed,
    Tempo,
    Long,
    #[serde(rename = "Cross-Train")]
    CrossTrain,
    Rest,
}

impl WorkoutType {
    /// Hard sessions count toward the "hard" side of the intensity split
    pub fn is_hard(self) -> bool {
        matches!(self, WorkoutType::Speed | WorkoutType::Tempo)
    }

    /// Easy running sessions count toward the "easy" side of the split
    pub fn is_easy_run(self) -> bool {
        matches!(self, WorkoutType::Recovery | WorkoutType::Long)
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkoutType::Recovery => "Recovery",
            WorkoutType::Speed => "Speed",
            WorkoutType::Tempo => "Tempo",
            WorkoutType::Long => "Long",
            WorkoutType::CrossTrain => "Cross-Train",
            WorkoutType::Rest => "Rest",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Planned Pace
// ============================================================================

/// What pace a planned session should be run at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaceTarget {
    /// Fixed per-mile pace
    PerMile(Pace),
    /// Effort based; derive from the training-pace calculator
    SeeCalc,
    /// Goal race effort
    RacePace,
    /// Non-running day
    NotApplicable,
}

/// Planned pace with an optional slowdown applied by the rebalancer
///
/// Persisted as its display string, e.g. `"8:00/mi"`, `"See Calc"` or
/// `"7:45/mi (+30s/mi)"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PlannedPace {
    pub target: PaceTarget,
    pub slowdown_secs: Option<u32>,
}

impl PlannedPace {
    pub fn per_mile(minutes: u32, seconds: u32) -> Self {
        PaceTarget::PerMile(Pace::from_min_sec(minutes, seconds)).into()
    }

    pub fn see_calc() -> Self {
        PaceTarget::SeeCalc.into()
    }

    pub fn race_pace() -> Self {
        PaceTarget::RacePace.into()
    }

    pub fn not_applicable() -> Self {
        PaceTarget::NotApplicable.into()
    }

    /// Same target with a slowdown annotation
    pub fn slowed_by(self, seconds: u32) -> Self {
        PlannedPace {
            target: self.target,
            slowdown_secs: Some(seconds),
        }
    }
}

impl From<PaceTarget> for PlannedPace {
    fn from(target: PaceTarget) -> Self {
        PlannedPace {
            target,
            slowdown_secs: None,
        }
    }
}

impl fmt::Display for PlannedPace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            PaceTarget::PerMile(pace) => write!(f, "{}/mi", pace)?,
            PaceTarget::SeeCalc => f.write_str("See Calc")?,
            PaceTarget::RacePace => f.write_str("Race Pace")?,
            PaceTarget::NotApplicable => f.write_str("N/A")?,
        }
        if let Some(secs) = self.slowdown_secs {
            write!(f, " (+{}s/mi)", secs)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for PlannedPace {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();

        // Split off a trailing " (+30s/mi)" annotation
        let (base, slowdown_secs) = match s.rsplit_once(" (+") {
            Some((base, tail)) => {
                let secs = tail
                    .strip_suffix("s/mi)")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| crate::Error::Other(format!("Invalid pace slowdown: {:?}", s)))?;
                (base.trim(), Some(secs))
            }
            None => (s, None),
        };

        let target = match base {
            "See Calc" => PaceTarget::SeeCalc,
            "Race Pace" => PaceTarget::RacePace,
            "N/A" | "" => PaceTarget::NotApplicable,
            other => PaceTarget::PerMile(other.parse()?),
        };

        Ok(PlannedPace {
            target,
            slowdown_secs,
        })
    }
}

impl From<PlannedPace> for String {
    fn from(pace: PlannedPace) -> Self {
        pace.to_string()
    }
}

impl TryFrom<String> for PlannedPace {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

// ============================================================================
// Workout Record
// ============================================================================

/// Generator-produced plan values, captured before the first alteration
#[derive(Clone, Debug, PartialEq)]
pub struct PlanSnapshot {
    pub title: String,
    pub miles: f64,
    pub pace: PlannedPace,
    pub kind: WorkoutType,
    pub description: String,
}

/// One planned day of training and its logged result
///
/// Persisted flat: the snapshot is stored as the `originalTitle`,
/// `originalMiles`, `originalPace`, `originalType` and `originalDesc` fields,
/// present only once the record has been snapshotted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "RecordDoc", into = "RecordDoc")]
pub struct WorkoutRecord {
    pub id: u32,
    pub date: NaiveDate,
    pub kind: WorkoutType,
    pub title: String,
    pub planned_miles: f64,
    pub planned_pace: PlannedPace,
    pub description: String,

    pub actual_miles: Option<f64>,
    pub actual_pace: Option<Pace>,
    pub actual_elev: Option<f64>,
    pub actual_gap: Option<Pace>,
    pub notes: Option<String>,

    pub original: Option<PlanSnapshot>,
    pub is_altered: bool,
}

/// Persisted document shape of a `WorkoutRecord`
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordDoc {
    id: u32,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: WorkoutType,
    title: String,
    planned_miles: f64,
    planned_pace: PlannedPace,
    description: String,

    #[serde(default, deserialize_with = "lenient::opt_number")]
    actual_miles: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_pace")]
    actual_pace: Option<Pace>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    actual_elev: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_pace")]
    actual_gap: Option<Pace>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    original_miles: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_planned_pace",
        skip_serializing_if = "Option::is_none"
    )]
    original_pace: Option<PlannedPace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_type: Option<WorkoutType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_desc: Option<String>,

    #[serde(default)]
    is_altered: bool,
}

impl From<RecordDoc> for WorkoutRecord {
    fn from(doc: RecordDoc) -> Self {
        // `originalTitle` marks a snapshot; fields missing beside it fall
        // back to the live values
        let original = doc.original_title.map(|title| PlanSnapshot {
            title,
            miles: doc.original_miles.unwrap_or(doc.planned_miles),
            pace: doc.original_pace.unwrap_or(doc.planned_pace),
            kind: doc.original_type.unwrap_or(doc.kind),
            description: doc
                .original_desc
                .unwrap_or_else(|| doc.description.clone()),
        });

        WorkoutRecord {
            id: doc.id,
            date: doc.date,
            kind: doc.kind,
            title: doc.title,
            planned_miles: doc.planned_miles,
            planned_pace: doc.planned_pace,
            description: doc.description,
            actual_miles: doc.actual_miles,
            actual_pace: doc.actual_pace,
            actual_elev: doc.actual_elev,
            actual_gap: doc.actual_gap,
            notes: doc.notes,
            is_altered: doc.is_altered && original.is_some(),
            original,
        }
    }
}

impl From<WorkoutRecord> for RecordDoc {
    fn from(record: WorkoutRecord) -> Self {
        let (original_title, original_miles, original_pace, original_type, original_desc) =
            match record.original {
                Some(s) => (
                    Some(s.title),
                    Some(s.miles),
                    Some(s.pace),
                    Some(s.kind),
                    Some(s.description),
                ),
                None => (None, None, None, None, None),
            };

        RecordDoc {
            id: record.id,
            date: record.date,
            kind: record.kind,
            title: record.title,
            planned_miles: record.planned_miles,
            planned_pace: record.planned_pace,
            description: record.description,
            actual_miles: record.actual_miles,
            actual_pace: record.actual_pace,
            actual_elev: record.actual_elev,
            actual_gap: record.actual_gap,
            notes: record.notes,
            original_title,
            original_miles,
            original_pace,
            original_type,
            original_desc,
            is_altered: record.is_altered,
        }
    }
}

impl WorkoutRecord {
    /// Race days carry the reserved marker in their title
    pub fn is_race_day(&self) -> bool {
        self.title.contains(RACE_MARKER)
    }

    /// A run counts as logged once miles have been recorded
    pub fn is_logged(&self) -> bool {
        self.actual_miles.is_some()
    }

    /// Current live plan values
    pub fn plan(&self) -> PlanSnapshot {
        PlanSnapshot {
            title: self.title.clone(),
            miles: self.planned_miles,
            pace: self.planned_pace,
            kind: self.kind,
            description: self.description.clone(),
        }
    }

    /// Capture the snapshot if none exists yet; the first capture is kept forever
    pub fn ensure_snapshot(&mut self) -> &PlanSnapshot {
        let current = self.plan();
        self.original.get_or_insert(current)
    }

    /// Restore live values from the snapshot and clear the altered flag
    ///
    /// Returns `false` when the record has never been snapshotted.
    pub fn revert(&mut self) -> bool {
        let Some(original) = self.original.clone() else {
            return false;
        };
        self.title = original.title;
        self.planned_miles = original.miles;
        self.planned_pace = original.pace;
        self.kind = original.kind;
        self.description = original.description;
        self.is_altered = false;
        true
    }

    /// Set all logged fields together
    pub fn apply_result(&mut self, result: LoggedResult) {
        self.actual_miles = result.miles;
        self.actual_pace = result.pace;
        self.actual_elev = result.elev_ft;
        self.actual_gap = result.gap;
        self.notes = result.notes;
    }
}

// ============================================================================
// Logged Results
// ============================================================================

/// A completed run, entered by hand or imported
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoggedResult {
    pub miles: Option<f64>,
    pub pace: Option<Pace>,
    pub elev_ft: Option<f64>,
    pub gap: Option<Pace>,
    pub notes: Option<String>,
}

impl LoggedResult {
    /// Build a result from free-text form entries
    ///
    /// Unparseable numbers become absent. When no GAP is given it is
    /// computed from miles, pace and elevation if possible.
    pub fn from_form(miles: &str, pace: &str, elev_ft: &str, gap: &str, notes: &str) -> Self {
        LoggedResult {
            miles: parse_number(miles),
            pace: Pace::parse(pace),
            elev_ft: parse_number(elev_ft),
            gap: Pace::parse(gap).or_else(|| grade_adjusted_pace_str(miles, pace, elev_ft)),
            notes: Some(notes.trim().to_string()).filter(|n| !n.is_empty()),
        }
    }
}

/// Deserializers that accept the loose shapes produced by form entry:
/// `null`, `""`, numbers, and numeric strings
mod lenient {
    use super::PlannedPace;
    use crate::pace::{parse_number, Pace};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(NumberOrText::Number(n)) if n.is_finite() => Some(n),
            Some(NumberOrText::Text(s)) => parse_number(&s),
            _ => None,
        })
    }

    pub fn opt_pace<'de, D>(deserializer: D) -> Result<Option<Pace>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| Pace::parse(&s)))
    }

    pub fn opt_planned_pace<'de, D>(deserializer: D) -> Result<Option<PlannedPace>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.parse().ok()))
    }

    pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
    }
}
