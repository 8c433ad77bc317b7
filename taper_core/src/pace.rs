//! Per-mile pace values, grade-adjusted pace and the training-pace calculator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds of credit per 100 ft of climbing per mile
const GAP_SECONDS_PER_100FT_PER_MILE: f64 = 15.0;

/// A per-mile pace, stored as whole seconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pace(u32);

impl Pace {
    pub fn from_seconds(seconds: u32) -> Self {
        Pace(seconds)
    }

    /// Saturates at `u32::MAX` seconds
    pub fn from_min_sec(minutes: u32, seconds: u32) -> Self {
        Pace(minutes.saturating_mul(60).saturating_add(seconds))
    }

    /// `None` when the total does not fit in `u32` seconds
    pub fn checked_from_min_sec(minutes: u32, seconds: u32) -> Option<Self> {
        minutes.checked_mul(60)?.checked_add(seconds).map(Pace)
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Parse `M:SS` or `MM:SS`, optionally followed by `/mi`
    ///
    /// Returns `None` for anything else, including seconds of 60 or more.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_suffix("/mi").unwrap_or(trimmed).trim_end();
        let (minutes, seconds) = trimmed.split_once(':')?;
        let minutes: u32 = minutes.trim().parse().ok()?;
        let seconds = seconds.trim();
        if seconds.len() != 2 {
            return None;
        }
        let seconds: u32 = seconds.parse().ok()?;
        if seconds >= 60 {
            return None;
        }
        Pace::checked_from_min_sec(minutes, seconds)
    }

    /// Build a pace from fractional seconds, flooring to whole seconds
    fn from_fractional(seconds: f64) -> Self {
        Pace(seconds.max(0.0).floor() as u32)
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for Pace {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Pace::parse(s).ok_or_else(|| crate::Error::Other(format!("Invalid pace: {:?}", s)))
    }
}

impl From<Pace> for String {
    fn from(pace: Pace) -> Self {
        pace.to_string()
    }
}

impl TryFrom<String> for Pace {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

/// Parse a free-text number; anything unparseable, negative or non-finite is `None`
pub fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Grade-adjusted pace for a run
///
/// Climbing earns 15 seconds per mile for every 100 ft of gain per mile.
/// If the credit would take the pace to zero or below, the raw pace is
/// returned unchanged. Undefined unless `miles > 0` and `elev_ft > 0`.
pub fn grade_adjusted_pace(miles: f64, pace: Pace, elev_ft: f64) -> Option<Pace> {
    if miles.is_nan() || miles <= 0.0 || elev_ft.is_nan() || elev_ft <= 0.0 || pace.seconds() == 0 {
        return None;
    }

    let raw = f64::from(pace.seconds());
    let elev_per_mile = elev_ft / miles;
    let credit = (elev_per_mile / 100.0) * GAP_SECONDS_PER_100FT_PER_MILE;

    let adjusted = raw - credit;
    let gap = if adjusted > 0.0 { adjusted } else { raw };

    Some(Pace::from_fractional(gap))
}

/// [`grade_adjusted_pace`] over free-text form entries
pub fn grade_adjusted_pace_str(miles: &str, pace: &str, elev_ft: &str) -> Option<Pace> {
    grade_adjusted_pace(parse_number(miles)?, Pace::parse(pace)?, parse_number(elev_ft)?)
}

// ============================================================================
// Training-pace calculator
// ============================================================================

/// Recent race distance used to estimate training paces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceDistance {
    Mile,
    FiveK,
    TenK,
    TenMile,
    Half,
    Marathon,
}

impl RaceDistance {
    /// Convert a finishing time at this distance into an equivalent 10K time
    fn equivalent_10k_seconds(self, race_seconds: f64) -> f64 {
        match self {
            RaceDistance::Mile => race_seconds * 6.5,
            RaceDistance::FiveK => race_seconds * 2.08,
            RaceDistance::TenK => race_seconds,
            RaceDistance::TenMile => race_seconds / 1.65,
            RaceDistance::Half => race_seconds / 2.2,
            RaceDistance::Marathon => race_seconds / 4.6,
        }
    }
}

impl FromStr for RaceDistance {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mile" | "1" => Ok(RaceDistance::Mile),
            "5k" | "3.1" => Ok(RaceDistance::FiveK),
            "10k" | "6.2" => Ok(RaceDistance::TenK),
            "10mi" | "10" => Ok(RaceDistance::TenMile),
            "half" | "13.1" => Ok(RaceDistance::Half),
            "marathon" | "26.2" => Ok(RaceDistance::Marathon),
            other => Err(crate::Error::Other(format!(
                "Unknown race distance: {} (expected mile, 5k, 10k, 10mi, half, marathon)",
                other
            ))),
        }
    }
}

/// Fast and slow ends of a pace band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaceRange {
    pub fast: Pace,
    pub slow: Pace,
}

impl fmt::Display for PaceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} /mi", self.fast, self.slow)
    }
}

/// Training paces derived from a recent race
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainingPaces {
    pub long: PaceRange,
    pub tempo: PaceRange,
    pub speed: PaceRange,
}

/// Parse a finishing time as `H:MM:SS` or `M:SS` into seconds
pub fn parse_race_time(input: &str) -> Option<u32> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    let numbers: Vec<u32> = parts
        .iter()
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<_>>()?;

    let total = match *numbers.as_slice() {
        [m, s] if s < 60 => m.checked_mul(60)?.checked_add(s)?,
        [h, m, s] if m < 60 && s < 60 => h.checked_mul(3600)?.checked_add(m * 60 + s)?,
        _ => return None,
    };
    (total > 0).then_some(total)
}

/// Estimate long, tempo and speed paces from a race result
pub fn training_paces(distance: RaceDistance, race_seconds: u32) -> TrainingPaces {
    let ten_k = distance.equivalent_10k_seconds(f64::from(race_seconds));
    let per_mile = ten_k / 6.21;

    let band = |fast_offset: f64, slow_offset: f64| PaceRange {
        fast: Pace::from_fractional(per_mile + fast_offset),
        slow: Pace::from_fractional(per_mile + slow_offset),
    };

    TrainingPaces {
        long: band(60.0, 75.0),
        tempo: band(0.0, 35.0),
        speed: band(-60.0, -35.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_parse_and_display() {
        assert_eq!(Pace::parse("8:00"), Some(Pace::from_seconds(480)));
        assert_eq!(Pace::parse(" 7:45/mi "), Some(Pace::from_seconds(465)));
        assert_eq!(Pace::parse("10:05").unwrap().to_string(), "10:05");
        assert_eq!(Pace::from_seconds(427).to_string(), "7:07");
    }

    #[test]
    fn test_pace_parse_rejects_malformed() {
        assert_eq!(Pace::parse(""), None);
        assert_eq!(Pace::parse("8"), None);
        assert_eq!(Pace::parse("8:5"), None);
        assert_eq!(Pace::parse("8:75"), None);
        assert_eq!(Pace::parse("fast"), None);
    }

    #[test]
    fn test_gap_climbing_credit() {
        // 200 ft over 10 miles = 20 ft/mi = 3 s credit
        let gap = grade_adjusted_pace(10.0, Pace::parse("8:00").unwrap(), 200.0).unwrap();
        assert_eq!(gap.seconds(), 477);
        assert_eq!(gap.to_string(), "7:57");
    }

    #[test]
    fn test_gap_floors_fractional_seconds() {
        // 150 ft over 4 miles = 37.5 ft/mi = 5.625 s credit -> 474.375 -> 7:54
        let gap = grade_adjusted_pace(4.0, Pace::from_seconds(480), 150.0).unwrap();
        assert_eq!(gap.to_string(), "7:54");
    }

    #[test]
    fn test_gap_undefined_without_climb_or_distance() {
        let pace = Pace::from_seconds(480);
        assert_eq!(grade_adjusted_pace(10.0, pace, 0.0), None);
        assert_eq!(grade_adjusted_pace(0.0, pace, 200.0), None);
        assert_eq!(grade_adjusted_pace(f64::NAN, pace, 200.0), None);
    }

    #[test]
    fn test_gap_falls_back_to_raw_when_credit_exceeds_pace() {
        // 10,000 ft in one mile = 1500 s credit on a 480 s pace
        let gap = grade_adjusted_pace(1.0, Pace::from_seconds(480), 10_000.0).unwrap();
        assert_eq!(gap.seconds(), 480);
    }

    #[test]
    fn test_gap_from_form_text() {
        assert_eq!(
            grade_adjusted_pace_str("10", "8:00", "200").map(|p| p.to_string()),
            Some("7:57".to_string())
        );
        assert_eq!(grade_adjusted_pace_str("10", "", "200"), None);
        assert_eq!(grade_adjusted_pace_str("10", "8:00", ""), None);
        assert_eq!(grade_adjusted_pace_str("ten", "8:00", "200"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 6.5 "), Some(6.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("-3"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_training_paces_from_10k() {
        // 40:00 10K -> 2400 / 6.21 = 386.47 s/mi
        let paces = training_paces(RaceDistance::TenK, 2400);
        assert_eq!(paces.tempo.fast.to_string(), "6:26");
        assert_eq!(paces.tempo.slow.to_string(), "7:01");
        assert_eq!(paces.long.fast.to_string(), "7:26");
        assert_eq!(paces.speed.fast.to_string(), "5:26");
        assert_eq!(paces.speed.to_string(), "5:26 - 5:51 /mi");
    }

    #[test]
    fn test_pace_overflow_is_rejected() {
        assert_eq!(Pace::parse("99999999:00"), None);
        assert_eq!(Pace::checked_from_min_sec(u32::MAX / 60 + 1, 0), None);
        assert_eq!(Pace::from_min_sec(u32::MAX, 59).seconds(), u32::MAX);
        assert_eq!(grade_adjusted_pace_str("5", "99999999:00", "100"), None);
    }

    #[test]
    fn test_parse_race_time() {
        assert_eq!(parse_race_time("42:30"), Some(2550));
        assert_eq!(parse_race_time("1:35:00"), Some(5700));
        assert_eq!(parse_race_time("3:10:59"), Some(11459));
        assert_eq!(parse_race_time("42:75"), None);
        assert_eq!(parse_race_time("0:00"), None);
        assert_eq!(parse_race_time("fast"), None);
        assert_eq!(parse_race_time("9999999:00:00"), None);
        assert_eq!(parse_race_time("99999999:00"), None);
    }

    #[test]
    fn test_race_distance_from_str() {
        assert_eq!("half".parse::<RaceDistance>().unwrap(), RaceDistance::Half);
        assert_eq!("26.2".parse::<RaceDistance>().unwrap(), RaceDistance::Marathon);
        assert!("ultra".parse::<RaceDistance>().is_err());
    }

    #[test]
    fn test_pace_serde_as_string() {
        let json = serde_json::to_string(&Pace::from_seconds(477)).unwrap();
        assert_eq!(json, "\"7:57\"");
        let back: Pace = serde_json::from_str("\"7:57\"").unwrap();
        assert_eq!(back.seconds(), 477);
    }
}
