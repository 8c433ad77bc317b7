//! Forecast model and "best start time" search.
//!
//! The forecast is decoded from an Open-Meteo `/v1/forecast` payload
//! (Celsius temperatures, local-time ISO timestamps). Fetching is left to
//! the caller; this module is pure.

use crate::calendar::parse_iso_date;
use crate::types::{WorkoutRecord, WorkoutType};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Hours searched for a start time, inclusive
pub const START_HOURS: std::ops::RangeInclusive<u32> = 6..=18;
/// Ideal running temperature for scoring
const IDEAL_TEMP_F: i32 = 50;

/// Daily condition summary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Sunny,
    Cloudy,
    Rain,
}

impl Condition {
    pub fn icon(self) -> &'static str {
        match self {
            Condition::Sunny => "☀️",
            Condition::Cloudy => "☁️",
            Condition::Rain => "🌧️",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyWeather {
    pub temp_f: i32,
    pub condition: Condition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourlyWeather {
    pub hour: u32,
    pub temp_f: i32,
    pub precip_probability: u32,
}

/// Forward-looking forecast keyed by local date
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Forecast {
    pub daily: BTreeMap<NaiveDate, DailyWeather>,
    pub hourly: BTreeMap<NaiveDate, Vec<HourlyWeather>>,
}

/// Recommended start for a planned workout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BestStart {
    pub hour: u32,
    pub temp_f: i32,
    pub precip_probability: u32,
    pub est_duration_mins: u32,
}

impl BestStart {
    /// 12-hour clock label, e.g. `7:00 AM`
    pub fn start_label(&self) -> String {
        let suffix = if self.hour >= 12 { "PM" } else { "AM" };
        let display = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:00 {}", display, suffix)
    }
}

impl fmt::Display for BestStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Est. duration {} mins, start {}, {}°F, {}% rain chance",
            self.est_duration_mins,
            self.start_label(),
            self.temp_f,
            self.precip_probability
        )
    }
}

fn celsius_to_f(c: f64) -> i32 {
    (c * 9.0 / 5.0 + 32.0).round() as i32
}

/// Estimated workout length in minutes
pub fn estimated_duration_mins(record: &WorkoutRecord) -> u32 {
    if record.planned_miles > 0.0 {
        (record.planned_miles * 8.5).round() as u32
    } else if record.kind == WorkoutType::CrossTrain {
        60
    } else {
        45
    }
}

/// Lowest-scoring hour between 6:00 and 18:00 for the record's date
///
/// Score is `precip * 2 + |temp - 50|`; the earliest hour wins ties.
/// Returns `None` when the forecast does not cover the date, which is
/// expected for dates beyond the forecast horizon.
pub fn best_start_time(forecast: &Forecast, record: &WorkoutRecord) -> Option<BestStart> {
    let hours = forecast.hourly.get(&record.date)?;

    let mut best: Option<(i64, &HourlyWeather)> = None;
    for hour in hours.iter().filter(|h| START_HOURS.contains(&h.hour)) {
        let score = i64::from(hour.precip_probability) * 2
            + i64::from((hour.temp_f - IDEAL_TEMP_F).abs());
        if best.map_or(true, |(best_score, _)| score < best_score) {
            best = Some((score, hour));
        }
    }

    best.map(|(_, hour)| BestStart {
        hour: hour.hour,
        temp_f: hour.temp_f,
        precip_probability: hour.precip_probability,
        est_duration_mins: estimated_duration_mins(record),
    })
}

// ============================================================================
// Open-Meteo payload
// ============================================================================

/// Subset of the Open-Meteo forecast response
#[derive(Debug, Deserialize)]
pub struct OpenMeteoResponse {
    pub daily: OpenMeteoDaily,
    pub hourly: OpenMeteoHourly,
}

#[derive(Debug, Deserialize)]
pub struct OpenMeteoDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub weathercode: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct OpenMeteoHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
}

impl From<OpenMeteoResponse> for Forecast {
    fn from(resp: OpenMeteoResponse) -> Self {
        let mut forecast = Forecast::default();

        for (i, time) in resp.daily.time.iter().enumerate() {
            let Some(date) = parse_iso_date(time) else {
                continue;
            };
            let Some(Some(max_c)) = resp.daily.temperature_2m_max.get(i) else {
                continue;
            };
            let precip = resp
                .daily
                .precipitation_probability_max
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(0.0);
            let code = resp.daily.weathercode.get(i).copied().flatten().unwrap_or(0.0);

            let condition = if precip > 50.0 {
                Condition::Rain
            } else if code >= 3.0 {
                Condition::Cloudy
            } else {
                Condition::Sunny
            };

            forecast.daily.insert(
                date,
                DailyWeather {
                    temp_f: celsius_to_f(*max_c),
                    condition,
                },
            );
        }

        for (i, time) in resp.hourly.time.iter().enumerate() {
            let Some((date_part, hour_part)) = time.split_once('T') else {
                continue;
            };
            let (Some(date), Some(hour)) = (
                parse_iso_date(date_part),
                hour_part.split(':').next().and_then(|h| h.parse::<u32>().ok()),
            ) else {
                continue;
            };
            let Some(Some(temp_c)) = resp.hourly.temperature_2m.get(i) else {
                continue;
            };
            let precip = resp
                .hourly
                .precipitation_probability
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(0.0);

            forecast.hourly.entry(date).or_default().push(HourlyWeather {
                hour,
                temp_f: celsius_to_f(*temp_c),
                precip_probability: precip.round().max(0.0) as u32,
            });
        }

        tracing::debug!(
            "Decoded forecast: {} days, {} days with hourly data",
            forecast.daily.len(),
            forecast.hourly.len()
        );
        forecast
    }
}

/// Decode an Open-Meteo JSON body
pub fn parse_open_meteo(body: &str) -> crate::Result<Forecast> {
    let resp: OpenMeteoResponse = serde_json::from_str(body)?;
    Ok(resp.into())
}
