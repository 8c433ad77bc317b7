//! CSV export of weekly mileage.

use crate::aggregate::WeeklyMileage;
use crate::calendar::iso_date;
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, serde::Serialize)]
struct MileageRow {
    week_start: String,
    label: String,
    achieved: f64,
    future: f64,
    total: f64,
}

impl From<&WeeklyMileage> for MileageRow {
    fn from(week: &WeeklyMileage) -> Self {
        MileageRow {
            week_start: iso_date(week.anchor),
            label: week.label.clone(),
            achieved: round2(week.achieved),
            future: round2(week.future),
            total: round2(week.total()),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Write weekly mileage as CSV with a header row
pub fn write_weekly_csv<W: Write>(weeks: &[WeeklyMileage], out: W) -> Result<W> {
    let mut writer = csv::Writer::from_writer(out);
    for week in weeks {
        writer.serialize(MileageRow::from(week))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()).into())
}

/// Export weekly mileage to `path`, replacing any existing file
///
/// Returns the number of weeks written.
pub fn export_weekly_csv(weeks: &[WeeklyMileage], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = write_weekly_csv(weeks, File::create(path)?)?;
    file.sync_all()?;

    tracing::info!("Exported {} weeks to {:?}", weeks.len(), path);
    Ok(weeks.len())
}
