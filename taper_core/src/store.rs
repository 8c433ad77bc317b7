//! In-memory workout store.
//!
//! Owns every record of the plan. Callers address records by id or date and
//! mutate them through the store, never through long-lived references.

use crate::types::{LoggedResult, WorkoutRecord};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// All records of the plan, ordered by date
#[derive(Clone, Debug)]
pub struct WorkoutStore {
    records: Vec<WorkoutRecord>,
    by_id: HashMap<u32, usize>,
    by_date: HashMap<NaiveDate, usize>,
}

impl WorkoutStore {
    /// Fresh store from the plan generator
    pub fn generate() -> Self {
        Self::index(crate::generator::generate())
    }

    /// Store from previously persisted records
    ///
    /// Records are re-sorted by date. Duplicate ids or dates are rejected.
    pub fn from_records(mut records: Vec<WorkoutRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.date);

        let mut ids = HashSet::new();
        for (i, record) in records.iter().enumerate() {
            if !ids.insert(record.id) {
                return Err(Error::State(format!("Duplicate workout id {}", record.id)));
            }
            if i > 0 && records[i - 1].date == record.date {
                return Err(Error::State(format!("Duplicate workout date {}", record.date)));
            }
        }

        tracing::debug!("Restored store with {} records", records.len());
        Ok(Self::index(records))
    }

    fn index(records: Vec<WorkoutRecord>) -> Self {
        let by_id = records.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        let by_date = records.iter().enumerate().map(|(i, r)| (r.date, i)).collect();
        WorkoutStore {
            records,
            by_id,
            by_date,
        }
    }

    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&WorkoutRecord> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }

    pub fn get_by_date(&self, date: NaiveDate) -> Option<&WorkoutRecord> {
        self.by_date.get(&date).map(|&i| &self.records[i])
    }

    /// The next `count` records on or after `today`, in date order
    pub fn upcoming(&self, today: NaiveDate, count: usize) -> impl Iterator<Item = &WorkoutRecord> {
        let start = self.records.partition_point(|r| r.date < today);
        self.records[start..].iter().take(count)
    }

    /// Records falling in a calendar month
    pub fn in_month(&self, year: i32, month: u32) -> impl Iterator<Item = &WorkoutRecord> {
        use chrono::Datelike;
        self.records
            .iter()
            .filter(move |r| r.date.year() == year && r.date.month() == month)
    }

    /// Mutate one record by id; returns `None` if no such record exists
    ///
    /// The closure may not change `id` or `date`; both are restored if it does.
    pub fn update<F, T>(&mut self, id: u32, f: F) -> Option<T>
    where
        F: FnOnce(&mut WorkoutRecord) -> T,
    {
        let &i = self.by_id.get(&id)?;
        let record = &mut self.records[i];
        let (id, date) = (record.id, record.date);
        let out = f(record);
        record.id = id;
        record.date = date;
        Some(out)
    }

    /// Save a hand-entered result; all logged fields are replaced together
    ///
    /// Returns `false` if the id is unknown.
    pub fn save_result(&mut self, id: u32, result: LoggedResult) -> bool {
        let saved = self.update(id, |record| record.apply_result(result)).is_some();
        if saved {
            tracing::info!("Saved result for workout {}", id);
        } else {
            tracing::warn!("No workout with id {}, result not saved", id);
        }
        saved
    }

    /// Apply an imported result to the record on `date`
    ///
    /// Import never overwrites a logged run: returns `false` when there is no
    /// record for the date or it already has logged miles.
    pub fn log_import(&mut self, date: NaiveDate, result: LoggedResult) -> bool {
        let Some(&i) = self.by_date.get(&date) else {
            tracing::debug!("No workout on {}, import skipped", date);
            return false;
        };
        let record = &mut self.records[i];
        if record.is_logged() {
            tracing::debug!("Workout on {} already logged, import skipped", date);
            return false;
        }
        record.apply_result(result);
        true
    }

    /// Clear a logged result
    pub fn clear_result(&mut self, id: u32) -> bool {
        self.update(id, |record| record.apply_result(LoggedResult::default()))
            .is_some()
    }
}
