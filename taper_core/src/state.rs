//! Plan persistence with file locking.
//!
//! The store is persisted as one JSON array of workout records. Readers take
//! a shared lock; writers lock a temp file in the same directory and rename
//! it over the original.

use crate::store::WorkoutStore;
use crate::types::WorkoutRecord;
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage boundary for the plan
pub trait PlanRepository {
    /// Previously saved records, or `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Vec<WorkoutRecord>>>;

    /// Replace the saved plan with `records`
    fn save(&self, records: &[WorkoutRecord]) -> Result<()>;
}

/// JSON file repository, one file per plan
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanRepository for JsonFileRepository {
    /// Load with a shared lock
    ///
    /// A file that exists but does not parse is an error. Regenerating over
    /// it would throw away logged results.
    fn load(&self) -> Result<Option<Vec<WorkoutRecord>>> {
        if !self.path.exists() {
            tracing::info!("No plan file at {:?}", self.path);
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        match serde_json::from_str::<Vec<WorkoutRecord>>(&contents) {
            Ok(records) => {
                tracing::debug!("Loaded {} records from {:?}", records.len(), self.path);
                Ok(Some(records))
            }
            Err(e) => {
                tracing::error!("Failed to parse plan file {:?}: {}", self.path, e);
                Err(Error::State(format!(
                    "plan file {} is corrupt: {}",
                    self.path.display(),
                    e
                )))
            }
        }
    }

    /// Save atomically: write a temp file, sync, then rename over the original
    fn save(&self, records: &[WorkoutRecord]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, records)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// Restore the store from `repo`, generating and saving a fresh plan when
/// nothing is stored yet
pub fn load_or_generate<R: PlanRepository + ?Sized>(repo: &R) -> Result<WorkoutStore> {
    match repo.load()? {
        Some(records) => WorkoutStore::from_records(records),
        None => {
            tracing::info!("Generating a fresh plan");
            let store = WorkoutStore::generate();
            repo.save(store.records())?;
            Ok(store)
        }
    }
}
