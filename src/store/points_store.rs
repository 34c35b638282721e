use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{info, warn};

/// Persisted tally: a one-element array holding `{ "<House>": points }`.
pub type PointsRecord = Vec<BTreeMap<String, i64>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access points file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("points file {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait PointsStore: Send {
    /// `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<PointsRecord>, StoreError>;

    fn save(&self, record: &PointsRecord) -> Result<(), StoreError>;
}

/* =========================
   JSON file
   ========================= */

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PointsStore for JsonFileStore {
    fn load(&self) -> Result<Option<PointsRecord>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, record: &PointsRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(record).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;

        // write-then-rename so a crash never leaves a half written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), "points saved");
        Ok(())
    }
}

/* =========================
   In memory
   ========================= */

#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<PointsRecord>>,
}

impl MemoryStore {
    pub fn with_record(record: PointsRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl PointsStore for MemoryStore {
    fn load(&self) -> Result<Option<PointsRecord>, StoreError> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, record: &PointsRecord) -> Result<(), StoreError> {
        *self
            .record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(record.clone());
        Ok(())
    }
}

/* =========================
   Disabled
   ========================= */

/// Used when no points file is configured, or for dry runs.
pub struct NullStore;

impl PointsStore for NullStore {
    fn load(&self) -> Result<Option<PointsRecord>, StoreError> {
        Ok(None)
    }

    fn save(&self, _record: &PointsRecord) -> Result<(), StoreError> {
        warn!("no points file configured - not updating");
        Ok(())
    }
}
