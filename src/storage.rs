// Record storage - single named key holding the JSON array of records

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::types::{Record, RecordSet};

/// Key the record array is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "dnsRecords";

/// Persistence seam used by the session
pub trait RecordStore {
    /// Read back every stored record. Missing or corrupt data reads as empty.
    fn load_all(&self) -> RecordSet;

    /// Append one record to the stored sequence
    fn append(&mut self, record: &Record) -> Result<(), StoreError>;

    /// Append a batch in order with a single write
    fn append_all(&mut self, records: &[Record]) -> Result<(), StoreError> {
        for record in records {
            self.append(record)?;
        }
        Ok(())
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn load_all(&self) -> RecordSet {
        (**self).load_all()
    }

    fn append(&mut self, record: &Record) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn append_all(&mut self, records: &[Record]) -> Result<(), StoreError> {
        (**self).append_all(records)
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Local key-value store: one `<key>.json` file per key inside `data_dir`
pub struct JsonFileStore {
    data_dir: PathBuf,
    key: String,
}

impl JsonFileStore {
    /// Create new store for `key` under `data_dir`
    pub fn new(data_dir: &Path, key: &str) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            key: key.to_string(),
        }
    }

    /// Get the file backing the key
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.key))
    }

    /// Where an unreadable value is moved before the key is written again
    pub fn corrupt_path(&self) -> PathBuf {
        let first = self.data_dir.join(format!("{}.json.corrupt", self.key));
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| self.data_dir.join(format!("{}.json.corrupt.{}", self.key, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    /// Read the stored value ahead of a write.
    ///
    /// Unlike `load_all`, an unreadable value is never silently replaced: it
    /// is moved to `corrupt_path()` first, and a read failure is an error.
    fn load_for_write(&self) -> Result<RecordSet, StoreError> {
        let path = self.path();

        if !path.exists() {
            return Ok(RecordSet::new());
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StoreError::Unavailable(format!("Failed to read {}: {}", path.display(), e)))?;

        match serde_json::from_str(&json) {
            Ok(records) => Ok(records),
            Err(e) => {
                let aside = self.corrupt_path();
                fs::rename(&path, &aside).map_err(|err| {
                    StoreError::Unavailable(format!(
                        "Failed to move unreadable {} aside: {}",
                        path.display(),
                        err
                    ))
                })?;
                warn!(
                    "Stored records at {} are unreadable ({}), kept as {}",
                    path.display(),
                    e,
                    aside.display()
                );
                Ok(RecordSet::new())
            }
        }
    }

    /// Replace the stored value with `records`
    pub fn save_all(&self, records: &RecordSet) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::Unavailable(format!("Failed to create data directory: {}", e)))?;

        let json = serde_json::to_string(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let path = self.path();

        // On Unix, set file permissions to 600
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)
                .map_err(|e| StoreError::Unavailable(format!("Failed to open {}: {}", path.display(), e)))?;

            file.write_all(json.as_bytes())
                .map_err(|e| StoreError::Unavailable(format!("Failed to write {}: {}", path.display(), e)))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, json)
                .map_err(|e| StoreError::Unavailable(format!("Failed to write {}: {}", path.display(), e)))?;
        }

        debug!("Saved {} records to {}", records.len(), path.display());
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn load_all(&self) -> RecordSet {
        let path = self.path();

        if !path.exists() {
            return RecordSet::new();
        }

        match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Stored records at {} are unreadable, starting empty: {}", path.display(), e);
                RecordSet::new()
            }),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                RecordSet::new()
            }
        }
    }

    fn append(&mut self, record: &Record) -> Result<(), StoreError> {
        let mut records = self.load_for_write()?;
        records.push(record.clone());
        self.save_all(&records)
    }

    fn append_all(&mut self, records: &[Record]) -> Result<(), StoreError> {
        let mut stored = self.load_for_write()?;
        stored.extend(records.iter().cloned());
        self.save_all(&stored)
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Non-persistent store for `--ephemeral` sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RecordSet,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&self) -> RecordSet {
        self.records.clone()
    }

    fn append(&mut self, record: &Record) -> Result<(), StoreError> {
        self.records.push(record.clone());
        Ok(())
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Unable to serialize records: {0}")]
    Serialization(String),
}
