//! Durable RSVP log backed by a single pretty-printed JSON file.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!   rsvps.json                    [RsvpRecord, ...] in creation order
//!   rsvps.json.corrupt-<millis>   unreadable content set aside by `append`
//! ```
//!
//! Appends are a full read-modify-write of `rsvps.json`. A mutex serializes
//! all file access within the process, and new contents land through a `.tmp`
//! sibling plus rename so readers never observe a half-written file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rsvp_protocol::RsvpRecord;

const DATA_FILENAME: &str = "rsvps.json";

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// What a read of the data file produced.
enum Contents {
    Records(Vec<RsvpRecord>),
    /// The file exists but does not hold a list of records.
    Unreadable,
}

/// Append-only collection of RSVP records.
pub struct RsvpStore {
    data_dir: PathBuf,
    io_lock: Mutex<()>,
}

impl RsvpStore {
    /// Open a store rooted at `data_dir`. Nothing touches the disk until
    /// the first read or append.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(DATA_FILENAME)
    }

    /// All records in the order they were appended.
    ///
    /// Creates an empty log when none exists. Content that cannot be parsed
    /// reads as an empty list rather than an error.
    pub fn read_all(&self) -> Result<Vec<RsvpRecord>, StoreError> {
        let _guard = self.lock();
        match self.load()? {
            Contents::Records(records) => Ok(records),
            Contents::Unreadable => Ok(Vec::new()),
        }
    }

    /// Add `record` to the end of the log.
    pub fn append(&self, record: &RsvpRecord) -> Result<(), StoreError> {
        let _guard = self.lock();

        let mut records = match self.load()? {
            Contents::Records(records) => records,
            Contents::Unreadable => {
                self.quarantine()?;
                Vec::new()
            }
        };
        records.push(record.clone());

        let json = serde_json::to_string_pretty(&records)?;
        self.atomic_write(&self.data_file(), json.as_bytes())?;
        tracing::debug!(id = %record.id, total = records.len(), "RSVP appended");
        Ok(())
    }

    /// The guarded section only touches the file system, so a poisoned
    /// lock carries no broken in-memory state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.io_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the data directory and an empty `[]` log if either is missing.
    fn ensure_storage(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.data_file();
        if !path.exists() {
            self.atomic_write(&path, b"[]")?;
            tracing::info!("Created empty RSVP log at {}", path.display());
        }
        Ok(())
    }

    fn load(&self) -> Result<Contents, StoreError> {
        self.ensure_storage()?;
        let path = self.data_file();
        let raw = std::fs::read(&path)?;
        // Invalid UTF-8 surfaces as a parse error, not an I/O error.
        match serde_json::from_slice::<Vec<RsvpRecord>>(&raw) {
            Ok(records) => Ok(Contents::Records(records)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable RSVP log {}: {e}", path.display());
                Ok(Contents::Unreadable)
            }
        }
    }

    /// Move an unreadable log aside so the next write does not destroy it.
    fn quarantine(&self) -> Result<(), StoreError> {
        let path = self.data_file();
        let millis = chrono::Utc::now().timestamp_millis();
        let aside = self
            .data_dir
            .join(format!("{DATA_FILENAME}.corrupt-{millis}"));
        std::fs::rename(&path, &aside)?;
        tracing::warn!("Moved unreadable RSVP log to {}", aside.display());
        Ok(())
    }

    /// Write `data` to `path` via a `.tmp` sibling.
    fn atomic_write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
