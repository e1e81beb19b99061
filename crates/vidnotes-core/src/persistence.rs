//! Durable snapshots of store state.
//!
//! Each store persists its whole `user id -> data` map under a fixed store
//! name. Snapshots are wrapped in a versioned envelope; on load, a missing,
//! unreadable, malformed or differently-versioned snapshot yields the empty
//! map instead of an error.
//!
//! Write failures never surface to callers: the first failure is logged and
//! the writer degrades to in-memory operation for the rest of the session.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PersistMode;

/// Increment whenever the persisted layout of a store changes in a way old
/// snapshots cannot be read with. Mismatched snapshots are discarded.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value backend holding one serialized snapshot per store name.
pub trait SnapshotStorage: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<String>, PersistenceError>;
    fn save(&self, name: &str, contents: &str) -> Result<(), PersistenceError>;
}

/// Stores each snapshot as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    dir: PathBuf,
}

impl FileSnapshotStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl SnapshotStorage for FileSnapshotStorage {
    fn load(&self, name: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(name);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    /// Write-to-temp-then-rename so an interrupted write never leaves a
    /// truncated snapshot behind.
    fn save(&self, name: &str, contents: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(name);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, contents).map_err(|source| PersistenceError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// In-process storage for tests and sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.entries.lock().get(name).cloned()
    }

    pub fn insert(&self, name: &str, contents: &str) {
        self.entries
            .lock()
            .insert(name.to_string(), contents.to_string());
    }
}

impl SnapshotStorage for MemorySnapshotStorage {
    fn load(&self, name: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.get(name))
    }

    fn save(&self, name: &str, contents: &str) -> Result<(), PersistenceError> {
        self.insert(name, contents);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotEnvelope<T> {
    version: u32,
    saved_at: DateTime<Utc>,
    state: T,
}

/// Load the snapshot stored under `name`, falling back to `T::default()`.
pub fn load_snapshot<T>(storage: &dyn SnapshotStorage, name: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match storage.load(name) {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            tracing::debug!(store = name, "no snapshot found, starting empty");
            return T::default();
        }
        Err(e) => {
            tracing::warn!(store = name, error = %e, "failed to read snapshot, starting empty");
            return T::default();
        }
    };

    let envelope: SnapshotEnvelope<T> = match serde_json::from_str(&contents) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(store = name, error = %e, "malformed snapshot, starting empty");
            return T::default();
        }
    };

    if envelope.version != SNAPSHOT_VERSION {
        tracing::info!(
            store = name,
            cached = envelope.version,
            current = SNAPSHOT_VERSION,
            "snapshot version mismatch, discarding"
        );
        return T::default();
    }

    tracing::debug!(store = name, saved_at = %envelope.saved_at, "rehydrated snapshot");
    envelope.state
}

fn encode_snapshot<T: Serialize>(state: &T) -> Result<String, PersistenceError> {
    let envelope = SnapshotEnvelope {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Writes one store's snapshot and tracks dirty/degraded state.
pub struct SnapshotWriter {
    storage: Arc<dyn SnapshotStorage>,
    name: &'static str,
    mode: PersistMode,
    dirty: bool,
    degraded: bool,
}

impl SnapshotWriter {
    pub fn new(storage: Arc<dyn SnapshotStorage>, name: &'static str, mode: PersistMode) -> Self {
        Self {
            storage,
            name,
            mode,
            dirty: false,
            degraded: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True once a write failed; no further writes are attempted.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that `state` changed. Writes now or defers, depending on mode.
    pub fn record<T: Serialize>(&mut self, state: &T) {
        self.dirty = true;
        if self.mode == PersistMode::Immediate {
            self.flush(state);
        }
    }

    /// Write `state` if there are unsaved changes.
    pub fn flush<T: Serialize>(&mut self, state: &T) {
        if !self.dirty {
            return;
        }
        if self.degraded {
            self.dirty = false;
            return;
        }

        let result =
            encode_snapshot(state).and_then(|contents| self.storage.save(self.name, &contents));
        match result {
            Ok(()) => {
                tracing::trace!(store = self.name, "snapshot written");
            }
            Err(e) => {
                tracing::warn!(
                    store = self.name,
                    error = %e,
                    "snapshot write failed, continuing in memory only for this session"
                );
                self.degraded = true;
            }
        }
        self.dirty = false;
    }
}
