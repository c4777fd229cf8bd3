//! Durable key-value storage for the serialized board.
//!
//! The board is persisted as one JSON blob under one key. [`FileStore`] maps
//! the key to `<dir>/<key>.json` and replaces it atomically (temp file +
//! rename) under an advisory lock; [`MemoryStore`] keeps blobs in memory for
//! tests and embedding.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::error::ErrorCode;
use crate::lock::{LockError, StateReadLock, StateWriteLock};
use crate::model::ScoreboardState;

/// Storage key used when none is configured.
pub const DEFAULT_STATE_KEY: &str = "scoreboardState";

const LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Failure to read or write the persisted blob.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("failed to serialize scoreboard state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StateFileReadFailed,
            Self::Write { .. } => ErrorCode::StateFileWriteFailed,
            Self::Lock(err) => err.code(),
            Self::Serialize(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Load/save of one serialized blob by key.
pub trait StateStore {
    /// The key this store reads and writes.
    fn key(&self) -> &str;

    /// Return the stored blob, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the blob cannot be written.
    fn save(&mut self, blob: &str) -> Result<(), StoreError>;
}

/// Serialize the board and replace the stored blob.
///
/// # Errors
///
/// Returns [`StoreError`] when serialization or the write fails.
pub fn save_state<S: StateStore + ?Sized>(
    store: &mut S,
    state: &ScoreboardState,
) -> Result<(), StoreError> {
    let blob = serde_json::to_string(state)?;
    store.save(&blob)
}

/// A store backed by one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    key: String,
    lock_timeout: Duration,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
            lock_timeout: LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the JSON blob for this store's key.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lock", self.key))
    }
}

impl StateStore for FileStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<String>, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let _lock = StateReadLock::acquire(&self.lock_path(), self.lock_timeout)?;
        let blob = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = blob.len(), "loaded state blob");
        Ok(Some(blob))
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        let path = self.path();
        let write_err = |source: io::Error| StoreError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let _lock = StateWriteLock::acquire(&self.lock_path(), self.lock_timeout)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(blob.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&path).map_err(|err| write_err(err.error))?;
        debug!(path = %path.display(), bytes = blob.len(), "saved state blob");
        Ok(())
    }
}

/// In-memory store. Clones share the same slots, so a test can keep a handle
/// and inspect what a session saved.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key: String,
    slots: Rc<RefCell<BTreeMap<String, String>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_KEY)
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            slots: Rc::default(),
        }
    }

    /// Store pre-seeded with `blob` under the default key.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .slots
            .borrow_mut()
            .insert(store.key.clone(), blob.into());
        store
    }

    /// Current blob for this store's key.
    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.slots.borrow().get(&self.key).cloned()
    }
}

impl StateStore for MemoryStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.blob())
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        self.slots
            .borrow_mut()
            .insert(self.key.clone(), blob.to_string());
        Ok(())
    }
}
