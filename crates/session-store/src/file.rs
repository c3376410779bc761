use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Duration;
use fd_lock::RwLock;
use serde_json::Value;

use crate::{Clock, Result, SessionStoreError, StoredEntry, SystemClock, store::SessionStore};

/// Session store backed by a single JSON document on disk.
///
/// Several processes may share one document. Every mutation takes an
/// exclusive lock on a sibling `.lock` file, re-reads the document, changes
/// only the target key and writes the result to a temp file that is then
/// renamed over the original. Loads re-read the document, so values written
/// or cleared by another process are seen immediately. The last document
/// read is kept in memory and serves loads when the disk is unavailable.
pub struct FileSessionStore {
    path: PathBuf,
    lock_path: PathBuf,
    entries: Mutex<BTreeMap<String, StoredEntry>>,
    clock: Arc<dyn Clock>,
}

impl FileSessionStore {
    /// Opens the store at `path` using the system clock.
    ///
    /// A missing or unreadable document yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_clock(path, SystemClock)
    }

    /// Opens the store at `path` using the given clock.
    pub fn open_with_clock(path: impl Into<PathBuf>, clock: impl Clock + 'static) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        let clock: Arc<dyn Clock> = Arc::new(clock);

        let mut entries = match read_document(&path) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                BTreeMap::new()
            }
        };
        let now = clock.now();
        entries.retain(|_, entry| !entry.is_expired(now));

        tracing::debug!(path = %path.display(), entries = entries.len(), "session file opened");

        Self {
            path,
            lock_path,
            entries: Mutex::new(entries),
            clock,
        }
    }

    /// Returns the path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces `entries` with the document on disk.
    ///
    /// A missing or unreadable document leaves `entries` as they were.
    fn refresh(&self, entries: &mut BTreeMap<String, StoredEntry>) {
        match read_document(&self.path) {
            Ok(Some(on_disk)) => *entries = on_disk,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
            }
        }
    }

    /// Applies `change` to the current document under the file lock.
    ///
    /// `change` returns false when it left the document untouched, in which
    /// case nothing is written.
    fn mutate(&self, change: impl FnOnce(&mut BTreeMap<String, StoredEntry>) -> bool) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let mut lock = match open_lock_file(&self.lock_path) {
            Ok(file) => Some(RwLock::new(file)),
            Err(e) => {
                tracing::warn!(path = %self.lock_path.display(), error = %e, "session file lock unavailable");
                None
            }
        };
        let _guard = match lock.as_mut().map(RwLock::write) {
            Some(Ok(guard)) => Some(guard),
            Some(Err(e)) => {
                tracing::warn!(path = %self.lock_path.display(), error = %e, "failed to lock session file");
                None
            }
            None => None,
        };

        self.refresh(&mut entries);
        if !change(&mut *entries) {
            return;
        }

        let now = self.clock.now();
        entries.retain(|_, entry| !entry.is_expired(now));

        if let Err(e) = write_document(&self.path, &entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write session file");
        }
    }
}

impl std::fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(&mut entries);

        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    fn save(&self, key: &str, value: Value, ttl: Duration) {
        let entry = StoredEntry::new(value, self.clock.now(), ttl);
        self.mutate(|entries| {
            entries.insert(key.to_string(), entry);
            true
        });
    }

    fn clear(&self, key: &str) {
        self.mutate(|entries| entries.remove(key).is_some());
    }
}

fn open_lock_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
}

/// Reads the document; `None` when it does not exist yet.
fn read_document(path: &Path) -> Result<Option<BTreeMap<String, StoredEntry>>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionStoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn write_document(path: &Path, entries: &BTreeMap<String, StoredEntry>) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(entries)?;
    let tmp = path.with_extension("tmp");
    let io_err = |source: std::io::Error| SessionStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
