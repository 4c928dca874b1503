//! FileStore - a backing store kept in a single JSON snapshot file.
//!
//! Every committed write transaction rewrites the whole file:
//!
//! 1. Take the store's writer lock
//! 2. Reload the snapshot from disk and run the transaction on it
//! 3. Write to `<path>.tmp`
//! 4. Rename to `<path>` (atomic on Unix)
//!
//! Clones of a `FileStore` share the writer lock. A missing file is an empty
//! store. Writers in different processes, or separately constructed stores
//! on the same path, are not coordinated.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{Records, StoreHandle, StoreProvider, Transaction};
use crate::entity::Entity;
use crate::error::{Result, StoreError};

/// File-backed store provider.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    writer: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Records> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(StoreError::StoreUnavailable(format!(
                    "directory {} does not exist",
                    parent.display()
                )));
            }
        }

        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::StoreUnavailable(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Records::new()),
            Err(e) => Err(StoreError::StoreUnavailable(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }
}

impl StoreProvider for FileStore {
    type Handle = FileHandle;

    fn open(&self) -> Result<FileHandle> {
        let records = Self::load(&self.path)?;
        Ok(FileHandle {
            path: self.path.clone(),
            writer: Arc::clone(&self.writer),
            snapshot: Mutex::new(records),
        })
    }
}

/// Handle on a [`FileStore`].
///
/// Reads are served from the snapshot loaded at open time, refreshed by
/// every commit made through this handle. Write transactions always start
/// from the file as it is on disk.
pub struct FileHandle {
    path: PathBuf,
    writer: Arc<Mutex<()>>,
    snapshot: Mutex<Records>,
}

impl FileHandle {
    fn persist(&self, records: &Records) -> Result<()> {
        let mut temp_path = OsString::from(self.path.as_os_str());
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        let json = serde_json::to_vec_pretty(records)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), records = records.len(), "snapshot written");
        Ok(())
    }
}

impl StoreHandle for FileHandle {
    type Txn = Transaction;

    fn lookup<E: Entity>(&self, key: &E::Key) -> Result<Option<E>> {
        let records = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        records.get::<E>(key)
    }

    fn query<E: Entity>(&self, predicate: Option<&dyn Fn(&E) -> bool>) -> Result<Vec<E>> {
        let records = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        records.query::<E>(predicate)
    }

    fn write<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&mut Transaction) -> Result<R>,
    {
        let _writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::LockPoisoned("write"))?;

        let mut txn = Transaction::begin(FileStore::load(&self.path)?);
        let output = body(&mut txn)?;
        let committed = txn.into_records();
        self.persist(&committed)?;

        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        *snapshot = committed;

        Ok(output)
    }
}
