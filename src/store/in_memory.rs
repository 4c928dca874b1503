//! InMemoryStore - shared in-process backend for tests and embedded use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::{Records, StoreHandle, StoreProvider, Transaction};
use crate::entity::Entity;
use crate::error::{Result, StoreError};

/// In-memory backing store.
///
/// Clone-friendly via Arc: clones share records and availability.
/// Write transactions hold the write lock for their whole body, so
/// transactions from any handle on the same store run one at a time.
#[derive(Clone)]
pub struct InMemoryStore {
    records: Arc<RwLock<Records>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty, available store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Take the store offline (`false`) or back online (`true`).
    /// While offline every `open` fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Total number of stored records, regardless of availability.
    pub fn len(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl StoreProvider for InMemoryStore {
    type Handle = InMemoryHandle;

    fn open(&self) -> Result<InMemoryHandle> {
        if !self.is_available() {
            return Err(StoreError::StoreUnavailable(
                "in-memory store is offline".into(),
            ));
        }
        Ok(InMemoryHandle {
            records: Arc::clone(&self.records),
        })
    }
}

/// Handle on an [`InMemoryStore`].
pub struct InMemoryHandle {
    records: Arc<RwLock<Records>>,
}

impl StoreHandle for InMemoryHandle {
    type Txn = Transaction;

    fn lookup<E: Entity>(&self, key: &E::Key) -> Result<Option<E>> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        records.get::<E>(key)
    }

    fn query<E: Entity>(&self, predicate: Option<&dyn Fn(&E) -> bool>) -> Result<Vec<E>> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        records.query::<E>(predicate)
    }

    fn write<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&mut Transaction) -> Result<R>,
    {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;

        let mut txn = Transaction::begin(std::mem::take(&mut *records));
        match body(&mut txn) {
            Ok(output) => {
                *records = txn.into_records();
                Ok(output)
            }
            Err(e) => {
                *records = txn.rollback();
                Err(e)
            }
        }
    }
}
