use super::{
    FileHandle, FileStore, InMemoryHandle, InMemoryStore, StoreHandle, StoreProvider, Transaction,
};
use crate::entity::Entity;
use crate::error::Result;

/// A backend chosen at runtime, usually from [`StorageConfig`](crate::StorageConfig).
#[derive(Clone)]
pub enum AnyStore {
    Memory(InMemoryStore),
    File(FileStore),
}

impl From<InMemoryStore> for AnyStore {
    fn from(store: InMemoryStore) -> Self {
        AnyStore::Memory(store)
    }
}

impl From<FileStore> for AnyStore {
    fn from(store: FileStore) -> Self {
        AnyStore::File(store)
    }
}

impl StoreProvider for AnyStore {
    type Handle = AnyHandle;

    fn open(&self) -> Result<AnyHandle> {
        match self {
            AnyStore::Memory(store) => store.open().map(AnyHandle::Memory),
            AnyStore::File(store) => store.open().map(AnyHandle::File),
        }
    }
}

pub enum AnyHandle {
    Memory(InMemoryHandle),
    File(FileHandle),
}

impl StoreHandle for AnyHandle {
    type Txn = Transaction;

    fn lookup<E: Entity>(&self, key: &E::Key) -> Result<Option<E>> {
        match self {
            AnyHandle::Memory(handle) => handle.lookup(key),
            AnyHandle::File(handle) => handle.lookup(key),
        }
    }

    fn query<E: Entity>(&self, predicate: Option<&dyn Fn(&E) -> bool>) -> Result<Vec<E>> {
        match self {
            AnyHandle::Memory(handle) => handle.query(predicate),
            AnyHandle::File(handle) => handle.query(predicate),
        }
    }

    fn write<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&mut Transaction) -> Result<R>,
    {
        match self {
            AnyHandle::Memory(handle) => handle.write(body),
            AnyHandle::File(handle) => handle.write(body),
        }
    }
}
