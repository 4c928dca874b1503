//! Backing store - the transactional, primary-key-indexed storage the facade
//! delegates to.
//!
//! A [`StoreProvider`] opens a [`StoreHandle`] per operation. Handles answer
//! key lookups and predicate queries, and run a closure inside an atomic
//! [`WriteTransaction`]: when the closure returns `Ok` every mutation it made
//! becomes visible at once, when it returns `Err` none of them do.
//!
//! Two backends ship with the crate:
//!
//! - [`InMemoryStore`] - shared `HashMap`-style storage for tests and
//!   embedded use, with an availability switch.
//! - [`FileStore`] - one JSON snapshot file, rewritten on every commit.
//!
//! [`AnyStore`] picks one of them at runtime from configuration.

mod any;
mod file;
mod in_memory;
mod records;

use crate::entity::Entity;
use crate::error::Result;
use crate::policy::UpdatePolicy;

pub use any::{AnyHandle, AnyStore};
pub use file::{FileHandle, FileStore};
pub use in_memory::{InMemoryHandle, InMemoryStore};
pub use records::{Records, Transaction};

/// Opens handles to a backing store.
pub trait StoreProvider: Send + Sync {
    type Handle: StoreHandle;

    /// Open a handle for one operation. Fails with `StoreUnavailable` when
    /// the store cannot be reached.
    fn open(&self) -> Result<Self::Handle>;
}

/// An open session on a backing store, valid for one facade operation.
pub trait StoreHandle {
    type Txn: WriteTransaction;

    /// Get the stored record with this primary key. Returns None if absent.
    fn lookup<E: Entity>(&self, key: &E::Key) -> Result<Option<E>>;

    /// All records of `E` matching the predicate (all of them when `None`).
    fn query<E: Entity>(&self, predicate: Option<&dyn Fn(&E) -> bool>) -> Result<Vec<E>>;

    /// Run `body` inside one atomic write transaction.
    fn write<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&mut Self::Txn) -> Result<R>;
}

/// Mutations available inside a write transaction.
pub trait WriteTransaction {
    /// Whether a record with this primary key exists, including writes
    /// already staged in this transaction.
    fn contains<E: Entity>(&self, key: &E::Key) -> Result<bool>;

    /// Insert the entity, resolving an occupied key per `policy`.
    fn put<E: Entity>(&mut self, entity: &E, policy: UpdatePolicy) -> Result<()>;

    /// Insert every entity in order, resolving occupied keys per `policy`.
    fn put_all<E: Entity>(&mut self, entities: &[E], policy: UpdatePolicy) -> Result<()> {
        for entity in entities {
            self.put(entity, policy)?;
        }
        Ok(())
    }

    /// Remove the record with this key. Returns true if it existed.
    fn remove<E: Entity>(&mut self, key: &E::Key) -> Result<bool>;

    /// Remove every record of `E`. Returns how many were removed.
    fn remove_collection<E: Entity>(&mut self) -> Result<usize>;

    /// Remove every record of every type.
    fn clear(&mut self) -> Result<()>;
}
