//! LocalStorage - typed CRUD over a backing store.
//!
//! Every call opens its own handle from the injected [`StoreProvider`] and
//! runs its mutations inside one write transaction, so no call leaves a
//! partial write behind.
//!
//! Reads never fail: a missing record is `None`, and so is an unreachable
//! store. `read_all` distinguishes the two: `Some(vec![])` means nothing
//! matched, `None` means the store could not be read.
//!
//! ## Example
//!
//! ```ignore
//! use local_store::{InMemoryStore, LocalStorage, UpdatePolicy};
//!
//! let storage = LocalStorage::new(InMemoryStore::new());
//! storage.save(&note)?;
//! storage.save_one(&patch, UpdatePolicy::Modify)?;
//!
//! let loaded = storage.read_by_key::<Note>(&1);
//! let drafts = storage.read_all::<Note>(Some(&|n: &Note| n.draft));
//!
//! storage.update_one(&edited)?;   // EntityNotFound unless note 1 exists
//! storage.delete_one(&note)?;
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::collection::EntityCollection;
use crate::config::StorageConfig;
use crate::entity::Entity;
use crate::error::{Result, StoreError};
use crate::policy::UpdatePolicy;
use crate::store::{StoreHandle, StoreProvider, WriteTransaction};

/// Persistence facade over a [`StoreProvider`].
#[derive(Clone)]
pub struct LocalStorage<P> {
    provider: P,
    default_policy: UpdatePolicy,
}

impl<P: StoreProvider> LocalStorage<P> {
    /// Create a facade that saves with [`UpdatePolicy::ReplaceAll`] by default.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_policy: UpdatePolicy::default(),
        }
    }

    pub fn with_config(provider: P, config: &StorageConfig) -> Self {
        Self {
            provider,
            default_policy: config.default_policy,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn default_policy(&self) -> UpdatePolicy {
        self.default_policy
    }

    /// Get a typed accessor for one entity type.
    pub fn collection<E: Entity>(&self) -> EntityCollection<'_, P, E> {
        EntityCollection::new(self)
    }

    fn handle(&self, operation: &'static str) -> Result<P::Handle> {
        self.provider.open().map_err(|e| {
            warn!(operation, error = %e, "could not open store handle");
            e
        })
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Save one entity with the default policy.
    pub fn save<E: Entity>(&self, entity: &E) -> Result<()> {
        self.save_one(entity, self.default_policy)
    }

    /// Save one entity, resolving an occupied key per `policy`.
    pub fn save_one<E: Entity>(&self, entity: &E, policy: UpdatePolicy) -> Result<()> {
        let handle = self.handle("save_one")?;
        handle.write(|txn| txn.put(entity, policy))?;

        debug!(collection = E::COLLECTION, key = ?entity.primary_key(), ?policy, "saved entity");
        Ok(())
    }

    /// Save every entity with the default policy, atomically.
    pub fn save_all<E: Entity>(&self, entities: &[E]) -> Result<()> {
        self.save_many(entities, self.default_policy)
    }

    /// Save every entity in order inside one transaction. If any write
    /// fails (e.g. `DuplicateKey` under [`UpdatePolicy::Error`]) none are kept.
    pub fn save_many<E: Entity>(&self, entities: &[E], policy: UpdatePolicy) -> Result<()> {
        let handle = self.handle("save_many")?;
        handle.write(|txn| txn.put_all(entities, policy))?;

        debug!(collection = E::COLLECTION, count = entities.len(), ?policy, "saved entities");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// The stored record with the same primary key as `entity`.
    pub fn read_one<E: Entity>(&self, entity: &E) -> Option<E> {
        self.read_by_key::<E>(entity.primary_key())
    }

    /// The stored record of type `E` with this primary key.
    pub fn read_by_key<E: Entity>(&self, key: &E::Key) -> Option<E> {
        let handle = self.handle("read_one").ok()?;
        match handle.lookup::<E>(key) {
            Ok(found) => found,
            Err(e) => {
                warn!(collection = E::COLLECTION, key = ?key, error = %e, "read failed");
                None
            }
        }
    }

    /// All records of type `E` matching `predicate` (all of them when `None`).
    ///
    /// Returns `None` only when the store could not be read.
    pub fn read_all<E: Entity>(&self, predicate: Option<&dyn Fn(&E) -> bool>) -> Option<Vec<E>> {
        let handle = self.handle("read_all").ok()?;
        match handle.query::<E>(predicate) {
            Ok(found) => Some(found),
            Err(e) => {
                warn!(collection = E::COLLECTION, error = %e, "query failed");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete the stored record with `entity`'s primary key.
    ///
    /// Fails with `EntityNotFound` when no such record exists; in that case
    /// no write transaction is opened.
    pub fn delete_one<E: Entity>(&self, entity: &E) -> Result<()> {
        let handle = self.handle("delete_one")?;
        let key = entity.primary_key();

        if handle.lookup::<E>(key)?.is_none() {
            return Err(StoreError::not_found::<E>(key));
        }

        handle.write(|txn| {
            if txn.remove::<E>(key)? {
                Ok(())
            } else {
                Err(StoreError::not_found::<E>(key))
            }
        })?;

        debug!(collection = E::COLLECTION, key = ?key, "deleted entity");
        Ok(())
    }

    /// Delete the stored records for every given entity, atomically.
    /// Entities with no stored record are skipped. Returns the number removed.
    pub fn delete_many<E: Entity>(&self, entities: &[E]) -> Result<usize> {
        let handle = self.handle("delete_many")?;
        let removed = handle.write(|txn| {
            let mut removed = 0;
            for entity in entities {
                if txn.remove::<E>(entity.primary_key())? {
                    removed += 1;
                }
            }
            Ok(removed)
        })?;

        debug!(collection = E::COLLECTION, requested = entities.len(), removed, "deleted entities");
        Ok(removed)
    }

    /// Delete every record of type `E`. Other types are untouched.
    pub fn delete_all_of_type<E: Entity>(&self) -> Result<usize> {
        let handle = self.handle("delete_all_of_type")?;
        let removed = handle.write(|txn| txn.remove_collection::<E>())?;

        debug!(collection = E::COLLECTION, removed, "deleted collection");
        Ok(removed)
    }

    /// Delete every record of every type.
    pub fn delete_everything(&self) -> Result<()> {
        let handle = self.handle("delete_everything")?;
        handle.write(|txn| txn.clear())?;

        debug!("deleted all records");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite the stored record with `entity`. Fails with `EntityNotFound`
    /// when no record has its primary key.
    ///
    /// The existence check and the write share one transaction, so a record
    /// deleted concurrently is never re-inserted.
    pub fn update_one<E: Entity>(&self, entity: &E) -> Result<()> {
        let handle = self.handle("update_one")?;
        let key = entity.primary_key();

        handle.write(|txn| {
            if !txn.contains::<E>(key)? {
                return Err(StoreError::not_found::<E>(key));
            }
            txn.put(entity, UpdatePolicy::ReplaceAll)
        })?;

        debug!(collection = E::COLLECTION, key = ?key, "updated entity");
        Ok(())
    }

    /// Overwrite the stored records for every given entity, all or nothing.
    ///
    /// Fails with `DuplicateInput` when two entities share a primary key and
    /// with `EntityNotFound` (naming the first missing key) unless every key
    /// is already stored. Nothing is written on failure.
    pub fn update_many<E: Entity>(&self, entities: &[E]) -> Result<()> {
        let handle = self.handle("update_many")?;

        let mut keys = HashSet::with_capacity(entities.len());
        for entity in entities {
            if !keys.insert(entity.primary_key()) {
                return Err(StoreError::duplicate_input::<E>(entity.primary_key()));
            }
        }

        handle.write(|txn| {
            for entity in entities {
                if !txn.contains::<E>(entity.primary_key())? {
                    return Err(StoreError::not_found::<E>(entity.primary_key()));
                }
            }
            txn.put_all(entities, UpdatePolicy::ReplaceAll)
        })?;

        debug!(collection = E::COLLECTION, count = entities.len(), "updated entities");
        Ok(())
    }
}
