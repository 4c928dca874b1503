//! EntityCollection - Typed accessor for one entity type's CRUD operations.

use std::marker::PhantomData;

use crate::entity::Entity;
use crate::error::Result;
use crate::local_storage::LocalStorage;
use crate::policy::UpdatePolicy;
use crate::store::StoreProvider;

/// Typed wrapper for accessing entities of a specific type.
///
/// Provides short method names by delegating to [`LocalStorage`].
pub struct EntityCollection<'a, P, E> {
    storage: &'a LocalStorage<P>,
    _marker: PhantomData<E>,
}

impl<'a, P: StoreProvider, E: Entity> EntityCollection<'a, P, E> {
    pub fn new(storage: &'a LocalStorage<P>) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }

    /// Get an entity by primary key.
    pub fn get(&self, key: &E::Key) -> Option<E> {
        self.storage.read_by_key::<E>(key)
    }

    /// All stored entities of this type.
    pub fn all(&self) -> Option<Vec<E>> {
        self.storage.read_all::<E>(None)
    }

    /// Entities matching a predicate.
    pub fn find(&self, predicate: &dyn Fn(&E) -> bool) -> Option<Vec<E>> {
        self.storage.read_all(Some(predicate))
    }

    /// The first entity (in key order) matching a predicate.
    pub fn find_one(&self, predicate: &dyn Fn(&E) -> bool) -> Option<E> {
        self.find(predicate)?.into_iter().next()
    }

    /// Save with the storage's default policy.
    pub fn save(&self, entity: &E) -> Result<()> {
        self.storage.save(entity)
    }

    /// Insert a new entity. Fails with `DuplicateKey` if the key is taken.
    pub fn insert(&self, entity: &E) -> Result<()> {
        self.storage.save_one(entity, UpdatePolicy::Error)
    }

    /// Overwrite an existing entity. Fails with `EntityNotFound` if absent.
    pub fn update(&self, entity: &E) -> Result<()> {
        self.storage.update_one(entity)
    }

    /// Delete an existing entity. Fails with `EntityNotFound` if absent.
    pub fn delete(&self, entity: &E) -> Result<()> {
        self.storage.delete_one(entity)
    }

    /// Delete every entity of this type.
    pub fn clear(&self) -> Result<usize> {
        self.storage.delete_all_of_type::<E>()
    }
}
