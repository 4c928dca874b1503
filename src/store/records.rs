//! Records - the keyed record table both backends stage and publish.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::WriteTransaction;
use crate::entity::Entity;
use crate::error::{Result, StoreError};
use crate::policy::UpdatePolicy;

/// Records grouped by collection, keyed by the JSON encoding of the primary key.
///
/// This is also the on-disk layout of [`FileStore`](super::FileStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    collections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode_key<E: Entity>(key: &E::Key) -> Result<String> {
        Ok(serde_json::to_string(key)?)
    }

    /// Total number of records across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records in one collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, BTreeMap::len)
    }

    pub fn get<E: Entity>(&self, key: &E::Key) -> Result<Option<E>> {
        let key = Self::encode_key::<E>(key)?;
        match self
            .collections
            .get(E::COLLECTION)
            .and_then(|collection| collection.get(&key))
        {
            Some(value) => Ok(Some(E::deserialize(value)?)),
            None => Ok(None),
        }
    }

    pub fn contains<E: Entity>(&self, key: &E::Key) -> Result<bool> {
        let key = Self::encode_key::<E>(key)?;
        Ok(self
            .collections
            .get(E::COLLECTION)
            .is_some_and(|collection| collection.contains_key(&key)))
    }

    /// Records of `E` matching the predicate, ordered by encoded key.
    pub fn query<E: Entity>(&self, predicate: Option<&dyn Fn(&E) -> bool>) -> Result<Vec<E>> {
        let Some(collection) = self.collections.get(E::COLLECTION) else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for value in collection.values() {
            let entity = E::deserialize(value)?;
            if predicate.map_or(true, |matches| matches(&entity)) {
                results.push(entity);
            }
        }
        Ok(results)
    }

    /// Write one entity, resolving an occupied key per `policy`.
    pub fn apply<E: Entity>(&mut self, entity: &E, policy: UpdatePolicy) -> Result<()> {
        let key = Self::encode_key::<E>(entity.primary_key())?;
        let incoming = serde_json::to_value(entity)?;
        let collection = self
            .collections
            .entry(E::COLLECTION.to_string())
            .or_default();

        let occupied = collection.contains_key(&key);
        match policy {
            UpdatePolicy::Error if occupied => {
                return Err(StoreError::duplicate_key::<E>(entity.primary_key()));
            }
            UpdatePolicy::Modify if occupied => {
                if let Some(stored) = collection.get_mut(&key) {
                    let mut merged = stored.clone();
                    merge_fields(&mut merged, incoming);
                    // A merge that no longer decodes as `E` must not be stored.
                    E::deserialize(&merged)?;
                    *stored = merged;
                }
            }
            _ => {
                collection.insert(key, incoming);
            }
        }
        Ok(())
    }

    pub fn remove<E: Entity>(&mut self, key: &E::Key) -> Result<bool> {
        let key = Self::encode_key::<E>(key)?;
        let Some(collection) = self.collections.get_mut(E::COLLECTION) else {
            return Ok(false);
        };
        let removed = collection.remove(&key).is_some();
        if collection.is_empty() {
            self.collections.remove(E::COLLECTION);
        }
        Ok(removed)
    }

    pub fn remove_collection(&mut self, collection: &str) -> usize {
        self.collections
            .remove(collection)
            .map_or(0, |records| records.len())
    }

    pub fn clear(&mut self) {
        self.collections.clear();
    }
}

/// Overlay the incoming object's fields onto the stored one. Anything that
/// is not an object on both sides is replaced wholesale.
fn merge_fields(stored: &mut Value, incoming: Value) {
    match (stored, incoming) {
        (Value::Object(stored), Value::Object(incoming)) => {
            for (field, value) in incoming {
                stored.insert(field, value);
            }
        }
        (stored, incoming) => *stored = incoming,
    }
}

/// One staged mutation's inverse, replayed newest-first on rollback.
#[derive(Debug)]
enum Undo {
    Record {
        collection: String,
        key: String,
        previous: Option<Value>,
    },
    Collection {
        collection: String,
        previous: BTreeMap<String, Value>,
    },
    All(BTreeMap<String, BTreeMap<String, Value>>),
}

/// A write transaction applied in place on the record table.
///
/// Each mutation logs how to reverse itself, so staging a write costs the
/// size of the touched records, not of the whole table. Backends keep
/// [`Transaction::into_records`] when the body succeeds and
/// [`Transaction::rollback`] when it fails.
#[derive(Debug)]
pub struct Transaction {
    records: Records,
    undo: Vec<Undo>,
}

impl Transaction {
    pub(crate) fn begin(records: Records) -> Self {
        Self {
            records,
            undo: Vec::new(),
        }
    }

    pub(crate) fn into_records(self) -> Records {
        self.records
    }

    /// Reverse every staged mutation and return the table as it was at `begin`.
    pub(crate) fn rollback(self) -> Records {
        let Transaction { mut records, undo } = self;
        for step in undo.into_iter().rev() {
            match step {
                Undo::Record {
                    collection,
                    key,
                    previous: Some(value),
                } => {
                    records
                        .collections
                        .entry(collection)
                        .or_default()
                        .insert(key, value);
                }
                Undo::Record {
                    collection,
                    key,
                    previous: None,
                } => {
                    if let Some(stored) = records.collections.get_mut(&collection) {
                        stored.remove(&key);
                        if stored.is_empty() {
                            records.collections.remove(&collection);
                        }
                    }
                }
                Undo::Collection {
                    collection,
                    previous,
                } => {
                    records.collections.insert(collection, previous);
                }
                Undo::All(previous) => records.collections = previous,
            }
        }
        records
    }

    fn remember<E: Entity>(&mut self, key: String) {
        let previous = self
            .records
            .collections
            .get(E::COLLECTION)
            .and_then(|collection| collection.get(&key))
            .cloned();
        self.undo.push(Undo::Record {
            collection: E::COLLECTION.to_string(),
            key,
            previous,
        });
    }
}

impl WriteTransaction for Transaction {
    fn contains<E: Entity>(&self, key: &E::Key) -> Result<bool> {
        self.records.contains::<E>(key)
    }

    fn put<E: Entity>(&mut self, entity: &E, policy: UpdatePolicy) -> Result<()> {
        self.remember::<E>(Records::encode_key::<E>(entity.primary_key())?);
        self.records.apply(entity, policy)
    }

    fn remove<E: Entity>(&mut self, key: &E::Key) -> Result<bool> {
        self.remember::<E>(Records::encode_key::<E>(key)?);
        self.records.remove::<E>(key)
    }

    fn remove_collection<E: Entity>(&mut self) -> Result<usize> {
        let Some(previous) = self.records.collections.remove(E::COLLECTION) else {
            return Ok(0);
        };
        let removed = previous.len();
        self.undo.push(Undo::Collection {
            collection: E::COLLECTION.to_string(),
            previous,
        });
        Ok(removed)
    }

    fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.records.collections);
        self.undo.push(Undo::All(previous));
        Ok(())
    }
}
