//! Entity - the capability every persisted type provides.
//!
//! ## Example
//!
//! ```ignore
//! use local_store::Entity;
//!
//! #[derive(Clone, Debug, Serialize, Deserialize, Entity)]
//! #[entity(collection = "notes")]
//! struct Note {
//!     #[entity(primary_key)]
//!     pub note_id: u64,
//!     pub title: String,
//! }
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be stored by [`LocalStorage`](crate::LocalStorage).
///
/// Identity is the primary key alone: two values with equal keys are the same
/// record, whatever their other fields hold.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Type of the primary-key attribute.
    type Key: Serialize + Clone + Eq + Hash + Debug + Send + Sync;

    /// The collection name for this entity type (e.g., "notes", "user_profiles").
    /// Primary keys are unique within a collection, never across collections.
    const COLLECTION: &'static str;

    /// Returns the primary key of this instance.
    fn primary_key(&self) -> &Self::Key;
}
