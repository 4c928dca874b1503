use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the storage facade and its backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be opened for this call.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A delete or update targeted a record that does not exist.
    #[error("entity not found: {collection}:{key}")]
    EntityNotFound { collection: String, key: String },

    /// A strict insert hit an occupied primary key.
    #[error("duplicate key: {collection}:{key}")]
    DuplicateKey { collection: String, key: String },

    /// A batch update was given two entities with the same primary key.
    #[error("duplicate input for {collection}:{key} in batch update")]
    DuplicateInput { collection: String, key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl StoreError {
    pub(crate) fn not_found<E: crate::Entity>(key: &E::Key) -> Self {
        StoreError::EntityNotFound {
            collection: E::COLLECTION.to_string(),
            key: format!("{:?}", key),
        }
    }

    pub(crate) fn duplicate_key<E: crate::Entity>(key: &E::Key) -> Self {
        StoreError::DuplicateKey {
            collection: E::COLLECTION.to_string(),
            key: format!("{:?}", key),
        }
    }

    pub(crate) fn duplicate_input<E: crate::Entity>(key: &E::Key) -> Self {
        StoreError::DuplicateInput {
            collection: E::COLLECTION.to_string(),
            key: format!("{:?}", key),
        }
    }

    /// True for `StoreUnavailable`.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::StoreUnavailable(_))
    }

    /// True for `EntityNotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::EntityNotFound { .. })
    }
}
