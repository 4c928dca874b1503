mod collection;
mod config;
mod entity;
mod error;
mod local_storage;
mod policy;
pub mod store;

pub use collection::EntityCollection;
pub use config::{BackendConfig, StorageConfig};
pub use entity::Entity;
pub use error::{Result, StoreError};
pub use local_storage::LocalStorage;
pub use policy::UpdatePolicy;
pub use store::{
    AnyStore, FileStore, InMemoryStore, StoreHandle, StoreProvider, WriteTransaction,
};

// Re-export the derive macro so `#[derive(Entity)]` works with a single import
pub use local_store_macros::Entity;
