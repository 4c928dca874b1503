//! Storage configuration.
//!
//! ```json
//! {
//!   "default_policy": "modify",
//!   "backend": { "kind": "file", "path": "/var/lib/app/store.json" }
//! }
//! ```
//!
//! Every field is optional; an empty object means an in-memory store with
//! `replace_all` as the default policy.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::policy::UpdatePolicy;
use crate::store::{AnyStore, FileStore, InMemoryStore};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Policy used by `LocalStorage::save` and `LocalStorage::save_all`.
    pub default_policy: UpdatePolicy,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    #[default]
    Memory,
    File { path: PathBuf },
}

impl StorageConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build the configured backend. Nothing is opened until the first
    /// storage operation.
    pub fn open_backend(&self) -> AnyStore {
        match &self.backend {
            BackendConfig::Memory => AnyStore::Memory(InMemoryStore::new()),
            BackendConfig::File { path } => AnyStore::File(FileStore::new(path.clone())),
        }
    }
}
