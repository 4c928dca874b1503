use serde::{Deserialize, Serialize};

/// What a write does when its primary key is already occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Strict insert: an occupied key fails the write with `DuplicateKey`.
    Error,
    /// Merge the incoming entity's serialized fields into the stored record.
    /// Fields the incoming value does not serialize keep their stored values.
    Modify,
    /// Overwrite the stored record entirely.
    #[default]
    ReplaceAll,
}
