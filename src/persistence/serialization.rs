//! Serialization utilities: bincode for the snapshot payload.

use crate::config::CollectionConfig;
use crate::error::{Result, VectorDbError};
use crate::index::IndexSnapshot;
use crate::storage::StoreSnapshot;
use serde::{Deserialize, Serialize};

/// Serializable representation of the full database state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub config: CollectionConfig,
    pub store: StoreSnapshot,
    pub index: IndexSnapshot,
}

/// Encode data to bincode bytes.
pub fn to_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| VectorDbError::SerializationError(e.to_string()))
}

/// Decode data from bincode bytes.
pub fn from_bincode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| VectorDbError::SerializationError(e.to_string()))
}
