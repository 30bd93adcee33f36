//! Persistence layer: versioned snapshots of a whole collection.

pub mod serialization;
pub mod snapshot;

pub use serialization::DatabaseSnapshot;
pub use snapshot::{read_snapshot, write_snapshot};

/// Current container schema version.
pub const SCHEMA_VERSION: u32 = 1;
