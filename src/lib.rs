//! # vecdb
//!
//! An embeddable vector database.
//!
//! This library provides:
//! - Record storage with metadata and tombstone deletion
//! - Distance metrics (Cosine, Euclidean, Dot Product, Manhattan)
//! - Brute-force and HNSW-based similarity search behind one [`Index`] contract
//! - Metadata filters applied inside search
//! - Versioned, checksummed snapshots
//!
//! ## Example
//!
//! ```rust
//! use vecdb::{CollectionConfig, DistanceMetric, Filter, Metadata, Vector, VectorDatabase};
//!
//! let config = CollectionConfig::new(3).with_metric(DistanceMetric::Euclidean);
//! let db = VectorDatabase::new(config).unwrap();
//!
//! db.add_with_metadata("v1", Vector::new(vec![1.0, 2.0, 3.0]), Metadata::new().with("lang", "en"))
//!     .unwrap();
//! db.add_with_metadata("v2", Vector::new(vec![3.0, 2.0, 1.0]), Metadata::new().with("lang", "fr"))
//!     .unwrap();
//!
//! let query = Vector::new(vec![1.1, 2.1, 3.1]);
//! let filter = Filter::new().eq("lang", "en");
//! let results = db.search(&query, 5, Some(&filter)).unwrap();
//! assert_eq!(results[0].id, "v1");
//! ```

pub mod brute_force;
pub mod config;
pub mod database;
pub mod distance;
pub mod error;
pub mod filter;
pub mod hnsw;
pub mod index;
pub mod metadata;
pub mod persistence;
pub mod storage;
pub mod vector;

pub use brute_force::BruteForceIndex;
pub use config::{CollectionConfig, IndexConfig, IndexKind};
pub use database::{SearchResult, Stats, VectorDatabase};
pub use distance::DistanceMetric;
pub use error::{Result, VectorDbError};
pub use filter::{Condition, Filter};
pub use hnsw::{HnswIndex, HnswParams};
pub use index::{Index, IndexStats};
pub use metadata::{Metadata, MetadataValue};
pub use storage::VectorStore;
pub use vector::Vector;
