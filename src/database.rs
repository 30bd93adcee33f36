//! The database facade.
//!
//! A [`VectorDatabase`] is one collection: a [`VectorStore`] plus the index
//! serving it, behind a single readers-writer lock. Reads (`search`, `get`,
//! `exists`, `get_stats`) share the lock; every mutation, `save` and `load`
//! take it exclusively. Batches take it once.

use std::collections::HashSet;
use std::path::Path;

use parking_lot::RwLock;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CollectionConfig, IndexConfig, IndexKind};
use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::filter::Filter;
use crate::index::{ActiveIndex, Index, IndexStats, SearchRequest};
use crate::metadata::Metadata;
use crate::persistence::{self, DatabaseSnapshot};
use crate::storage::{UpdateOutcome, VectorStore};
use crate::vector::Vector;

/// A search result with ID, distance and the record's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub distance: f32,
    pub metadata: Metadata,
}

/// Aggregated store and index report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub live_count: usize,
    pub tombstoned_count: usize,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub index_kind: IndexKind,
    pub index: IndexStats,
}

#[derive(Debug)]
struct Collection {
    config: CollectionConfig,
    store: VectorStore,
    index: ActiveIndex,
}

impl Collection {
    fn new(config: CollectionConfig) -> Self {
        let store = VectorStore::new(config.dimension);
        let index = ActiveIndex::new(&config);
        Self {
            config,
            store,
            index,
        }
    }

    fn from_snapshot(snapshot: DatabaseSnapshot) -> Result<Self> {
        let DatabaseSnapshot {
            config,
            store,
            index,
        } = snapshot;
        config.validate()?;
        if store.dimension != config.dimension {
            return Err(VectorDbError::corrupt(format!(
                "store dimension {} disagrees with configured {}",
                store.dimension, config.dimension
            )));
        }
        let store = VectorStore::from_snapshot(store)?;
        let index = ActiveIndex::from_snapshot(index, &config, &store)?;
        Ok(Self {
            config,
            store,
            index,
        })
    }

    fn to_snapshot(&self) -> DatabaseSnapshot {
        DatabaseSnapshot {
            config: self.config.clone(),
            store: self.store.to_snapshot(),
            index: self.index.to_snapshot(),
        }
    }

    fn insert(&mut self, id: String, vector: Vector, metadata: Metadata) -> Result<()> {
        let position = self.store.add(id, vector, metadata)?;
        self.index.insert(&self.store, position);
        Ok(())
    }

    fn search(
        &self,
        query: &Vector,
        k: usize,
        ef: Option<usize>,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        query.validate(self.config.dimension)?;
        let request = SearchRequest::new(query.as_slice(), k)
            .with_ef(ef)
            .with_filter(filter);

        Ok(self
            .index
            .search(&self.store, &request)
            .into_iter()
            .map(|n| {
                let record = self.store.record(n.position);
                SearchResult {
                    id: record.id.to_string(),
                    distance: n.distance,
                    metadata: record.metadata.clone(),
                }
            })
            .collect())
    }

    fn rebuild(&mut self) {
        self.store.compact();
        self.index.rebuild(&self.store);
    }

    fn stats(&self) -> Stats {
        Stats {
            live_count: self.store.len(),
            tombstoned_count: self.store.tombstoned_count(),
            dimension: self.config.dimension,
            metric: self.config.metric,
            index_kind: self.index.kind(),
            index: self.index.stats(),
        }
    }
}

/// A single-collection vector database.
#[derive(Debug)]
pub struct VectorDatabase {
    inner: RwLock<Collection>,
}

impl VectorDatabase {
    /// Create an empty database.
    pub fn new(config: CollectionConfig) -> Result<Self> {
        config.validate()?;
        info!(
            dimension = config.dimension,
            metric = %config.metric,
            index = %config.index.kind(),
            "collection created"
        );
        Ok(Self {
            inner: RwLock::new(Collection::new(config)),
        })
    }

    /// Build a database from the snapshot at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let collection = Collection::from_snapshot(persistence::read_snapshot(path)?)?;
        info!(
            path = %path.display(),
            live = collection.store.len(),
            index = %collection.index.kind(),
            "collection opened"
        );
        Ok(Self {
            inner: RwLock::new(collection),
        })
    }

    pub fn config(&self) -> CollectionConfig {
        self.inner.read().config.clone()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.inner.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a record with empty metadata.
    pub fn add(&self, id: impl Into<String>, vector: Vector) -> Result<()> {
        self.add_with_metadata(id, vector, Metadata::new())
    }

    pub fn add_with_metadata(
        &self,
        id: impl Into<String>,
        vector: Vector,
        metadata: Metadata,
    ) -> Result<()> {
        let id = id.into();
        let mut inner = self.inner.write();
        debug!(id = %id, "add");
        inner.insert(id, vector, metadata)
    }

    /// Insert many records under one lock.
    ///
    /// The whole batch is validated first; on the first bad element nothing
    /// is inserted and `BatchFailed` carries its index.
    pub fn add_batch<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Vector, Option<Metadata>)>,
    {
        let records: Vec<_> = records.into_iter().collect();
        let mut inner = self.inner.write();

        let mut seen = HashSet::with_capacity(records.len());
        for (index, (id, vector, _)) in records.iter().enumerate() {
            let checked = inner.store.check_add(id, vector).and_then(|()| {
                if seen.insert(id.as_str()) {
                    Ok(())
                } else {
                    Err(VectorDbError::DuplicateId { id: id.clone() })
                }
            });
            if let Err(source) = checked {
                return Err(VectorDbError::BatchFailed {
                    index,
                    source: Box::new(source),
                });
            }
        }

        let count = records.len();
        for (id, vector, metadata) in records {
            inner.insert(id, vector, metadata.unwrap_or_default())?;
        }
        debug!(count, "batch added");
        Ok(())
    }

    /// Vector and metadata of a live record.
    pub fn get(&self, id: &str) -> Result<(Vector, Metadata)> {
        let inner = self.inner.read();
        let record = inner.store.get(id)?;
        Ok((Vector::from(record.vector), record.metadata.clone()))
    }

    /// Replace the vector and/or metadata of a live record.
    pub fn update(&self, id: &str, vector: Option<Vector>, metadata: Option<Metadata>) -> Result<()> {
        let mut inner = self.inner.write();
        let Collection { store, index, .. } = &mut *inner;
        match store.update(id, vector, metadata)? {
            UpdateOutcome::InPlace { .. } => {}
            UpdateOutcome::Relocated { old, new } => {
                index.remove(store, old);
                index.insert(store, new);
            }
        }
        debug!(id, "update");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write();
        let Collection { store, index, .. } = &mut *inner;
        let position = store.delete(id)?;
        index.remove(store, position);
        debug!(id, "delete");
        Ok(())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.inner.read().store.exists(id)
    }

    /// Live ids in ascending order.
    pub fn list_ids(&self) -> Vec<String> {
        self.inner.read().store.ids()
    }

    /// The `k` nearest live records passing `filter`, ascending by distance
    /// with ties broken by id.
    pub fn search(&self, query: &Vector, k: usize, filter: Option<&Filter>) -> Result<Vec<SearchResult>> {
        self.inner.read().search(query, k, None, filter)
    }

    /// Like [`search`](Self::search) with an explicit HNSW candidate pool.
    /// Brute force ignores `ef`.
    pub fn search_with_ef(
        &self,
        query: &Vector,
        k: usize,
        ef: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        if ef == 0 {
            return Err(VectorDbError::invalid_parameter("ef", "must be at least 1"));
        }
        self.inner.read().search(query, k, Some(ef), filter)
    }

    /// Run several queries against one consistent view, in parallel.
    pub fn search_batch(
        &self,
        queries: &[Vector],
        k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<Vec<SearchResult>>> {
        let inner = self.inner.read();
        let collection: &Collection = &inner;
        queries
            .par_iter()
            .map(|query| collection.search(query, k, None, filter))
            .collect()
    }

    /// Purge tombstones and rebuild the active index from the live records.
    pub fn rebuild_index(&self) {
        let mut inner = self.inner.write();
        let purged = inner.store.tombstoned_count();
        inner.rebuild();
        info!(live = inner.store.len(), purged, index = %inner.index.kind(), "index rebuilt");
    }

    /// Replace the active index with a freshly built one of another kind or
    /// with other parameters.
    pub fn switch_index(&self, index: IndexConfig) -> Result<()> {
        index.validate()?;
        let mut inner = self.inner.write();
        let from = inner.index.kind();
        inner.config.index = index;
        inner.index = ActiveIndex::new(&inner.config);
        inner.rebuild();
        info!(%from, to = %inner.index.kind(), live = inner.store.len(), "index switched");
        Ok(())
    }

    pub fn get_stats(&self) -> Stats {
        self.inner.read().stats()
    }

    /// Write a snapshot of the whole collection to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let inner = self.inner.write();
        let bytes = persistence::write_snapshot(path, &inner.to_snapshot())?;
        info!(path = %path.display(), bytes, live = inner.store.len(), "collection saved");
        Ok(())
    }

    /// Replace this collection's state with the snapshot at `path`.
    ///
    /// The snapshot's dimension must match the current one. On any failure
    /// the current state is kept.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut inner = self.inner.write();
        let restored = persistence::read_snapshot(path).and_then(|snapshot| {
            if snapshot.config.dimension != inner.config.dimension {
                return Err(VectorDbError::PersistenceVersionMismatch {
                    what: "dimension",
                    expected: inner.config.dimension as u64,
                    found: snapshot.config.dimension as u64,
                });
            }
            Collection::from_snapshot(snapshot)
        });
        match restored {
            Ok(collection) => {
                *inner = collection;
                info!(path = %path.display(), live = inner.store.len(), "collection loaded");
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "snapshot rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hnsw::HnswParams;

    fn db(config: CollectionConfig) -> VectorDatabase {
        VectorDatabase::new(config).unwrap()
    }

    fn v(data: &[f32]) -> Vector {
        Vector::from(data)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            VectorDatabase::new(CollectionConfig::new(0)),
            Err(VectorDbError::InvalidParameter { name: "dimension", .. })
        ));
        let config = CollectionConfig::new(4).with_hnsw(HnswParams::new(1, 10, 10));
        assert!(VectorDatabase::new(config).is_err());
    }

    #[test]
    fn test_add_get_roundtrip() {
        let db = db(CollectionConfig::new(3));
        let meta = Metadata::new().with("lang", "en").with("score", 0.5).with("ok", true);
        db.add_with_metadata("a", v(&[0.1, 0.2, 0.3]), meta.clone()).unwrap();

        let (vector, metadata) = db.get("a").unwrap();
        assert_eq!(vector, v(&[0.1, 0.2, 0.3]));
        assert_eq!(metadata, meta);
        assert!(db.exists("a"));
        assert!(!db.exists("b"));
    }

    #[test]
    fn test_duplicate_and_dimension_errors() {
        let db = db(CollectionConfig::new(2));
        db.add("a", v(&[1.0, 0.0])).unwrap();
        assert!(matches!(db.add("a", v(&[0.0, 1.0])), Err(VectorDbError::DuplicateId { .. })));
        assert!(matches!(
            db.add("b", v(&[1.0, 0.0, 0.0])),
            Err(VectorDbError::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            db.add("c", v(&[f32::NAN, 0.0])),
            Err(VectorDbError::InvalidVector { .. })
        ));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_add_batch_is_all_or_nothing() {
        let db = db(CollectionConfig::new(2).brute_force());
        let batch = vec![
            ("a".to_string(), v(&[1.0, 0.0]), None),
            ("b".to_string(), v(&[0.0, 1.0]), None),
            ("a".to_string(), v(&[1.0, 1.0]), None),
        ];
        match db.add_batch(batch) {
            Err(VectorDbError::BatchFailed { index, source }) => {
                assert_eq!(index, 2);
                assert!(matches!(*source, VectorDbError::DuplicateId { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(db.is_empty());

        db.add_batch(vec![
            ("a".to_string(), v(&[1.0, 0.0]), None),
            ("b".to_string(), v(&[0.0, 1.0]), Some(Metadata::new().with("x", 1))),
        ])
        .unwrap();
        assert_eq!(db.list_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_delete_then_readd_requires_rebuild() {
        let db = db(CollectionConfig::new(2));
        db.add("a", v(&[1.0, 0.0])).unwrap();
        db.delete("a").unwrap();

        assert!(matches!(db.get("a"), Err(VectorDbError::UnknownId { .. })));
        assert!(matches!(db.delete("a"), Err(VectorDbError::UnknownId { .. })));
        assert!(matches!(db.add("a", v(&[1.0, 0.0])), Err(VectorDbError::DuplicateId { .. })));

        db.rebuild_index();
        db.add("a", v(&[0.0, 1.0])).unwrap();
        assert_eq!(db.get("a").unwrap().0, v(&[0.0, 1.0]));
    }

    #[test]
    fn test_update_vector_and_metadata() {
        let db = db(CollectionConfig::new(2).with_metric(DistanceMetric::Euclidean));
        db.add("a", v(&[1.0, 0.0])).unwrap();
        db.add("b", v(&[0.0, 1.0])).unwrap();

        db.update("a", Some(v(&[0.0, 0.9])), None).unwrap();
        let hits = db.search(&v(&[0.0, 1.0]), 2, None).unwrap();
        assert_eq!(hits[0].id, "b");
        assert_eq!(hits[1].id, "a");
        assert_eq!(db.get_stats().tombstoned_count, 1);

        db.update("b", None, Some(Metadata::new().with("tag", "x"))).unwrap();
        assert_eq!(db.get("b").unwrap().1.get("tag"), Some(&"x".into()));
        assert_eq!(db.get("b").unwrap().0, v(&[0.0, 1.0]));

        assert!(matches!(
            db.update("zzz", None, None),
            Err(VectorDbError::UnknownId { .. })
        ));
        assert!(matches!(
            db.update("a", Some(v(&[1.0])), None),
            Err(VectorDbError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_search_rejects_bad_query() {
        let db = db(CollectionConfig::new(3));
        assert!(matches!(
            db.search(&v(&[1.0, 0.0]), 3, None),
            Err(VectorDbError::DimensionMismatch { .. })
        ));
        assert!(db.search(&v(&[1.0, 0.0, 0.0]), 3, None).unwrap().is_empty());
        assert!(matches!(
            db.search_with_ef(&v(&[1.0, 0.0, 0.0]), 3, 0, None),
            Err(VectorDbError::InvalidParameter { name: "ef", .. })
        ));
    }

    #[test]
    fn test_search_batch_matches_search() {
        let db = db(CollectionConfig::new(2).with_metric(DistanceMetric::Euclidean));
        for i in 0..30 {
            db.add(format!("v{:02}", i), v(&[i as f32, (i % 7) as f32])).unwrap();
        }
        let queries = vec![v(&[3.0, 1.0]), v(&[20.0, 5.0]), v(&[-1.0, 0.0])];
        let batch = db.search_batch(&queries, 4, None).unwrap();
        for (query, hits) in queries.iter().zip(&batch) {
            assert_eq!(hits, &db.search(query, 4, None).unwrap());
        }
    }

    #[test]
    fn test_switch_index_keeps_results() {
        let db = db(CollectionConfig::new(2).with_metric(DistanceMetric::Euclidean));
        for i in 0..20 {
            db.add(format!("v{:02}", i), v(&[i as f32, 0.0])).unwrap();
        }
        db.delete("v05").unwrap();

        db.switch_index(IndexConfig::BruteForce).unwrap();
        let stats = db.get_stats();
        assert_eq!(stats.index_kind, IndexKind::BruteForce);
        assert_eq!(stats.tombstoned_count, 0);
        assert_eq!(stats.live_count, 19);

        let ids: Vec<String> = db
            .search(&v(&[5.2, 0.0]), 2, None)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["v06", "v04"]);

        assert!(matches!(
            db.switch_index(IndexConfig::Hnsw(HnswParams::new(16, 0, 50))),
            Err(VectorDbError::InvalidParameter { .. })
        ));
        assert_eq!(db.get_stats().index_kind, IndexKind::BruteForce);
    }

    #[test]
    fn test_stats_report_hnsw_params() {
        let params = HnswParams::new(8, 40, 20).with_seed(5);
        let db = db(CollectionConfig::new(2).with_hnsw(params.clone()));
        db.add("a", v(&[1.0, 0.0])).unwrap();
        let stats = db.get_stats();
        assert_eq!(stats.live_count, 1);
        assert_eq!(stats.dimension, 2);
        assert_eq!(stats.metric, DistanceMetric::Cosine);
        match stats.index {
            IndexStats::Hnsw { params: p, nodes, entry_point, .. } => {
                assert_eq!(p, params);
                assert_eq!(nodes, 1);
                assert_eq!(entry_point, Some(0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
