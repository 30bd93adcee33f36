//! Index contract for the pluggable search backends.
//!
//! Indexes never own records. They address the [`VectorStore`] by internal
//! position and read vectors, metadata and tombstones from it, so every
//! method takes the store alongside `self`.

use serde::{Deserialize, Serialize};

use crate::brute_force::BruteForceIndex;
use crate::config::{CollectionConfig, IndexConfig, IndexKind};
use crate::error::{Result, VectorDbError};
use crate::filter::Filter;
use crate::hnsw::{GraphSnapshot, HnswGraph, HnswIndex, HnswParams, Neighbor};
use crate::storage::VectorStore;

/// One k-NN query as seen by an index.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub query: &'a [f32],
    pub k: usize,
    /// Candidate pool override; `None` uses the index's configured value.
    pub ef: Option<usize>,
    pub filter: Option<&'a Filter>,
}

impl<'a> SearchRequest<'a> {
    pub fn new(query: &'a [f32], k: usize) -> Self {
        Self {
            query,
            k,
            ef: None,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<&'a Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_ef(mut self, ef: Option<usize>) -> Self {
        self.ef = ef;
        self
    }

    /// Whether the record at `position` passes the filter, if any.
    pub(crate) fn admits(&self, store: &VectorStore, position: usize) -> bool {
        self.filter
            .map_or(true, |f| f.matches(store.metadata_at(position)))
    }
}

/// Structural report of an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexStats {
    BruteForce,
    Hnsw {
        params: HnswParams,
        nodes: usize,
        max_level: usize,
        entry_point: Option<usize>,
    },
}

/// A search index that supports insertion, removal, and k-NN search.
pub trait Index {
    fn kind(&self) -> IndexKind;

    /// Index the record stored at `position`.
    fn insert(&mut self, store: &VectorStore, position: usize);

    /// Stop returning the record at `position`.
    fn remove(&mut self, store: &VectorStore, position: usize);

    /// Up to `k` live records closest to the query that pass the filter,
    /// ascending by distance with ties broken by ascending id.
    fn search(&self, store: &VectorStore, request: &SearchRequest<'_>) -> Vec<Neighbor>;

    /// Discard derived state and rebuild it from the store's live records.
    fn rebuild(&mut self, store: &VectorStore);

    fn stats(&self) -> IndexStats;
}

/// Sort hits by distance, then id.
pub(crate) fn rank(store: &VectorStore, hits: &mut [Neighbor]) {
    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| store.id_at(a.position).cmp(store.id_at(b.position)))
    });
}

/// Persisted structural state of an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexSnapshot {
    BruteForce,
    Hnsw(GraphSnapshot),
}

/// The index currently serving a collection.
#[derive(Debug)]
pub enum ActiveIndex {
    Hnsw(HnswIndex),
    BruteForce(BruteForceIndex),
}

impl ActiveIndex {
    /// An empty index for `config`.
    pub fn new(config: &CollectionConfig) -> Self {
        match &config.index {
            IndexConfig::Hnsw(params) => {
                ActiveIndex::Hnsw(HnswIndex::with_params(config.metric, params.clone()))
            }
            IndexConfig::BruteForce => {
                ActiveIndex::BruteForce(BruteForceIndex::new(config.metric, config.dimension))
            }
        }
    }

    pub fn to_snapshot(&self) -> IndexSnapshot {
        match self {
            ActiveIndex::Hnsw(index) => IndexSnapshot::Hnsw(index.graph().to_snapshot()),
            ActiveIndex::BruteForce(_) => IndexSnapshot::BruteForce,
        }
    }

    /// Restore the index for `config` over an already-restored store.
    pub fn from_snapshot(
        snapshot: IndexSnapshot,
        config: &CollectionConfig,
        store: &VectorStore,
    ) -> Result<Self> {
        match (snapshot, &config.index) {
            (IndexSnapshot::Hnsw(graph), IndexConfig::Hnsw(params)) => {
                let graph = HnswGraph::from_snapshot(graph, config.metric, params.clone(), store)?;
                Ok(ActiveIndex::Hnsw(HnswIndex::from_graph(graph)))
            }
            // Nothing persisted; every record is picked up by the tail scan
            // until the next rebuild.
            (IndexSnapshot::BruteForce, IndexConfig::BruteForce) => Ok(ActiveIndex::BruteForce(
                BruteForceIndex::new(config.metric, config.dimension),
            )),
            (snapshot, index) => Err(VectorDbError::corrupt(format!(
                "index state {} does not match configured {}",
                match snapshot {
                    IndexSnapshot::Hnsw(_) => IndexKind::Hnsw,
                    IndexSnapshot::BruteForce => IndexKind::BruteForce,
                },
                index.kind()
            ))),
        }
    }

    fn inner(&self) -> &dyn Index {
        match self {
            ActiveIndex::Hnsw(index) => index,
            ActiveIndex::BruteForce(index) => index,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Index {
        match self {
            ActiveIndex::Hnsw(index) => index,
            ActiveIndex::BruteForce(index) => index,
        }
    }
}

impl Index for ActiveIndex {
    fn kind(&self) -> IndexKind {
        self.inner().kind()
    }

    fn insert(&mut self, store: &VectorStore, position: usize) {
        self.inner_mut().insert(store, position)
    }

    fn remove(&mut self, store: &VectorStore, position: usize) {
        self.inner_mut().remove(store, position)
    }

    fn search(&self, store: &VectorStore, request: &SearchRequest<'_>) -> Vec<Neighbor> {
        self.inner().search(store, request)
    }

    fn rebuild(&mut self, store: &VectorStore) {
        self.inner_mut().rebuild(store)
    }

    fn stats(&self) -> IndexStats {
        self.inner().stats()
    }
}
