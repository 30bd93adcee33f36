//! HNSW (Hierarchical Navigable Small World) index module.

pub mod graph;
pub mod neighbor_queue;

pub use graph::{GraphSnapshot, HnswGraph, HnswParams, NodeSnapshot};
pub use neighbor_queue::Neighbor;

use tracing::debug;

use crate::brute_force::exact_search;
use crate::config::IndexKind;
use crate::distance::DistanceMetric;
use crate::index::{rank, Index, IndexStats, SearchRequest};
use crate::storage::VectorStore;

/// An HNSW-based approximate nearest neighbor index.
#[derive(Debug)]
pub struct HnswIndex {
    graph: HnswGraph,
}

impl HnswIndex {
    /// Create a new HNSW index with custom parameters.
    pub fn with_params(metric: DistanceMetric, params: HnswParams) -> Self {
        Self {
            graph: HnswGraph::new(metric, params),
        }
    }

    /// Wrap an already-built graph.
    pub fn from_graph(graph: HnswGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &HnswGraph {
        &self.graph
    }

    pub fn params(&self) -> &HnswParams {
        self.graph.params()
    }
}

impl Index for HnswIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Hnsw
    }

    fn insert(&mut self, store: &VectorStore, position: usize) {
        self.graph.insert(store, position);
    }

    fn remove(&mut self, _store: &VectorStore, position: usize) {
        self.graph.remove(position);
    }

    fn search(&self, store: &VectorStore, request: &SearchRequest<'_>) -> Vec<Neighbor> {
        let k = request.k;
        if k == 0 || store.is_empty() {
            return Vec::new();
        }
        let params = self.graph.params();
        let ef = request.ef.unwrap_or(params.ef_search);
        let pool = match request.filter {
            Some(_) => ef.max(k.saturating_mul(params.filter_oversample)),
            None => ef.max(k),
        };

        let mut hits: Vec<Neighbor> = self
            .graph
            .search_pool(store, request.query, pool)
            .into_iter()
            .filter(|n| request.admits(store, n.position))
            .collect();

        // A filtered search that comes up short may simply have had its
        // matches outside the pool; an unfiltered one can only come up short
        // when tombstones cut the graph.
        let wanted = match request.filter {
            Some(_) => k,
            None => k.min(store.len()),
        };
        if hits.len() < wanted {
            debug!(
                found = hits.len(),
                wanted,
                pool,
                filtered = request.filter.is_some(),
                "hnsw pool short, falling back to exact scan"
            );
            return exact_search(store, self.graph.metric(), request);
        }

        rank(store, &mut hits);
        hits.truncate(k);
        hits
    }

    fn rebuild(&mut self, store: &VectorStore) {
        let mut positions: Vec<usize> = store.live_positions().collect();
        positions.sort_by(|&a, &b| store.id_at(a).cmp(store.id_at(b)));

        let mut graph = HnswGraph::new(self.graph.metric(), self.graph.params().clone());
        for position in positions {
            graph.insert(store, position);
        }
        debug!(nodes = graph.len(), max_level = graph.max_level(), "hnsw graph rebuilt");
        self.graph = graph;
    }

    fn stats(&self) -> IndexStats {
        IndexStats::Hnsw {
            params: self.graph.params().clone(),
            nodes: self.graph.node_count(),
            max_level: self.graph.max_level(),
            entry_point: self.graph.entry_point(),
        }
    }
}
