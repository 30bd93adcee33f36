//! HNSW graph: core data structures and algorithms.
//!
//! Implements the Hierarchical Navigable Small World graph from:
//! "Efficient and robust approximate nearest neighbor search using
//!  Hierarchical Navigable Small World graphs" (Malkov & Yashunin, 2016/2018).
//!
//! The graph stores only structure. Vectors are read from the
//! [`VectorStore`] by internal position, and node `i` of the graph always
//! describes store position `i`. Deletion is a tombstone: a deleted node is
//! never returned as a result but its edges are still walked until the next
//! rebuild.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::storage::VectorStore;

use super::neighbor_queue::{MaxHeap, MinHeap, Neighbor};

/// Configuration parameters for the HNSW index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswParams {
    /// Max number of connections per node (layers > 0). Layer 0 allows `2 * m`.
    pub m: usize,
    /// Number of candidates during construction.
    pub ef_construction: usize,
    /// Number of candidates during search.
    pub ef_search: usize,
    /// Maximum number of layers.
    pub max_layers: usize,
    /// Candidate pool multiplier applied to `k` when a filter is present.
    pub filter_oversample: usize,
    /// Seed for level generation; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 50,
            max_layers: 16,
            filter_oversample: 4,
            seed: None,
        }
    }
}

impl HnswParams {
    pub fn new(m: usize, ef_construction: usize, ef_search: usize) -> Self {
        Self {
            m,
            ef_construction,
            ef_search,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_filter_oversample(mut self, factor: usize) -> Self {
        self.filter_oversample = factor;
        self
    }

    /// Max connections at layer 0.
    pub fn m_max0(&self) -> usize {
        2 * self.m
    }

    /// Level generation factor: 1 / ln(m).
    pub fn ml(&self) -> f64 {
        1.0 / (self.m as f64).ln()
    }

    /// Neighbor list cap for `layer`.
    pub fn max_links(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0()
        } else {
            self.m
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(VectorDbError::invalid_parameter("m", "must be at least 2"));
        }
        if self.ef_construction < 1 {
            return Err(VectorDbError::invalid_parameter(
                "ef_construction",
                "must be at least 1",
            ));
        }
        if self.ef_search < 1 {
            return Err(VectorDbError::invalid_parameter("ef_search", "must be at least 1"));
        }
        if self.max_layers < 1 {
            return Err(VectorDbError::invalid_parameter("max_layers", "must be at least 1"));
        }
        if self.filter_oversample < 1 {
            return Err(VectorDbError::invalid_parameter(
                "filter_oversample",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A node in the HNSW graph.
#[derive(Debug, Clone)]
struct HnswNode {
    /// Neighbors per layer, each ascending by distance to this node.
    neighbors: Vec<Vec<usize>>,
    /// The maximum layer this node was inserted into.
    level: usize,
    deleted: bool,
}

/// Serializable form of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub level: usize,
    pub neighbors: Vec<Vec<usize>>,
    pub deleted: bool,
}

/// Serializable form of the whole graph, indexed by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Option<NodeSnapshot>>,
    pub entry_point: Option<usize>,
    pub max_level: usize,
}

/// The HNSW graph structure.
#[derive(Debug)]
pub struct HnswGraph {
    /// Nodes indexed by internal position. `None` for positions never inserted.
    nodes: Vec<Option<HnswNode>>,
    /// Entry point node (a live node on the highest occupied layer).
    entry_point: Option<usize>,
    /// Current maximum level in the graph.
    max_level: usize,
    params: HnswParams,
    metric: DistanceMetric,
    /// RNG for level generation.
    rng: StdRng,
    /// Count of live (non-deleted) nodes.
    count: usize,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl HnswGraph {
    pub fn new(metric: DistanceMetric, params: HnswParams) -> Self {
        let rng = make_rng(params.seed);
        Self {
            nodes: Vec::new(),
            entry_point: None,
            max_level: 0,
            params,
            metric,
            rng,
            count: 0,
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    /// Live node count.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Node slots, including deleted nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn entry_point(&self) -> Option<usize> {
        self.entry_point
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Level of the node at `position`.
    pub fn level(&self, position: usize) -> Option<usize> {
        self.node(position).map(|n| n.level)
    }

    /// Neighbor list of `position` at `layer`; empty when the node is absent
    /// or does not reach that layer.
    pub fn links(&self, position: usize, layer: usize) -> &[usize] {
        self.node(position)
            .and_then(|n| n.neighbors.get(layer))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_deleted(&self, position: usize) -> bool {
        self.node(position).map_or(true, |n| n.deleted)
    }

    fn node(&self, position: usize) -> Option<&HnswNode> {
        self.nodes.get(position).and_then(Option::as_ref)
    }

    /// Generate a random level for a new node.
    fn random_level(&mut self) -> usize {
        // gen() is in [0, 1); 1 - r keeps the log argument in (0, 1].
        let r: f64 = 1.0 - self.rng.gen::<f64>();
        let level = (-r.ln() * self.params.ml()).floor() as usize;
        level.min(self.params.max_layers - 1)
    }

    fn distance(&self, store: &VectorStore, query: &[f32], position: usize) -> f32 {
        self.metric.distance(query, store.vector(position))
    }

    /// Single-candidate greedy walk at one layer: move to a closer neighbor
    /// until none is closer.
    fn greedy_closest(
        &self,
        store: &VectorStore,
        query: &[f32],
        start: Neighbor,
        layer: usize,
    ) -> Neighbor {
        let mut best = start;
        loop {
            let mut improved = false;
            for &candidate in self.links(best.position, layer) {
                let next = Neighbor::new(candidate, self.distance(store, query, candidate));
                if next < best {
                    best = next;
                    improved = true;
                }
            }
            if !improved {
                return best;
            }
        }
    }

    /// SEARCH-LAYER: Algorithm 2 from the HNSW paper.
    ///
    /// Search a single layer of the graph for the ef closest nodes to query,
    /// deleted nodes included. Returns them ascending by distance.
    fn search_layer(
        &self,
        store: &VectorStore,
        query: &[f32],
        entries: &[Neighbor],
        ef: usize,
        layer: usize,
    ) -> Vec<Neighbor> {
        let mut visited = HashSet::new();
        let mut candidates = MinHeap::new(); // closest candidate on top
        let mut results = MaxHeap::new(); // furthest result on top

        for &entry in entries {
            if visited.insert(entry.position) {
                candidates.push(entry);
                results.push_bounded(entry, ef);
            }
        }

        while let Some(c) = candidates.pop() {
            // If the closest candidate is further than the furthest result, stop
            let furthest = results.peek().map_or(f32::INFINITY, |n| n.distance);
            if c.distance > furthest && results.len() >= ef {
                break;
            }

            for &neighbor in self.links(c.position, layer) {
                if !visited.insert(neighbor) {
                    continue;
                }

                let dist = self.distance(store, query, neighbor);
                let furthest = results.peek().map_or(f32::INFINITY, |n| n.distance);
                if dist < furthest || results.len() < ef {
                    let n = Neighbor::new(neighbor, dist);
                    candidates.push(n);
                    results.push_bounded(n, ef);
                }
            }
        }

        results.into_sorted_vec()
    }

    /// Diversity heuristic (Algorithm 4 without extension): walk candidates
    /// in ascending distance to the base node and keep one only if no
    /// already-kept neighbor is closer to it than the base node is.
    fn select_neighbors(
        &self,
        store: &VectorStore,
        candidates: &[Neighbor],
        m: usize,
    ) -> Vec<Neighbor> {
        let mut selected: Vec<Neighbor> = Vec::with_capacity(m);
        for &candidate in candidates {
            if selected.len() >= m {
                break;
            }
            let candidate_vec = store.vector(candidate.position);
            let dominated = selected.iter().any(|kept| {
                self.metric.distance(candidate_vec, store.vector(kept.position))
                    < candidate.distance
            });
            if !dominated {
                selected.push(candidate);
            }
        }
        selected
    }

    /// Add `new` to the neighbor list of `target` at `layer`, keeping the
    /// list sorted and re-running the heuristic when it overflows.
    fn link(&mut self, store: &VectorStore, target: usize, new: usize, layer: usize) {
        let cap = self.params.max_links(layer);
        let base = store.vector(target);
        let current = self.links(target, layer);
        if current.contains(&new) {
            return;
        }
        let incoming = Neighbor::new(new, self.metric.distance(base, store.vector(new)));

        let updated: Vec<usize> = if current.len() < cap {
            let at = current.partition_point(|&p| {
                Neighbor::new(p, self.metric.distance(base, store.vector(p))) < incoming
            });
            let mut list = current.to_vec();
            list.insert(at, new);
            list
        } else {
            let mut pool: Vec<Neighbor> = current
                .iter()
                .map(|&p| Neighbor::new(p, self.metric.distance(base, store.vector(p))))
                .collect();
            pool.push(incoming);
            pool.sort();
            self.select_neighbors(store, &pool, cap)
                .into_iter()
                .map(|n| n.position)
                .collect()
        };

        if let Some(Some(node)) = self.nodes.get_mut(target) {
            if let Some(list) = node.neighbors.get_mut(layer) {
                *list = updated;
            }
        }
    }

    /// INSERT: Algorithm 1 from the HNSW paper. `position` must hold a
    /// vector in `store`.
    pub fn insert(&mut self, store: &VectorStore, position: usize) {
        let level = self.random_level();

        if position >= self.nodes.len() {
            self.nodes.resize_with(position + 1, || None);
        }
        self.nodes[position] = Some(HnswNode {
            neighbors: vec![Vec::new(); level + 1],
            level,
            deleted: false,
        });
        self.count += 1;

        // If the graph has no live entry, this node becomes it
        let entry_point = match self.entry_point {
            None => {
                self.entry_point = Some(position);
                self.max_level = level;
                return;
            }
            Some(ep) => ep,
        };

        let query = store.vector(position);
        let top = self.max_level;
        let mut current = Neighbor::new(entry_point, self.distance(store, query, entry_point));

        // Phase 1: greedy descent from top layer down to level+1
        for layer in (level + 1..=top).rev() {
            current = self.greedy_closest(store, query, current, layer);
        }

        // Phase 2: connect at layers min(level, top) down to 0
        let mut entries = vec![current];
        for layer in (0..=level.min(top)).rev() {
            let candidates =
                self.search_layer(store, query, &entries, self.params.ef_construction, layer);
            let selected = self.select_neighbors(store, &candidates, self.params.max_links(layer));

            if let Some(Some(node)) = self.nodes.get_mut(position) {
                node.neighbors[layer] = selected.iter().map(|n| n.position).collect();
            }
            for n in &selected {
                self.link(store, n.position, position, layer);
            }

            if !candidates.is_empty() {
                entries = candidates;
            }
        }

        if level > top {
            self.entry_point = Some(position);
            self.max_level = level;
        }
    }

    /// Tombstone a node. Edges stay in place; the entry point moves to the
    /// highest-level live node if it was the one deleted.
    pub fn remove(&mut self, position: usize) {
        match self.nodes.get_mut(position) {
            Some(Some(node)) if !node.deleted => node.deleted = true,
            _ => return,
        }
        self.count -= 1;

        if self.entry_point == Some(position) {
            let replacement = self
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(pos, n)| n.as_ref().filter(|n| !n.deleted).map(|n| (pos, n.level)))
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

            self.entry_point = replacement.map(|(pos, _)| pos);
            self.max_level = replacement.map_or(0, |(_, level)| level);
        }
    }

    /// SEARCH: Algorithm 5 from the HNSW paper.
    ///
    /// Returns up to `pool` nodes closest to `query`, deleted ones excluded,
    /// ascending by distance. The layer-0 pool is `max(pool, 1)`.
    pub fn search_pool(&self, store: &VectorStore, query: &[f32], pool: usize) -> Vec<Neighbor> {
        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => return vec![],
        };

        let mut current = Neighbor::new(entry_point, self.distance(store, query, entry_point));

        // Phase 1: greedy descent from top layer to layer 1
        for layer in (1..=self.max_level).rev() {
            current = self.greedy_closest(store, query, current, layer);
        }

        // Phase 2: bounded expansion on layer 0
        self.search_layer(store, query, &[current], pool.max(1), 0)
            .into_iter()
            .filter(|n| !self.is_deleted(n.position))
            .collect()
    }

    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|n| {
                    n.as_ref().map(|n| NodeSnapshot {
                        level: n.level,
                        neighbors: n.neighbors.clone(),
                        deleted: n.deleted,
                    })
                })
                .collect(),
            entry_point: self.entry_point,
            max_level: self.max_level,
        }
    }

    /// Restore a graph verbatim, checking the structural invariants against
    /// the already-restored store.
    pub fn from_snapshot(
        snapshot: GraphSnapshot,
        metric: DistanceMetric,
        params: HnswParams,
        store: &VectorStore,
    ) -> Result<Self> {
        let corrupt = VectorDbError::corrupt;
        if snapshot.nodes.len() > store.slot_count() {
            return Err(corrupt(format!(
                "graph has {} nodes but store has {} records",
                snapshot.nodes.len(),
                store.slot_count()
            )));
        }
        if let Some(pos) = (snapshot.nodes.len()..store.slot_count()).find(|&p| store.is_live(p)) {
            return Err(corrupt(format!("live record {} has no graph node", pos)));
        }

        let levels: Vec<Option<usize>> = snapshot
            .nodes
            .iter()
            .map(|n| n.as_ref().map(|n| n.level))
            .collect();

        let mut count = 0;
        let mut top_live: Option<usize> = None;
        for (pos, node) in snapshot.nodes.iter().enumerate() {
            let node = match node {
                Some(node) => node,
                None if store.is_live(pos) => {
                    return Err(corrupt(format!("live record {} has no graph node", pos)))
                }
                None => continue,
            };
            if node.deleted == store.is_live(pos) {
                return Err(corrupt(format!("tombstone flag disagrees at position {}", pos)));
            }
            if node.level >= params.max_layers {
                return Err(corrupt(format!(
                    "node {} has level {} (max layers {})",
                    pos, node.level, params.max_layers
                )));
            }
            if node.neighbors.len() != node.level + 1 {
                return Err(corrupt(format!(
                    "node {} has level {} but {} layers",
                    pos,
                    node.level,
                    node.neighbors.len()
                )));
            }
            for (layer, list) in node.neighbors.iter().enumerate() {
                if list.len() > params.max_links(layer) {
                    return Err(corrupt(format!(
                        "node {} has {} links at layer {} (cap {})",
                        pos,
                        list.len(),
                        layer,
                        params.max_links(layer)
                    )));
                }
                for &n in list {
                    let reaches = levels.get(n).copied().flatten().is_some_and(|l| l >= layer);
                    if n == pos || !reaches {
                        return Err(corrupt(format!(
                            "node {} links to invalid position {} at layer {}",
                            pos, n, layer
                        )));
                    }
                }
            }
            if !node.deleted {
                count += 1;
                top_live = Some(top_live.map_or(node.level, |t| t.max(node.level)));
            }
        }

        match (snapshot.entry_point, top_live) {
            (None, None) => {}
            (Some(ep), Some(top)) => {
                let valid = snapshot.nodes.get(ep).and_then(Option::as_ref).is_some_and(|n| {
                    !n.deleted && n.level == top && snapshot.max_level == top
                });
                if !valid {
                    return Err(corrupt(format!("entry point {} is not a top-level live node", ep)));
                }
            }
            (ep, _) => {
                return Err(corrupt(format!(
                    "entry point {:?} inconsistent with {} live nodes",
                    ep, count
                )))
            }
        }

        let nodes = snapshot
            .nodes
            .into_iter()
            .map(|n| {
                n.map(|n| HnswNode {
                    neighbors: n.neighbors,
                    level: n.level,
                    deleted: n.deleted,
                })
            })
            .collect::<Vec<_>>();
        // Continue the level sequence instead of replaying the original one.
        let rng = make_rng(params.seed.map(|s| s.wrapping_add(nodes.len() as u64)));

        Ok(Self {
            nodes,
            entry_point: snapshot.entry_point,
            max_level: snapshot.max_level,
            params,
            metric,
            rng,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;
    use crate::vector::Vector;

    fn make_params() -> HnswParams {
        HnswParams::new(4, 32, 16).with_seed(7)
    }

    fn build(points: &[Vec<f32>]) -> (VectorStore, HnswGraph) {
        let dim = points[0].len();
        let mut store = VectorStore::new(dim);
        let mut graph = HnswGraph::new(DistanceMetric::Euclidean, make_params());
        for (i, p) in points.iter().enumerate() {
            let pos = store
                .add(format!("v{}", i), Vector::new(p.clone()), Metadata::new())
                .unwrap();
            graph.insert(&store, pos);
        }
        (store, graph)
    }

    fn grid(n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| vec![(i % 10) as f32, (i / 10) as f32, ((i * 7) % 13) as f32 * 0.1])
            .collect()
    }

    #[test]
    fn test_insert_single() {
        let (_, graph) = build(&[vec![1.0, 0.0, 0.0]]);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.entry_point(), Some(0));
    }

    #[test]
    fn test_self_search() {
        let points = grid(100);
        let (store, graph) = build(&points);

        // Search for each inserted vector; the top result should be itself (distance ~0)
        for (i, p) in points.iter().enumerate() {
            let results = graph.search_pool(&store, p, 32);
            assert!(!results.is_empty(), "No results for vector {}", i);
            assert!(
                results[0].distance < 1e-5,
                "Self-search for {} returned distance {} (position={})",
                i,
                results[0].distance,
                results[0].position
            );
        }
    }

    #[test]
    fn test_neighbor_caps_and_layers() {
        let (store, graph) = build(&grid(200));
        let params = graph.params().clone();
        for pos in 0..store.slot_count() {
            let level = graph.level(pos).unwrap();
            for layer in 0..=level {
                let links = graph.links(pos, layer);
                assert!(links.len() <= params.max_links(layer));
                for &n in links {
                    assert!(graph.level(n).unwrap() >= layer);
                }
                // ascending by distance to the node
                let base = store.vector(pos);
                let dists: Vec<f32> = links
                    .iter()
                    .map(|&n| DistanceMetric::Euclidean.distance(base, store.vector(n)))
                    .collect();
                assert!(dists.windows(2).all(|w| w[0] <= w[1]));
            }
            assert!(graph.links(pos, level + 1).is_empty());
        }
        let ep = graph.entry_point().unwrap();
        assert_eq!(graph.level(ep), Some(graph.max_level()));
    }

    #[test]
    fn test_remove_hides_node_but_keeps_edges() {
        let (store, mut graph) = build(&grid(50));
        let before: Vec<usize> = graph.links(3, 0).to_vec();
        graph.remove(3);

        assert_eq!(graph.len(), 49);
        assert_eq!(graph.links(3, 0), before.as_slice());
        let results = graph.search_pool(&store, store.vector(3), 10);
        assert!(results.iter().all(|n| n.position != 3));
    }

    #[test]
    fn test_remove_entry_point_moves_it() {
        let (store, mut graph) = build(&grid(30));
        let ep = graph.entry_point().unwrap();
        graph.remove(ep);

        let new_ep = graph.entry_point().unwrap();
        assert_ne!(new_ep, ep);
        assert!(!graph.is_deleted(new_ep));
        assert_eq!(graph.level(new_ep), Some(graph.max_level()));
        assert!(!graph.search_pool(&store, &[0.0, 1.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_remove_all_then_insert() {
        let points = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let (mut store, mut graph) = build(&points);
        graph.remove(0);
        graph.remove(1);
        assert_eq!(graph.entry_point(), None);
        assert!(graph.search_pool(&store, &[1.0, 0.0], 5).is_empty());

        let pos = store.add("v2", Vector::new(vec![1.0, 1.0]), Metadata::new()).unwrap();
        graph.insert(&store, pos);
        assert_eq!(graph.entry_point(), Some(pos));
        assert_eq!(graph.search_pool(&store, &[1.0, 1.0], 5)[0].position, pos);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let (store, graph) = build(&grid(80));
        let restored = HnswGraph::from_snapshot(
            graph.to_snapshot(),
            DistanceMetric::Euclidean,
            make_params(),
            &store,
        )
        .unwrap();
        assert_eq!(restored.entry_point(), graph.entry_point());
        assert_eq!(restored.len(), graph.len());
        for pos in 0..store.slot_count() {
            assert_eq!(restored.links(pos, 0), graph.links(pos, 0));
        }
        let q = [2.5, 3.5, 0.3];
        let a: Vec<usize> = graph.search_pool(&store, &q, 10).iter().map(|n| n.position).collect();
        let b: Vec<usize> = restored.search_pool(&store, &q, 10).iter().map(|n| n.position).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot_rejects_overfull_list() {
        let (store, graph) = build(&grid(20));
        let mut snapshot = graph.to_snapshot();
        if let Some(Some(node)) = snapshot.nodes.get_mut(0) {
            node.neighbors[0] = (1..20).collect();
        }
        assert!(matches!(
            HnswGraph::from_snapshot(snapshot, DistanceMetric::Euclidean, make_params(), &store),
            Err(VectorDbError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_bad_entry_point() {
        let (store, graph) = build(&grid(20));
        let mut snapshot = graph.to_snapshot();
        snapshot.entry_point = Some(99);
        assert!(matches!(
            HnswGraph::from_snapshot(snapshot, DistanceMetric::Euclidean, make_params(), &store),
            Err(VectorDbError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_level_beyond_max_layers() {
        let (store, graph) = build(&grid(20));
        for level in [make_params().max_layers, usize::MAX] {
            let mut snapshot = graph.to_snapshot();
            if let Some(Some(node)) = snapshot.nodes.get_mut(3) {
                node.level = level;
            }
            assert!(matches!(
                HnswGraph::from_snapshot(snapshot, DistanceMetric::Euclidean, make_params(), &store),
                Err(VectorDbError::CorruptPersistedState(_))
            ));
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(HnswParams::default().validate().is_ok());
        assert!(HnswParams::new(1, 200, 50).validate().is_err());
        assert!(HnswParams::new(16, 0, 50).validate().is_err());
        assert!(HnswParams::new(16, 200, 0).validate().is_err());
        assert!(HnswParams::default().with_filter_oversample(0).validate().is_err());
    }
}
