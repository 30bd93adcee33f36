//! Brute-force index: exact O(n·d) k-NN search.
//!
//! Holds no structure beyond a dense copy of the live vectors taken at the
//! last rebuild. Records added after that rebuild always occupy higher
//! positions, so they are scanned straight from the store. Both paths score
//! with the same kernel.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ndarray::Array2;

use crate::config::IndexKind;
use crate::distance::DistanceMetric;
use crate::hnsw::Neighbor;
use crate::index::{Index, IndexStats, SearchRequest};
use crate::storage::VectorStore;

/// Heap entry ordered by distance, then id.
struct Ranked<'a> {
    distance: f32,
    id: &'a str,
    position: usize,
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(other.id))
    }
}

/// Bounded max-heap keeping the `k` best entries.
struct TopK<'a> {
    heap: BinaryHeap<Ranked<'a>>,
    k: usize,
}

impl<'a> TopK<'a> {
    /// `live` bounds the preallocation; `k` may exceed the collection size.
    fn new(k: usize, live: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k.min(live).saturating_add(1)),
            k,
        }
    }

    fn push(&mut self, store: &'a VectorStore, position: usize, distance: f32) {
        if self.k == 0 {
            return;
        }
        self.heap.push(Ranked {
            distance,
            id: store.id_at(position),
            position,
        });
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    fn into_neighbors(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|r| Neighbor::new(r.position, r.distance))
            .collect()
    }
}

/// Exact filtered scan over every live record of `store`.
pub fn exact_search(
    store: &VectorStore,
    metric: DistanceMetric,
    request: &SearchRequest<'_>,
) -> Vec<Neighbor> {
    let mut top = TopK::new(request.k, store.len());
    for position in store.live_positions() {
        if request.admits(store, position) {
            top.push(store, position, metric.distance(request.query, store.vector(position)));
        }
    }
    top.into_neighbors()
}

/// A flat (brute-force) index that computes distance to every live vector.
#[derive(Debug)]
pub struct BruteForceIndex {
    metric: DistanceMetric,
    /// One row per entry of `rows`.
    matrix: Array2<f32>,
    rows: Vec<usize>,
    /// Store slot count at the last rebuild.
    covered: usize,
}

impl BruteForceIndex {
    /// Create a new empty flat index with the given distance metric.
    pub fn new(metric: DistanceMetric, dimension: usize) -> Self {
        Self {
            metric,
            matrix: Array2::zeros((0, dimension)),
            rows: Vec::new(),
            covered: 0,
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl Index for BruteForceIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::BruteForce
    }

    // The store already reflects writes; new positions are picked up by the tail scan.
    fn insert(&mut self, _store: &VectorStore, _position: usize) {}

    fn remove(&mut self, _store: &VectorStore, _position: usize) {}

    fn search(&self, store: &VectorStore, request: &SearchRequest<'_>) -> Vec<Neighbor> {
        if request.k == 0 {
            return Vec::new();
        }
        let mut top = TopK::new(request.k, store.len());
        let tail = self.covered.min(store.slot_count())..store.slot_count();

        match request.filter {
            // Metadata checks are cheaper than distances, so filter first.
            Some(_) => {
                let positions = self.rows.iter().copied().chain(tail);
                for position in positions {
                    if store.is_live(position) && request.admits(store, position) {
                        let distance = self.metric.distance(request.query, store.vector(position));
                        top.push(store, position, distance);
                    }
                }
            }
            None => {
                if !self.rows.is_empty() {
                    let distances = self
                        .metric
                        .batch_distances(self.matrix.view(), request.query);
                    for (&position, &distance) in self.rows.iter().zip(distances.iter()) {
                        if store.is_live(position) {
                            top.push(store, position, distance);
                        }
                    }
                }
                for position in tail {
                    if store.is_live(position) {
                        let distance = self.metric.distance(request.query, store.vector(position));
                        top.push(store, position, distance);
                    }
                }
            }
        }

        top.into_neighbors()
    }

    fn rebuild(&mut self, store: &VectorStore) {
        let rows: Vec<usize> = store.live_positions().collect();
        let dimension = store.dimension();
        self.matrix = Array2::from_shape_fn((rows.len(), dimension), |(i, j)| {
            store.vector(rows[i])[j]
        });
        self.rows = rows;
        self.covered = store.slot_count();
    }

    fn stats(&self) -> IndexStats {
        IndexStats::BruteForce
    }
}
