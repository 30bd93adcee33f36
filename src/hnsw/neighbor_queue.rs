//! Priority queue utilities for HNSW. Handles f32 ordering for BinaryHeap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A candidate: internal position plus its distance to the current query.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub distance: f32,
    pub position: usize,
}

impl Neighbor {
    pub fn new(position: usize, distance: f32) -> Self {
        Self { distance, position }
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

// Default ordering: max-heap (largest distance on top).
// Ties fall back to the position so the order is total.
impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// A wrapper that reverses Neighbor ordering to create a min-heap.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Reversed(pub Neighbor);

impl PartialOrd for Reversed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reversed {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

/// Max-heap of neighbors (largest distance on top). Used as the result set bounded by ef.
#[derive(Debug, Default)]
pub struct MaxHeap {
    heap: BinaryHeap<Neighbor>,
}

impl MaxHeap {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Push and pop the max if size exceeds limit, keeping only the closest `limit` neighbors.
    pub fn push_bounded(&mut self, n: Neighbor, limit: usize) {
        self.heap.push(n);
        if self.heap.len() > limit {
            self.heap.pop();
        }
    }

    pub fn peek(&self) -> Option<&Neighbor> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into a sorted Vec (ascending by distance, then position).
    pub fn into_sorted_vec(self) -> Vec<Neighbor> {
        self.heap.into_sorted_vec()
    }
}

/// Min-heap of neighbors (smallest distance on top). Used as the candidate set.
#[derive(Debug, Default)]
pub struct MinHeap {
    heap: BinaryHeap<Reversed>,
}

impl MinHeap {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, n: Neighbor) {
        self.heap.push(Reversed(n));
    }

    pub fn pop(&mut self) -> Option<Neighbor> {
        self.heap.pop().map(|r| r.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_heap_ordering() {
        let mut heap = MinHeap::new();
        heap.push(Neighbor::new(0, 3.0));
        heap.push(Neighbor::new(1, 1.0));
        heap.push(Neighbor::new(2, 2.0));

        assert_eq!(heap.pop().unwrap().distance, 1.0);
        assert_eq!(heap.pop().unwrap().distance, 2.0);
        assert_eq!(heap.pop().unwrap().distance, 3.0);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_bounded_push_keeps_closest() {
        let mut heap = MaxHeap::new();
        heap.push_bounded(Neighbor::new(0, 5.0), 2);
        heap.push_bounded(Neighbor::new(1, 1.0), 2);
        heap.push_bounded(Neighbor::new(2, 3.0), 2);

        assert_eq!(heap.len(), 2);
        assert_eq!(heap.peek().unwrap().distance, 3.0);
        let sorted = heap.into_sorted_vec();
        assert_eq!(sorted[0].distance, 1.0);
        assert_eq!(sorted[1].distance, 3.0);
    }

    #[test]
    fn test_ties_break_on_position() {
        let mut heap = MaxHeap::new();
        heap.push_bounded(Neighbor::new(7, 1.0), 3);
        heap.push_bounded(Neighbor::new(2, 1.0), 3);
        heap.push_bounded(Neighbor::new(5, 1.0), 3);

        let positions: Vec<usize> = heap.into_sorted_vec().iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![2, 5, 7]);
    }
}
