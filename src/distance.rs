//! Distance metrics for vector similarity
//!
//! Every metric is expressed as a distance where smaller means closer, so
//! both indexes can share one min-ordering: cosine becomes `1 - similarity`
//! and dot product is negated.

use crate::error::VectorDbError;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance reported for cosine when either side has zero norm.
pub const COSINE_MAX_DISTANCE: f32 = 2.0;

/// Distance metrics for measuring vector similarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine similarity (converted to distance: 1 - similarity)
    #[default]
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
    /// Dot product (negated for minimum distance)
    Dot,
    /// Manhattan (L1) distance
    Manhattan,
}

impl DistanceMetric {
    /// Compute the distance between two equal-length slices using this metric.
    ///
    /// Lengths are validated by the caller; a mismatch is a logic error.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Dot => -dot_product(a, b),
            DistanceMetric::Manhattan => manhattan_distance(a, b),
        }
    }

    /// Distances from `query` to every row of `matrix`.
    ///
    /// Each row goes through [`DistanceMetric::distance`], so a record scores
    /// bit-identically whether it is read from the matrix or from the store.
    pub fn batch_distances(&self, matrix: ArrayView2<f32>, query: &[f32]) -> Array1<f32> {
        matrix
            .rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(row) => self.distance(row, query),
                None => self.distance(&row.to_vec(), query),
            })
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Dot => "dot",
            DistanceMetric::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "dot" | "dot_product" => Ok(DistanceMetric::Dot),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            other => Err(VectorDbError::InvalidMetric(other.to_string())),
        }
    }
}

/// Compute Euclidean (L2) distance between two vectors
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Compute Manhattan (L1) distance between two vectors
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Compute cosine distance between two vectors (1 - cosine similarity).
///
/// A zero-norm operand yields [`COSINE_MAX_DISTANCE`].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot_product(a, a).sqrt();
    let norm_b = dot_product(b, b).sqrt();
    cosine_from_parts(dot_product(a, b), norm_a, norm_b)
}

/// Compute dot product of two vectors
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn cosine_from_parts(dot: f32, norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return COSINE_MAX_DISTANCE;
    }
    // Clamp to [-1, 1] to handle floating point errors
    let similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    1.0 - similarity
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_euclidean_distance() {
        let dist = euclidean_distance(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_relative_eq!(dist, 5.196152, epsilon = 1e-5);
    }

    #[test]
    fn test_euclidean_same_vector() {
        let v = [1.0, 2.0, 3.0];
        assert_relative_eq!(euclidean_distance(&v, &v), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_manhattan_distance() {
        let dist = manhattan_distance(&[1.0, -2.0, 3.0], &[4.0, 5.0, 3.0]);
        assert_relative_eq!(dist, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dot_metric_is_negated() {
        let dist = DistanceMetric::Dot.distance(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_relative_eq!(dist, -32.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_maximally_dissimilar() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), COSINE_MAX_DISTANCE);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 0.0]), COSINE_MAX_DISTANCE);
    }

    #[test]
    fn test_symmetry() {
        let a = [0.3, -1.2, 4.0];
        let b = [2.5, 0.1, -0.7];
        for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan] {
            assert_eq!(metric.distance(&a, &b), metric.distance(&b, &a));
        }
    }

    #[test]
    fn test_batch_matches_scalar() {
        let matrix = arr2(&[
            [1.0f32, 2.0, 3.0, 0.1, -0.7, 5.5, 0.33, 1.9, -2.25],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [-1.0, 0.5, 2.0, 0.013, 7.1, -0.6, 0.29, 3.3, 0.41],
        ]);
        let query = [0.5f32, -1.0, 2.0, 0.77, 0.1, -3.2, 1.01, 0.6, 0.07];
        for metric in [
            DistanceMetric::Cosine,
            DistanceMetric::Euclidean,
            DistanceMetric::Dot,
            DistanceMetric::Manhattan,
        ] {
            let batch = metric.batch_distances(matrix.view(), &query);
            for (row, &d) in matrix.rows().into_iter().zip(batch.iter()) {
                assert_eq!(d, metric.distance(&row.to_vec(), &query));
            }
        }
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("Cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!("l2".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert_eq!("manhattan".parse::<DistanceMetric>().unwrap(), DistanceMetric::Manhattan);
        assert!(matches!(
            "hamming".parse::<DistanceMetric>(),
            Err(VectorDbError::InvalidMetric(_))
        ));
    }
}
