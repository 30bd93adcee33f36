//! Vector type and operations

use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A vector in n-dimensional space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from a Vec<f32>
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Compute the L2 norm (magnitude) of the vector
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Check that the vector has exactly `dimension` finite components.
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if self.dimension() != dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: dimension,
                actual: self.dimension(),
            });
        }
        if let Some(pos) = self.data.iter().position(|x| !x.is_finite()) {
            return Err(VectorDbError::InvalidVector {
                reason: format!("component {} is not finite", pos),
            });
        }
        Ok(())
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

impl From<&[f32]> for Vector {
    fn from(data: &[f32]) -> Self {
        Vector::new(data.to_vec())
    }
}

/// Parse a vector from a comma-separated string
impl FromStr for Vector {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        let data: Result<Vec<f32>> = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f32>()
                    .map_err(|_| VectorDbError::InvalidVector {
                        reason: format!("Invalid float: {}", x),
                    })
            })
            .collect();
        Ok(Vector::new(data?))
    }
}
