//! Collection configuration.

use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::hnsw::HnswParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which index backs a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Hnsw,
    BruteForce,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Hnsw => f.write_str("hnsw"),
            IndexKind::BruteForce => f.write_str("brute_force"),
        }
    }
}

impl FromStr for IndexKind {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hnsw" => Ok(IndexKind::Hnsw),
            "brute_force" | "brute-force" | "flat" => Ok(IndexKind::BruteForce),
            other => Err(VectorDbError::invalid_parameter(
                "index_kind",
                format!("unknown index kind {:?}", other),
            )),
        }
    }
}

/// Index kind together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexConfig {
    Hnsw(HnswParams),
    BruteForce,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig::Hnsw(HnswParams::default())
    }
}

impl IndexConfig {
    pub fn kind(&self) -> IndexKind {
        match self {
            IndexConfig::Hnsw(_) => IndexKind::Hnsw,
            IndexConfig::BruteForce => IndexKind::BruteForce,
        }
    }

    /// Default parameters for `kind`.
    pub fn for_kind(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Hnsw => IndexConfig::Hnsw(HnswParams::default()),
            IndexKind::BruteForce => IndexConfig::BruteForce,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            IndexConfig::Hnsw(params) => params.validate(),
            IndexConfig::BruteForce => Ok(()),
        }
    }
}

/// Configuration fixed when a collection is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub dimension: usize,
    #[serde(default)]
    pub metric: DistanceMetric,
    #[serde(default)]
    pub index: IndexConfig,
}

impl CollectionConfig {
    /// Cosine metric and a default HNSW index.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            metric: DistanceMetric::default(),
            index: IndexConfig::default(),
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_hnsw(self, params: HnswParams) -> Self {
        self.with_index(IndexConfig::Hnsw(params))
    }

    pub fn brute_force(self) -> Self {
        self.with_index(IndexConfig::BruteForce)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorDbError::invalid_parameter(
                "dimension",
                "must be a positive integer",
            ));
        }
        self.index.validate()
    }

    /// Read a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: CollectionConfig = serde_json::from_slice(&bytes)
            .map_err(|e| VectorDbError::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
