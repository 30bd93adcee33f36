//! Record metadata: a flat map of string keys to scalar values.

use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A scalar metadata value.
///
/// The set is closed on purpose so that filter comparisons can tell a type
/// mismatch apart from an ordinary inequality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl MetadataValue {
    /// Convert a JSON scalar. Objects, arrays and `null` have no counterpart.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(MetadataValue::String(s.clone())),
            Value::Number(n) => n.as_f64().map(MetadataValue::Number),
            Value::Bool(b) => Some(MetadataValue::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            MetadataValue::String(s) => Value::String(s.clone()),
            MetadataValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MetadataValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Number(value as f64)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        MetadataValue::Number(f64::from(value))
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Metadata associated with a vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Metadata {
    fields: HashMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build metadata from a JSON object whose values are all scalars.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| VectorDbError::InvalidMetadata("expected a JSON object".to_string()))?;
        let mut metadata = Metadata::new();
        for (key, raw) in object {
            let scalar = MetadataValue::from_json(raw).ok_or_else(|| {
                VectorDbError::InvalidMetadata(format!(
                    "value for {:?} must be a string, number or bool",
                    key
                ))
            })?;
            metadata.insert(key.clone(), scalar);
        }
        Ok(metadata)
    }

    pub fn to_json(&self) -> Value {
        let object: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(object)
    }
}
