//! Metadata predicates evaluated against a single record.
//!
//! A filter is a conjunction of clauses, one or more per metadata key.
//! The JSON form maps a key either to a literal (equality) or to an
//! operator object using `$gt`, `$gte`, `$lt`, `$lte`, `$ne` or `$in`:
//!
//! ```json
//! { "category": { "$in": ["A", "B"] }, "score": { "$gt": 0.9 } }
//! ```
//!
//! There is no OR/NOT. Evaluation never fails: a missing key or a value of
//! the wrong type simply excludes the record (except `$ne` on a missing key,
//! which matches).

use crate::error::{Result, VectorDbError};
use crate::metadata::{Metadata, MetadataValue};
use serde_json::Value;
use std::cmp::Ordering;

/// A single comparison applied to one metadata key.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(MetadataValue),
    Ne(MetadataValue),
    Gt(MetadataValue),
    Gte(MetadataValue),
    Lt(MetadataValue),
    Lte(MetadataValue),
    In(Vec<MetadataValue>),
}

impl Condition {
    fn parse_operator(op: &str, operand: &Value) -> Result<Self> {
        if op == "$in" {
            let items = operand.as_array().ok_or_else(|| {
                VectorDbError::InvalidFilterOperator("$in expects a list of literals".to_string())
            })?;
            let values = items.iter().map(literal).collect::<Result<Vec<_>>>()?;
            return Ok(Condition::In(values));
        }

        let value = literal(operand)?;
        match op {
            "$gt" => Ok(Condition::Gt(value)),
            "$gte" => Ok(Condition::Gte(value)),
            "$lt" => Ok(Condition::Lt(value)),
            "$lte" => Ok(Condition::Lte(value)),
            "$ne" => Ok(Condition::Ne(value)),
            other => Err(VectorDbError::InvalidFilterOperator(other.to_string())),
        }
    }

    /// Evaluate against the stored value for this key, `None` when absent.
    pub fn evaluate(&self, stored: Option<&MetadataValue>) -> bool {
        let stored = match stored {
            Some(v) => v,
            None => return matches!(self, Condition::Ne(_)),
        };

        match self {
            Condition::Eq(lit) => stored == lit,
            Condition::Ne(lit) => same_type(stored, lit) && stored != lit,
            Condition::Gt(lit) => order(stored, lit) == Some(Ordering::Greater),
            Condition::Gte(lit) => matches!(
                order(stored, lit),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Condition::Lt(lit) => order(stored, lit) == Some(Ordering::Less),
            Condition::Lte(lit) => {
                matches!(order(stored, lit), Some(Ordering::Less | Ordering::Equal))
            }
            Condition::In(list) => list.iter().any(|lit| stored == lit),
        }
    }
}

fn literal(value: &Value) -> Result<MetadataValue> {
    MetadataValue::from_json(value).ok_or_else(|| {
        VectorDbError::InvalidFilterOperator(format!("unsupported literal {}", value))
    })
}

fn same_type(a: &MetadataValue, b: &MetadataValue) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Ordering for range operators. Only number/number and string/string
/// pairs are ordered; anything else fails closed.
fn order(stored: &MetadataValue, lit: &MetadataValue) -> Option<Ordering> {
    match (stored, lit) {
        (MetadataValue::Number(a), MetadataValue::Number(b)) => a.partial_cmp(b),
        (MetadataValue::String(a), MetadataValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// A conjunction of per-key conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON predicate form.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            VectorDbError::InvalidFilterOperator("filter must be a JSON object".to_string())
        })?;

        let mut filter = Filter::new();
        for (key, spec) in object {
            match spec {
                Value::Object(ops) => {
                    if ops.is_empty() {
                        return Err(VectorDbError::InvalidFilterOperator(format!(
                            "empty operator object for {:?}",
                            key
                        )));
                    }
                    for (op, operand) in ops {
                        let condition = Condition::parse_operator(op, operand)?;
                        filter.clauses.push((key.clone(), condition));
                    }
                }
                other => {
                    let value = literal(other)?;
                    filter.clauses.push((key.clone(), Condition::Eq(value)));
                }
            }
        }
        Ok(filter)
    }

    /// Parse a JSON predicate from text.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| VectorDbError::InvalidFilterOperator(e.to_string()))?;
        Self::from_json(&value)
    }

    pub fn with(mut self, key: impl Into<String>, condition: Condition) -> Self {
        self.clauses.push((key.into(), condition));
        self
    }

    pub fn eq(self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(key, Condition::Eq(value.into()))
    }

    pub fn ne(self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(key, Condition::Ne(value.into()))
    }

    pub fn gt(self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(key, Condition::Gt(value.into()))
    }

    pub fn gte(self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(key, Condition::Gte(value.into()))
    }

    pub fn lt(self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(key, Condition::Lt(value.into()))
    }

    pub fn lte(self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.with(key, Condition::Lte(value.into()))
    }

    pub fn is_in<V: Into<MetadataValue>>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.with(key, Condition::In(values))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when every clause holds for `metadata`.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.clauses
            .iter()
            .all(|(key, condition)| condition.evaluate(metadata.get(key)))
    }
}
