//! In-memory record storage.
//!
//! Records live in slots addressed by a dense internal position; vectors are
//! kept in one contiguous `f32` buffer with a stride of `dimension`. A delete
//! only sets the slot's tombstone. Slots are physically purged by
//! [`VectorStore::compact`], which is what index rebuilds use.

use crate::error::{Result, VectorDbError};
use crate::metadata::Metadata;
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Slot {
    id: String,
    metadata: Metadata,
    tombstone: bool,
}

/// Borrowed view of a live record.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    pub id: &'a str,
    pub vector: &'a [f32],
    pub metadata: &'a Metadata,
}

/// What an update did to the record's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Only metadata changed; the record kept its position.
    InPlace { position: usize },
    /// The vector changed; the record moved and the old slot is a tombstone.
    Relocated { old: usize, new: usize },
}

/// Serializable form of one slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
    pub tombstone: bool,
}

/// Serializable form of the whole store, in position order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub dimension: usize,
    pub records: Vec<SerializedRecord>,
}

/// Owns every record of a collection.
#[derive(Debug, Clone)]
pub struct VectorStore {
    dimension: usize,
    slots: Vec<Slot>,
    /// `slots.len() * dimension` floats
    data: Vec<f32>,
    /// id -> newest position holding it (live or tombstoned)
    positions: HashMap<String, usize>,
    live: usize,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            slots: Vec::new(),
            data: Vec::new(),
            positions: HashMap::new(),
            live: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, live or not. Positions are `0..slot_count()`.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn tombstoned_count(&self) -> usize {
        self.slots.len() - self.live
    }

    /// Validate an insert without performing it.
    pub fn check_add(&self, id: &str, vector: &Vector) -> Result<()> {
        vector.validate(self.dimension)?;
        if self.positions.contains_key(id) {
            return Err(VectorDbError::DuplicateId { id: id.to_string() });
        }
        Ok(())
    }

    /// Insert a new record and return its position.
    ///
    /// Fails with `DuplicateId` while the id is live or tombstoned; a
    /// tombstoned id becomes reusable only after [`compact`](Self::compact).
    pub fn add(&mut self, id: impl Into<String>, vector: Vector, metadata: Metadata) -> Result<usize> {
        let id = id.into();
        self.check_add(&id, &vector)?;
        let position = self.push_slot(id.clone(), vector.as_slice(), metadata);
        self.positions.insert(id, position);
        self.live += 1;
        Ok(position)
    }

    fn push_slot(&mut self, id: String, vector: &[f32], metadata: Metadata) -> usize {
        let position = self.slots.len();
        self.data.extend_from_slice(vector);
        self.slots.push(Slot {
            id,
            metadata,
            tombstone: false,
        });
        position
    }

    /// Position of a live record.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions
            .get(id)
            .copied()
            .filter(|&pos| !self.slots[pos].tombstone)
    }

    fn live_position(&self, id: &str) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| VectorDbError::UnknownId { id: id.to_string() })
    }

    pub fn exists(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Result<RecordRef<'_>> {
        let position = self.live_position(id)?;
        Ok(self.record(position))
    }

    /// Replace the vector and/or metadata of a live record.
    pub fn update(
        &mut self,
        id: &str,
        vector: Option<Vector>,
        metadata: Option<Metadata>,
    ) -> Result<UpdateOutcome> {
        let position = self.live_position(id)?;
        if let Some(v) = &vector {
            v.validate(self.dimension)?;
        }

        match vector {
            None => {
                if let Some(metadata) = metadata {
                    self.slots[position].metadata = metadata;
                }
                Ok(UpdateOutcome::InPlace { position })
            }
            Some(vector) => {
                let metadata = metadata.unwrap_or_else(|| self.slots[position].metadata.clone());
                self.slots[position].tombstone = true;
                let new = self.push_slot(id.to_string(), vector.as_slice(), metadata);
                self.positions.insert(id.to_string(), new);
                Ok(UpdateOutcome::Relocated { old: position, new })
            }
        }
    }

    /// Tombstone a live record and return its position.
    pub fn delete(&mut self, id: &str) -> Result<usize> {
        let position = self.live_position(id)?;
        self.slots[position].tombstone = true;
        self.live -= 1;
        Ok(position)
    }

    pub fn is_live(&self, position: usize) -> bool {
        self.slots.get(position).is_some_and(|s| !s.tombstone)
    }

    /// Vector at `position`. Panics on an out-of-range position.
    pub fn vector(&self, position: usize) -> &[f32] {
        let start = position * self.dimension;
        &self.data[start..start + self.dimension]
    }

    pub fn id_at(&self, position: usize) -> &str {
        &self.slots[position].id
    }

    pub fn metadata_at(&self, position: usize) -> &Metadata {
        &self.slots[position].metadata
    }

    pub fn record(&self, position: usize) -> RecordRef<'_> {
        let slot = &self.slots[position];
        RecordRef {
            id: &slot.id,
            vector: self.vector(position),
            metadata: &slot.metadata,
        }
    }

    /// Positions of live records in ascending position order.
    pub fn live_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.tombstone)
            .map(|(pos, _)| pos)
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .live_positions()
            .map(|pos| self.slots[pos].id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Purge tombstones and reassign positions `0..len()` in ascending id order.
    pub fn compact(&mut self) {
        let mut order: Vec<usize> = self.live_positions().collect();
        order.sort_by(|&a, &b| self.slots[a].id.cmp(&self.slots[b].id));

        let mut compacted = VectorStore::new(self.dimension);
        for pos in order {
            let slot = &self.slots[pos];
            let new = compacted.push_slot(slot.id.clone(), self.vector(pos), slot.metadata.clone());
            compacted.positions.insert(slot.id.clone(), new);
            compacted.live += 1;
        }
        *self = compacted;
    }

    pub fn to_snapshot(&self) -> StoreSnapshot {
        let records = self
            .slots
            .iter()
            .enumerate()
            .map(|(pos, slot)| SerializedRecord {
                id: slot.id.clone(),
                vector: self.vector(pos).to_vec(),
                metadata: slot.metadata.clone(),
                tombstone: slot.tombstone,
            })
            .collect();
        StoreSnapshot {
            dimension: self.dimension,
            records,
        }
    }

    /// Rebuild a store from a snapshot, keeping every position.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let mut store = VectorStore::new(snapshot.dimension);
        for (pos, record) in snapshot.records.into_iter().enumerate() {
            if record.vector.len() != store.dimension {
                return Err(VectorDbError::corrupt(format!(
                    "record at position {} has {} components, expected {}",
                    pos,
                    record.vector.len(),
                    store.dimension
                )));
            }
            // A relocated record always sits after its tombstoned predecessor.
            if let Some(&previous) = store.positions.get(&record.id) {
                if !store.slots[previous].tombstone {
                    return Err(VectorDbError::corrupt(format!(
                        "id {:?} is live at positions {} and {}",
                        record.id, previous, pos
                    )));
                }
            }
            let new = store.push_slot(record.id.clone(), &record.vector, record.metadata);
            store.slots[new].tombstone = record.tombstone;
            store.positions.insert(record.id, new);
            if !record.tombstone {
                store.live += 1;
            }
        }
        Ok(store)
    }
}
