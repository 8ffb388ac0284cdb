//! Hash index backing a uniqueness constraint
//!
//! Maps each indexed property value to the single node that holds it.

use crate::graph::{NodeId, PropertyValue};
use rustc_hash::FxHashMap;

/// Hashable projection of a [`PropertyValue`]
///
/// Floats are keyed by bit pattern, so `0.0` and `-0.0` are distinct keys.
/// `Null` is never indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    String(String),
    Integer(i64),
    Float(u64),
    Boolean(bool),
}

impl IndexKey {
    pub fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::String(s) => Some(IndexKey::String(s.clone())),
            PropertyValue::Integer(i) => Some(IndexKey::Integer(*i)),
            PropertyValue::Float(f) => Some(IndexKey::Float(f.to_bits())),
            PropertyValue::Boolean(b) => Some(IndexKey::Boolean(*b)),
            PropertyValue::Null => None,
        }
    }
}

/// Index for one (label, property) uniqueness constraint
#[derive(Debug, Clone, Default)]
pub struct UniqueIndex {
    entries: FxHashMap<IndexKey, NodeId>,
}

impl UniqueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `value` for `node_id`
    ///
    /// Returns the current owner as the error when another node already
    /// holds the value. Re-inserting the same (value, node) pair is a no-op.
    pub fn insert(&mut self, value: &PropertyValue, node_id: NodeId) -> Result<(), NodeId> {
        let Some(key) = IndexKey::from_value(value) else {
            return Ok(());
        };
        match self.entries.get(&key) {
            Some(&owner) if owner != node_id => Err(owner),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(key, node_id);
                Ok(())
            }
        }
    }

    /// Release `value` if it is held by `node_id`
    pub fn remove(&mut self, value: &PropertyValue, node_id: NodeId) {
        if let Some(key) = IndexKey::from_value(value) {
            if self.entries.get(&key) == Some(&node_id) {
                self.entries.remove(&key);
            }
        }
    }

    /// Check whether `value` could be claimed by `node_id`
    pub fn would_conflict(&self, value: &PropertyValue, node_id: NodeId) -> Option<NodeId> {
        let key = IndexKey::from_value(value)?;
        self.entries.get(&key).copied().filter(|&owner| owner != node_id)
    }

    pub fn get(&self, value: &PropertyValue) -> Option<NodeId> {
        IndexKey::from_value(value).and_then(|key| self.entries.get(&key).copied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
