//! Manager for uniqueness constraints
//!
//! Handles declaration, lookup and maintenance of the per-(label, property)
//! unique indices.

use super::unique_index::UniqueIndex;
use crate::graph::{Label, NodeId, PropertyValue};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key for identifying a uniqueness constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintKey {
    pub label: Label,
    pub property: String,
}

impl ConstraintKey {
    pub fn new(label: impl Into<Label>, property: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNIQUE {}.{}", self.label, self.property)
    }
}

/// Manager for all uniqueness constraints of a store
#[derive(Debug, Default)]
pub struct ConstraintManager {
    indices: FxHashMap<ConstraintKey, UniqueIndex>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a constraint exists
    pub fn has_constraint(&self, label: &Label, property: &str) -> bool {
        self.indices.contains_key(&ConstraintKey::new(label.clone(), property))
    }

    /// Check if any constraint is declared on `label`
    pub fn has_constraint_on_label(&self, label: &Label) -> bool {
        self.indices.keys().any(|key| &key.label == label)
    }

    /// Install a populated index under `key`
    pub(crate) fn install(&mut self, key: ConstraintKey, index: UniqueIndex) {
        self.indices.insert(key, index);
    }

    pub(crate) fn drop_constraint(&mut self, key: &ConstraintKey) -> Option<UniqueIndex> {
        self.indices.remove(key)
    }

    /// Owner of `value` under the constraint, if any
    pub fn find(&self, label: &Label, property: &str, value: &PropertyValue) -> Option<NodeId> {
        self.indices
            .get(&ConstraintKey::new(label.clone(), property))
            .and_then(|index| index.get(value))
    }

    /// Node that already holds `value`, if setting it on `node_id` would
    /// violate a constraint
    pub fn conflict(
        &self,
        label: &Label,
        property: &str,
        value: &PropertyValue,
        node_id: NodeId,
    ) -> Option<NodeId> {
        self.indices
            .get(&ConstraintKey::new(label.clone(), property))
            .and_then(|index| index.would_conflict(value, node_id))
    }

    /// Update the index after a property changed from `old` to `new`
    ///
    /// Callers check [`ConstraintManager::conflict`] first; a conflicting
    /// insert here leaves the previous owner in place.
    pub(crate) fn on_property_changed(
        &mut self,
        label: &Label,
        property: &str,
        old: Option<&PropertyValue>,
        new: Option<&PropertyValue>,
        node_id: NodeId,
    ) {
        let key = ConstraintKey::new(label.clone(), property);
        if let Some(index) = self.indices.get_mut(&key) {
            if let Some(old) = old {
                index.remove(old, node_id);
            }
            if let Some(new) = new {
                let _ = index.insert(new, node_id);
            }
        }
    }

    /// All declared constraints, sorted
    pub fn constraints(&self) -> Vec<ConstraintKey> {
        let mut keys: Vec<ConstraintKey> = self.indices.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
