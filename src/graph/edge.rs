//! Edge implementation for the property graph
//!
//! Edges are directed and typed. Several edges may connect the same
//! pair of nodes, even with the same type.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Type of relationship (e.g., "LIKES")
    pub edge_type: EdgeType,

    /// Properties associated with this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            properties: PropertyMap::default(),
        }
    }

    pub(crate) fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    pub(crate) fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Numeric property read; `None` when missing or not a number
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(PropertyValue::as_number)
    }

    /// Get number of properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_weight() {
        let mut edge = Edge::new(EdgeId::new(3), NodeId::new(1), NodeId::new(2), "LIKES");
        assert_eq!(edge.get_number("weight"), None);

        edge.set_property("weight", 4.5);
        assert_eq!(edge.get_number("weight"), Some(4.5));

        edge.set_property("weight", "heavy");
        assert_eq!(edge.get_number("weight"), None);

        edge.remove_property("weight");
        assert_eq!(edge.property_count(), 0);
    }

    #[test]
    fn test_parallel_edges_are_distinct() {
        let a = NodeId::new(100);
        let b = NodeId::new(200);
        let e1 = Edge::new(EdgeId::new(1), a, b, "LIKES");
        let e2 = Edge::new(EdgeId::new(2), a, b, "LIKES");
        assert_ne!(e1, e2);
        assert_eq!(e1.edge_type, e2.edge_type);
    }
}
