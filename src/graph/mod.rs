//! Core graph store
//!
//! This module implements the property graph data model with:
//! - Nodes with a single label and properties
//! - Directed, typed edges with properties
//! - Multiple edges between the same nodes
//! - In-memory arena storage with adjacency lists and a label index
//! - Atomic write transactions and counted read transactions

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod transaction;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{Edges, GraphError, GraphResult, GraphStatistics, GraphStore, StoreConfig};
pub use transaction::{ReadTransaction, WriteTransaction};
pub use types::{Direction, EdgeId, EdgeType, Label, NodeId};
