//! In-memory graph storage implementation
//!
//! Storage is arena-style: nodes and edges live in dense vectors indexed by
//! their identifiers, and each node keeps outgoing and incoming adjacency
//! lists of edge ids. Nothing is ever deleted once committed, so ids stay
//! stable for the lifetime of the store.
//!
//! Reads go through [`GraphStore::begin_read`], writes through
//! [`GraphStore::begin_write`]; see [`super::transaction`].

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyValue;
use super::transaction::{ReadTransaction, UndoEntry, WriteTransaction};
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use crate::index::{ConstraintKey, ConstraintManager, UniqueIndex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    UnknownVertex(NodeId),

    #[error("Edge {0} not found")]
    UnknownEdge(EdgeId),

    #[error("Constraint violation: {label}.{property} = {value} already held by {existing}")]
    ConstraintViolation {
        label: Label,
        property: String,
        value: PropertyValue,
        existing: NodeId,
    },

    #[error("Transaction aborted: {reason}")]
    TransactionAborted { reason: String },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Store-level tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Largest number of mutations a single write transaction may commit.
    /// `None` means unbounded.
    #[serde(default)]
    pub max_transaction_size: Option<usize>,
}

/// Snapshot of store contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_label: BTreeMap<String, usize>,
    pub edges_by_type: BTreeMap<String, usize>,
    pub constraint_count: usize,
    pub committed_transactions: u64,
}

const NO_EDGES: &[EdgeId] = &[];

/// In-memory graph storage
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node arena: NodeId -> Node
    nodes: Vec<Node>,

    /// Edge arena: EdgeId -> Edge
    edges: Vec<Edge>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: Vec<Vec<EdgeId>>,

    /// Incoming edges for each node (adjacency list)
    incoming: Vec<Vec<EdgeId>>,

    /// Label -> nodes, in creation order
    label_index: FxHashMap<Label, Vec<NodeId>>,

    /// Edge type -> number of edges
    edge_type_counts: FxHashMap<EdgeType, usize>,

    /// Uniqueness constraints
    constraints: ConstraintManager,

    config: StoreConfig,

    committed_transactions: u64,

    open_readers: AtomicUsize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        GraphStore {
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open a write transaction
    ///
    /// The exclusive borrow rules out concurrent writers and readers for the
    /// transaction's lifetime.
    pub fn begin_write(&mut self) -> WriteTransaction<'_> {
        WriteTransaction::new(self)
    }

    /// Open a read transaction; any number may coexist
    pub fn begin_read(&self) -> ReadTransaction<'_> {
        self.open_readers.fetch_add(1, Ordering::AcqRel);
        ReadTransaction::new(self)
    }

    /// Number of read transactions currently open
    pub fn open_readers(&self) -> usize {
        self.open_readers.load(Ordering::Acquire)
    }

    pub(crate) fn release_reader(&self) {
        self.open_readers.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn record_commit(&mut self) {
        self.committed_transactions += 1;
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Lazily enumerate the edges incident to `node`
    ///
    /// `edge_type = None` matches every type. An unknown node yields an empty
    /// sequence. Callers must not rely on the enumeration order.
    pub fn edges<'a, 't>(
        &'a self,
        node: NodeId,
        direction: Direction,
        edge_type: Option<&'t EdgeType>,
    ) -> Edges<'a, 't> {
        let out = self.outgoing.get(node.index()).map_or(NO_EDGES, Vec::as_slice);
        let inc = self.incoming.get(node.index()).map_or(NO_EDGES, Vec::as_slice);
        let (first, second) = match direction {
            Direction::Outgoing => (out, NO_EDGES),
            Direction::Incoming => (inc, NO_EDGES),
            Direction::Both => (out, inc),
        };
        Edges {
            store: self,
            first: first.iter(),
            second: second.iter(),
            edge_type,
        }
    }

    /// Number of edges incident to `node` in `direction`, regardless of type
    pub fn degree(&self, node: NodeId, direction: Direction) -> usize {
        let out = self.outgoing.get(node.index()).map_or(0, Vec::len);
        let inc = self.incoming.get(node.index()).map_or(0, Vec::len);
        match direction {
            Direction::Outgoing => out,
            Direction::Incoming => inc,
            Direction::Both => out + inc,
        }
    }

    /// Nodes carrying `label`, in creation order
    pub fn nodes_with_label(&self, label: &Label) -> &[NodeId] {
        self.label_index.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count_nodes_by_label(&self, label: &Label) -> usize {
        self.nodes_with_label(label).len()
    }

    pub fn count_edges_by_type(&self, edge_type: &EdgeType) -> usize {
        self.edge_type_counts.get(edge_type).copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges in id order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Find the node holding `value` under a uniqueness constraint
    ///
    /// Returns `None` when no constraint is declared on (label, property).
    pub fn find_node(&self, label: &Label, property: &str, value: &PropertyValue) -> Option<NodeId> {
        self.constraints.find(label, property, value)
    }

    pub fn has_constraint(&self, label: &Label, property: &str) -> bool {
        self.constraints.has_constraint(label, property)
    }

    pub fn has_constraint_on_label(&self, label: &Label) -> bool {
        self.constraints.has_constraint_on_label(label)
    }

    pub fn constraints(&self) -> Vec<ConstraintKey> {
        self.constraints.constraints()
    }

    pub fn committed_transactions(&self) -> u64 {
        self.committed_transactions
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            nodes_by_label: self
                .label_index
                .iter()
                .filter(|(_, ids)| !ids.is_empty())
                .map(|(label, ids)| (label.to_string(), ids.len()))
                .collect(),
            edges_by_type: self
                .edge_type_counts
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(edge_type, count)| (edge_type.to_string(), *count))
                .collect(),
            constraint_count: self.constraints.len(),
            committed_transactions: self.committed_transactions,
        }
    }

    /// Release all storage
    pub fn close(self) -> GraphStatistics {
        let stats = self.statistics();
        info!(
            "Closing graph store: {} nodes, {} edges, {} transactions",
            stats.node_count, stats.edge_count, stats.committed_transactions
        );
        stats
    }

    // ============================================================
    // Mutations (driven by WriteTransaction, each returns its undo entry)
    // ============================================================

    pub(crate) fn create_node(&mut self, label: Label) -> (NodeId, UndoEntry) {
        let node_id = NodeId::new(self.nodes.len() as u64);
        self.label_index.entry(label.clone()).or_default().push(node_id);
        self.nodes.push(Node::new(node_id, label));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        (node_id, UndoEntry::CreateNode(node_id))
    }

    pub(crate) fn set_node_property(
        &mut self,
        node_id: NodeId,
        key: String,
        value: PropertyValue,
    ) -> GraphResult<UndoEntry> {
        let node = self
            .nodes
            .get_mut(node_id.index())
            .ok_or(GraphError::UnknownVertex(node_id))?;

        if let Some(existing) = self.constraints.conflict(&node.label, &key, &value, node_id) {
            return Err(GraphError::ConstraintViolation {
                label: node.label.clone(),
                property: key,
                value,
                existing,
            });
        }

        let old = node.set_property(key.clone(), value.clone());
        self.constraints
            .on_property_changed(&node.label, &key, old.as_ref(), Some(&value), node_id);
        Ok(UndoEntry::SetNodeProperty { node_id, key, old })
    }

    pub(crate) fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: EdgeType,
    ) -> GraphResult<(EdgeId, UndoEntry)> {
        if !self.has_node(source) {
            return Err(GraphError::UnknownVertex(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::UnknownVertex(target));
        }

        let edge_id = EdgeId::new(self.edges.len() as u64);
        *self.edge_type_counts.entry(edge_type.clone()).or_insert(0) += 1;
        self.outgoing[source.index()].push(edge_id);
        self.incoming[target.index()].push(edge_id);
        self.edges.push(Edge::new(edge_id, source, target, edge_type));
        Ok((edge_id, UndoEntry::CreateEdge(edge_id)))
    }

    pub(crate) fn set_edge_property(
        &mut self,
        edge_id: EdgeId,
        key: String,
        value: PropertyValue,
    ) -> GraphResult<UndoEntry> {
        let edge = self
            .edges
            .get_mut(edge_id.index())
            .ok_or(GraphError::UnknownEdge(edge_id))?;
        let old = edge.set_property(key.clone(), value);
        Ok(UndoEntry::SetEdgeProperty { edge_id, key, old })
    }

    /// Declare a uniqueness constraint, indexing existing nodes
    ///
    /// Returns `None` if the constraint already exists.
    pub(crate) fn create_unique_constraint(
        &mut self,
        label: Label,
        property: String,
    ) -> GraphResult<Option<UndoEntry>> {
        if self.constraints.has_constraint(&label, &property) {
            return Ok(None);
        }

        let mut index = UniqueIndex::new();
        for &node_id in self.nodes_with_label(&label) {
            if let Some(value) = self.nodes[node_id.index()].get_property(&property) {
                index.insert(value, node_id).map_err(|existing| {
                    GraphError::ConstraintViolation {
                        label: label.clone(),
                        property: property.clone(),
                        value: value.clone(),
                        existing,
                    }
                })?;
            }
        }

        let key = ConstraintKey::new(label, property);
        self.constraints.install(key.clone(), index);
        Ok(Some(UndoEntry::CreateConstraint(key)))
    }

    /// Reverse one mutation
    ///
    /// Entries must be undone in reverse order of application, so a created
    /// node or edge is always the last one in its arena and adjacency lists.
    pub(crate) fn undo(&mut self, entry: UndoEntry) {
        match entry {
            UndoEntry::CreateNode(node_id) => {
                if let Some(node) = self.nodes.pop() {
                    debug_assert_eq!(node.id, node_id);
                    self.outgoing.pop();
                    self.incoming.pop();
                    if let Some(ids) = self.label_index.get_mut(&node.label) {
                        ids.pop();
                        if ids.is_empty() {
                            self.label_index.remove(&node.label);
                        }
                    }
                }
            }
            UndoEntry::SetNodeProperty { node_id, key, old } => {
                if let Some(node) = self.nodes.get_mut(node_id.index()) {
                    let current = match &old {
                        Some(value) => node.set_property(key.clone(), value.clone()),
                        None => node.remove_property(&key),
                    };
                    self.constraints.on_property_changed(
                        &node.label,
                        &key,
                        current.as_ref(),
                        old.as_ref(),
                        node_id,
                    );
                }
            }
            UndoEntry::CreateEdge(edge_id) => {
                if let Some(edge) = self.edges.pop() {
                    debug_assert_eq!(edge.id, edge_id);
                    self.outgoing[edge.source.index()].pop();
                    self.incoming[edge.target.index()].pop();
                    if let Some(count) = self.edge_type_counts.get_mut(&edge.edge_type) {
                        *count -= 1;
                        if *count == 0 {
                            self.edge_type_counts.remove(&edge.edge_type);
                        }
                    }
                }
            }
            UndoEntry::SetEdgeProperty { edge_id, key, old } => {
                if let Some(edge) = self.edges.get_mut(edge_id.index()) {
                    match old {
                        Some(value) => {
                            edge.set_property(key, value);
                        }
                        None => {
                            edge.remove_property(&key);
                        }
                    }
                }
            }
            UndoEntry::CreateConstraint(key) => {
                self.constraints.drop_constraint(&key);
            }
        }
    }
}

/// Lazy sequence of edges incident to one node
pub struct Edges<'a, 't> {
    store: &'a GraphStore,
    first: std::slice::Iter<'a, EdgeId>,
    second: std::slice::Iter<'a, EdgeId>,
    edge_type: Option<&'t EdgeType>,
}

impl<'a, 't> Iterator for Edges<'a, 't> {
    type Item = &'a Edge;

    fn next(&mut self) -> Option<&'a Edge> {
        loop {
            let id = match self.first.next() {
                Some(id) => id,
                None => self.second.next()?,
            };
            let edge = &self.store.edges[id.index()];
            if self.edge_type.map_or(true, |t| &edge.edge_type == t) {
                return Some(edge);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.first.len() + self.second.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn likes() -> EdgeType {
        EdgeType::new("LIKES")
    }

    #[test]
    fn test_create_and_get_node() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let node_id = tx.create_node("Person");
        tx.commit().unwrap();

        assert_eq!(store.node_count(), 1);
        let node = store.get_node(node_id).unwrap();
        assert_eq!(node.id, node_id);
        assert!(node.has_label(&Label::new("Person")));
    }

    #[test]
    fn test_ids_are_dense() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let a = tx.create_node("Item");
        let b = tx.create_node("Person");
        let c = tx.create_node("Item");
        tx.commit().unwrap();

        assert_eq!((a.as_u64(), b.as_u64(), c.as_u64()), (0, 1, 2));
        assert_eq!(store.nodes_with_label(&Label::new("Item")), &[a, c]);
    }

    #[test]
    fn test_edge_validation() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let node1 = tx.create_node("Person");
        let invalid = NodeId::new(999);

        assert_eq!(
            tx.create_edge(invalid, node1, likes()),
            Err(GraphError::UnknownVertex(invalid))
        );
        assert_eq!(
            tx.create_edge(node1, invalid, likes()),
            Err(GraphError::UnknownVertex(invalid))
        );
    }

    #[test]
    fn test_adjacency_by_direction_and_type() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let p = tx.create_node("Person");
        let i1 = tx.create_node("Item");
        let i2 = tx.create_node("Item");
        tx.create_edge(p, i1, likes()).unwrap();
        tx.create_edge(p, i2, likes()).unwrap();
        tx.create_edge(p, i2, "VIEWED").unwrap();
        tx.commit().unwrap();

        let lk = likes();
        assert_eq!(store.edges(p, Direction::Outgoing, Some(&lk)).count(), 2);
        assert_eq!(store.edges(p, Direction::Outgoing, None).count(), 3);
        assert_eq!(store.edges(p, Direction::Incoming, Some(&lk)).count(), 0);
        assert_eq!(store.edges(i2, Direction::Incoming, Some(&lk)).count(), 1);
        assert_eq!(store.edges(i2, Direction::Both, None).count(), 2);
        assert_eq!(store.degree(p, Direction::Outgoing), 3);
        assert_eq!(store.edges(NodeId::new(42), Direction::Both, None).count(), 0);
    }

    #[test]
    fn test_edges_iterator_is_restartable() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let p = tx.create_node("Person");
        let i = tx.create_node("Item");
        for _ in 0..3 {
            tx.create_edge(p, i, likes()).unwrap();
        }
        tx.commit().unwrap();

        let lk = likes();
        let first: Vec<EdgeId> = store.edges(p, Direction::Outgoing, Some(&lk)).map(|e| e.id).collect();
        let second: Vec<EdgeId> = store.edges(p, Direction::Outgoing, Some(&lk)).map(|e| e.id).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_self_loop_appears_twice_in_both() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let n = tx.create_node("Person");
        tx.create_edge(n, n, likes()).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.edges(n, Direction::Both, None).count(), 2);
    }

    #[test]
    fn test_statistics() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let p = tx.create_node("Person");
        let i = tx.create_node("Item");
        tx.create_edge(p, i, likes()).unwrap();
        tx.create_unique_constraint("Item", "id").unwrap();
        tx.commit().unwrap();

        let stats = store.statistics();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.nodes_by_label.get("Person"), Some(&1));
        assert_eq!(stats.edges_by_type.get("LIKES"), Some(&1));
        assert_eq!(stats.constraint_count, 1);
        assert_eq!(stats.committed_transactions, 1);
        assert_eq!(store.close(), stats);
    }

    #[test]
    fn test_constraint_on_existing_duplicates_fails() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        let a = tx.create_node("Item");
        let b = tx.create_node("Item");
        tx.set_node_property(a, "id", 1i64).unwrap();
        tx.set_node_property(b, "id", 1i64).unwrap();
        let err = tx.create_unique_constraint("Item", "id").unwrap_err();
        assert!(matches!(err, GraphError::ConstraintViolation { existing, .. } if existing == a));
    }

    #[test]
    fn test_find_node_through_constraint() {
        let mut store = GraphStore::new();
        let mut tx = store.begin_write();
        tx.create_unique_constraint("Item", "id").unwrap();
        let item = tx.create_node("Item");
        tx.set_node_property(item, "id", 9i64).unwrap();
        tx.commit().unwrap();

        let label = Label::new("Item");
        assert_eq!(store.find_node(&label, "id", &PropertyValue::Integer(9)), Some(item));
        assert_eq!(store.find_node(&label, "id", &PropertyValue::Integer(8)), None);
        assert_eq!(store.find_node(&Label::new("Person"), "id", &PropertyValue::Integer(9)), None);
    }
}
