//! Transaction scopes over the graph store
//!
//! A [`WriteTransaction`] holds the store exclusively and records an undo
//! entry for every mutation it applies. Commit discards the log; rollback
//! (explicit, on commit failure, or on drop) replays it backwards, so an
//! aborted transaction leaves exactly the previously committed state.
//!
//! A [`ReadTransaction`] is a shared handle. The store counts open readers
//! and the count is released on drop, whatever path the reader exits by.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyValue;
use super::store::{Edges, GraphError, GraphResult, GraphStore};
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use crate::index::ConstraintKey;
use tracing::{debug, warn};

/// One reversible mutation
#[derive(Debug, Clone)]
pub(crate) enum UndoEntry {
    CreateNode(NodeId),
    SetNodeProperty {
        node_id: NodeId,
        key: String,
        old: Option<PropertyValue>,
    },
    CreateEdge(EdgeId),
    SetEdgeProperty {
        edge_id: EdgeId,
        key: String,
        old: Option<PropertyValue>,
    },
    CreateConstraint(ConstraintKey),
}

/// Exclusive, atomic write scope
pub struct WriteTransaction<'s> {
    store: &'s mut GraphStore,
    undo_log: Vec<UndoEntry>,
    /// Set when a mutation failed; the transaction can then only roll back
    failure: Option<GraphError>,
    finished: bool,
}

impl<'s> WriteTransaction<'s> {
    pub(crate) fn new(store: &'s mut GraphStore) -> Self {
        WriteTransaction {
            store,
            undo_log: Vec::new(),
            failure: None,
            finished: false,
        }
    }

    /// Number of mutations applied so far
    pub fn mutation_count(&self) -> usize {
        self.undo_log.len()
    }

    /// Whether a failed mutation has marked this transaction rollback-only
    pub fn is_poisoned(&self) -> bool {
        self.failure.is_some()
    }

    fn track<T>(&mut self, result: GraphResult<T>) -> GraphResult<T> {
        if let Err(err) = &result {
            if self.failure.is_none() {
                self.failure = Some(err.clone());
            }
        }
        result
    }

    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        let (node_id, undo) = self.store.create_node(label.into());
        self.undo_log.push(undo);
        node_id
    }

    /// Create a node and set each property in order
    pub fn create_node_with_properties<K, V>(
        &mut self,
        label: impl Into<Label>,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> GraphResult<NodeId>
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let node_id = self.create_node(label);
        for (key, value) in properties {
            self.set_node_property(node_id, key, value)?;
        }
        Ok(node_id)
    }

    pub fn set_node_property(
        &mut self,
        node_id: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let result = self.store.set_node_property(node_id, key.into(), value.into());
        let undo = self.track(result)?;
        self.undo_log.push(undo);
        Ok(())
    }

    /// Create a directed edge; fails with `UnknownVertex` if either
    /// endpoint does not exist
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        let result = self.store.create_edge(source, target, edge_type.into());
        let (edge_id, undo) = self.track(result)?;
        self.undo_log.push(undo);
        Ok(edge_id)
    }

    pub fn set_edge_property(
        &mut self,
        edge_id: EdgeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let result = self.store.set_edge_property(edge_id, key.into(), value.into());
        let undo = self.track(result)?;
        self.undo_log.push(undo);
        Ok(())
    }

    /// Declare a uniqueness constraint on (label, property)
    ///
    /// Returns `false` without touching the schema if it already exists.
    pub fn create_unique_constraint(
        &mut self,
        label: impl Into<Label>,
        property: impl Into<String>,
    ) -> GraphResult<bool> {
        let result = self.store.create_unique_constraint(label.into(), property.into());
        match self.track(result)? {
            Some(undo) => {
                self.undo_log.push(undo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Reads see this transaction's own writes.

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.store.get_node(id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.store.get_edge(id)
    }

    pub fn has_constraint(&self, label: &Label, property: &str) -> bool {
        self.store.has_constraint(label, property)
    }

    pub fn has_constraint_on_label(&self, label: &Label) -> bool {
        self.store.has_constraint_on_label(label)
    }

    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    /// Make every mutation of this transaction durable in the store
    ///
    /// A poisoned transaction, or one holding more mutations than the
    /// store's `max_transaction_size`, is rolled back and reported as
    /// `TransactionAborted`.
    pub fn commit(mut self) -> GraphResult<()> {
        let abort_reason = if let Some(err) = &self.failure {
            Some(format!("rolled back after failed operation: {}", err))
        } else {
            match self.store.config().max_transaction_size {
                Some(max) if self.undo_log.len() > max => Some(format!(
                    "transaction holds {} mutations, limit is {}",
                    self.undo_log.len(),
                    max
                )),
                _ => None,
            }
        };

        if let Some(reason) = abort_reason {
            self.rollback_in_place();
            return Err(GraphError::TransactionAborted { reason });
        }

        debug!("Committed transaction with {} mutations", self.undo_log.len());
        self.undo_log.clear();
        self.store.record_commit();
        self.finished = true;
        Ok(())
    }

    /// Discard every mutation of this transaction
    pub fn rollback(mut self) {
        self.rollback_in_place();
    }

    fn rollback_in_place(&mut self) {
        if self.finished {
            return;
        }
        if !self.undo_log.is_empty() {
            warn!("Rolling back transaction with {} mutations", self.undo_log.len());
        }
        while let Some(entry) = self.undo_log.pop() {
            self.store.undo(entry);
        }
        self.finished = true;
    }
}

impl Drop for WriteTransaction<'_> {
    fn drop(&mut self) {
        self.rollback_in_place();
    }
}

/// Shared, read-only scope
pub struct ReadTransaction<'s> {
    store: &'s GraphStore,
}

impl<'s> ReadTransaction<'s> {
    pub(crate) fn new(store: &'s GraphStore) -> Self {
        ReadTransaction { store }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&'s Node> {
        self.store.get_node(id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&'s Edge> {
        self.store.get_edge(id)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.store.has_node(id)
    }

    /// See [`GraphStore::edges`]
    pub fn edges<'t>(
        &self,
        node: NodeId,
        direction: Direction,
        edge_type: Option<&'t EdgeType>,
    ) -> Edges<'s, 't> {
        self.store.edges(node, direction, edge_type)
    }

    pub fn find_node(&self, label: &Label, property: &str, value: &PropertyValue) -> Option<NodeId> {
        self.store.find_node(label, property, value)
    }

    pub fn nodes_with_label(&self, label: &Label) -> &'s [NodeId] {
        self.store.nodes_with_label(label)
    }
}

impl Drop for ReadTransaction<'_> {
    fn drop(&mut self) {
        self.store.release_reader();
    }
}
