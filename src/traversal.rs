//! Multi-hop traversal workloads over the LIKES graph
//!
//! Four query shapes, each a pure read inside its own read transaction,
//! each returning the number of traversal steps it took:
//!
//! - ordered: repeated person -> item fan-out
//! - unordered: repeated item <- person fan-in
//! - recommendation: person -> item <- person -> item, unfiltered
//! - weighted recommendation: the same walk, where every hop only follows
//!   edges whose `weight` exceeds a threshold
//!
//! Counts never depend on edge enumeration order. Calls keep their
//! accumulators local, so any number can run concurrently on one store.

use crate::generator::{EntryPools, LIKES, WEIGHT};
use crate::graph::{Direction, Edge, EdgeType, GraphStore, NodeId, ReadTransaction};
use crate::sampling::{Sampler, SamplingResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Start persons per ordered traversal call
    pub ordered_iterations: usize,
    /// Start items per unordered traversal call
    pub unordered_iterations: usize,
    /// Weighted recommendation follows edges with `weight > weight_threshold`
    pub weight_threshold: f64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            ordered_iterations: 500_000,
            unordered_iterations: 10_000,
            // Below every generated weight: measures the property read, filters nothing
            weight_threshold: -1.0,
        }
    }
}

pub struct TraversalEngine<'s> {
    store: &'s GraphStore,
    pools: &'s EntryPools,
    config: TraversalConfig,
    likes: EdgeType,
}

impl<'s> TraversalEngine<'s> {
    pub fn new(store: &'s GraphStore, pools: &'s EntryPools, config: TraversalConfig) -> Self {
        TraversalEngine {
            store,
            pools,
            config,
            likes: EdgeType::new(LIKES),
        }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Outgoing LIKES of `ordered_iterations` random persons
    pub fn measure_ordered_traversal(&self, sampler: &mut Sampler) -> SamplingResult<u64> {
        let tx = self.store.begin_read();
        let mut count = 0;
        for _ in 0..self.config.ordered_iterations {
            let person = sampler.pick(&self.pools.people)?;
            count += fan_out(&tx, &self.likes, person, Direction::Outgoing);
        }
        Ok(count)
    }

    /// Incoming LIKES of `unordered_iterations` random items
    pub fn measure_unordered_traversal(&self, sampler: &mut Sampler) -> SamplingResult<u64> {
        let tx = self.store.begin_read();
        let mut count = 0;
        for _ in 0..self.config.unordered_iterations {
            let item = sampler.pick(&self.pools.items)?;
            count += fan_out(&tx, &self.likes, item, Direction::Incoming);
        }
        Ok(count)
    }

    /// Three-hop recommendation walk from one random person
    pub fn measure_recommendation_traversal(&self, sampler: &mut Sampler) -> SamplingResult<u64> {
        let person = sampler.pick(&self.pools.people)?;
        Ok(self.recommendation_count(person))
    }

    /// Weight-filtered three-hop walk from one random person, using the
    /// configured threshold
    pub fn measure_recommendation_traversal_with_relationship_properties(
        &self,
        sampler: &mut Sampler,
    ) -> SamplingResult<u64> {
        let person = sampler.pick(&self.pools.people)?;
        Ok(self.weighted_recommendation_count(person, self.config.weight_threshold))
    }

    /// LIKES edges incident to `node` in `direction`
    pub fn fan_out(&self, node: NodeId, direction: Direction) -> u64 {
        let tx = self.store.begin_read();
        fan_out(&tx, &self.likes, node, direction)
    }

    pub fn recommendation_count(&self, person: NodeId) -> u64 {
        let tx = self.store.begin_read();
        recommendations(&tx, &self.likes, person)
    }

    pub fn weighted_recommendation_count(&self, person: NodeId, threshold: f64) -> u64 {
        let tx = self.store.begin_read();
        weighted_recommendations(&tx, &self.likes, person, threshold)
    }

    /// Independent recommendation walks on the rayon pool, one read
    /// transaction each; results are in input order
    pub fn recommendation_counts_parallel(&self, persons: &[NodeId]) -> Vec<u64> {
        persons
            .par_iter()
            .map(|&person| self.recommendation_count(person))
            .collect()
    }
}

fn fan_out(tx: &ReadTransaction<'_>, likes: &EdgeType, node: NodeId, direction: Direction) -> u64 {
    tx.edges(node, direction, Some(likes)).count() as u64
}

fn recommendations(tx: &ReadTransaction<'_>, likes: &EdgeType, person: NodeId) -> u64 {
    let mut count = 0;
    for liked in tx.edges(person, Direction::Outgoing, Some(likes)) {
        for co_liked in tx.edges(liked.target, Direction::Incoming, Some(likes)) {
            count += fan_out(tx, likes, co_liked.source, Direction::Outgoing);
        }
    }
    count
}

fn weighted_recommendations(
    tx: &ReadTransaction<'_>,
    likes: &EdgeType,
    person: NodeId,
    threshold: f64,
) -> u64 {
    // Missing or non-numeric weights never pass
    let passes = |edge: &&Edge| edge.get_number(WEIGHT).is_some_and(|w| w > threshold);

    let mut count = 0;
    for liked in tx.edges(person, Direction::Outgoing, Some(likes)).filter(passes) {
        for co_liked in tx.edges(liked.target, Direction::Incoming, Some(likes)).filter(passes) {
            count += tx
                .edges(co_liked.source, Direction::Outgoing, Some(likes))
                .filter(passes)
                .count() as u64;
        }
    }
    count
}
