//! Synthetic bipartite LIKES graph
//!
//! Populates a store with `item_count` Item nodes and `person_count` Person
//! nodes, each person holding exactly `likes_count` outgoing LIKES edges to
//! uniformly chosen items. Every edge carries a `weight` drawn uniformly from
//! `[0, 10)`. Person batches are committed according to a [`BatchPolicy`].

use crate::graph::{GraphError, GraphStore, Label, NodeId, PropertyValue, WriteTransaction};
use crate::sampling::{Sampler, SamplingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

pub const PERSON: &str = "Person";
pub const ITEM: &str = "Item";
pub const LIKES: &str = "LIKES";
pub const WEIGHT: &str = "weight";

/// Unique key of Item nodes
pub const ITEM_KEY: &str = "id";
/// Unique key of Person nodes
pub const PERSON_KEY: &str = "person";

/// Upper (exclusive) bound of generated edge weights
pub const MAX_WEIGHT: f64 = 10.0;

/// Where generation was when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constraints,
    Items,
    People,
    Likes,
    Commit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Constraints => "constraint setup",
            Phase::Items => "item creation",
            Phase::People => "person creation",
            Phase::Likes => "like creation",
            Phase::Commit => "batch commit",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Cannot generate likes: item count is zero")]
    EmptyDomain,

    #[error("Generation failed during {phase} at index {index}: {source}")]
    Graph {
        phase: Phase,
        index: usize,
        #[source]
        source: GraphError,
    },

    #[error("Failed to pick an item to like: {0}")]
    Sampling(#[from] SamplingError),
}

impl GeneratorError {
    fn graph(phase: Phase, index: usize) -> impl FnOnce(GraphError) -> GeneratorError {
        move |source| GeneratorError::Graph {
            phase,
            index,
            source,
        }
    }
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// When to commit the running person transaction and open a new one
///
/// Batching only bounds transaction size; it never changes the generated
/// graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Before each person, commit with the given probability
    Probabilistic { commit_probability: f64 },
    /// Commit every `persons_per_batch` persons
    FixedSize { persons_per_batch: usize },
    /// All persons in one transaction
    Single,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy::Probabilistic {
            commit_probability: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub person_count: usize,
    pub item_count: usize,
    pub likes_count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub batch: BatchPolicy,
}

impl GeneratorConfig {
    pub fn new(person_count: usize, item_count: usize, likes_count: usize) -> Self {
        Self {
            person_count,
            item_count,
            likes_count,
            seed: None,
            batch: BatchPolicy::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_batch(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }
}

/// Node identifiers handed to the traversal engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPools {
    /// Person nodes in creation order
    pub people: Vec<NodeId>,
    /// Item nodes in creation order
    pub items: Vec<NodeId>,
}

pub struct Generator {
    config: GeneratorConfig,
    /// Picks items and weights
    sampler: Sampler,
    /// Drives probabilistic batch commits, kept apart so the batch policy
    /// does not shift the graph's random stream
    batch_sampler: Sampler,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let mut sampler = Sampler::new(config.seed);
        let batch_sampler = sampler.fork();
        Generator {
            config,
            sampler,
            batch_sampler,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Declare the Item and Person uniqueness constraints
    ///
    /// A label that already carries any constraint is skipped, so repeated
    /// calls are no-ops. Returns the number of constraints created.
    pub fn ensure_constraints(store: &mut GraphStore) -> GeneratorResult<usize> {
        let mut tx = store.begin_write();
        let mut created = 0;
        for (index, (label, key)) in [(ITEM, ITEM_KEY), (PERSON, PERSON_KEY)].into_iter().enumerate() {
            if tx.has_constraint_on_label(&Label::new(label)) {
                debug!("Constraint on {} already present, skipping", label);
                continue;
            }
            tx.create_unique_constraint(label, key)
                .map_err(GeneratorError::graph(Phase::Constraints, index))?;
            info!("Created uniqueness constraint on {}.{}", label, key);
            created += 1;
        }
        tx.commit().map_err(GeneratorError::graph(Phase::Constraints, created))?;
        Ok(created)
    }

    /// Run the bulk load
    ///
    /// Fails with `EmptyDomain` before touching the store when there are no
    /// items to like. A failure mid-way leaves exactly the batches committed
    /// before it.
    pub fn generate(&mut self, store: &mut GraphStore) -> GeneratorResult<EntryPools> {
        let GeneratorConfig {
            person_count,
            item_count,
            likes_count,
            ..
        } = self.config;

        if item_count == 0 {
            return Err(GeneratorError::EmptyDomain);
        }

        info!(
            "Generating graph: {} persons, {} items, {} likes per person",
            person_count, item_count, likes_count
        );

        Self::ensure_constraints(store)?;

        let mut pools = EntryPools {
            people: Vec::with_capacity(person_count),
            items: Vec::with_capacity(item_count),
        };

        let mut tx = store.begin_write();
        for index in 0..item_count {
            let item = tx
                .create_node_with_properties(
                    ITEM,
                    [
                        ("item", PropertyValue::from(index)),
                        (ITEM_KEY, PropertyValue::from(index)),
                        ("itemname", PropertyValue::from(format!("itemname{}", index))),
                    ],
                )
                .map_err(GeneratorError::graph(Phase::Items, index))?;
            pools.items.push(item);
        }
        tx.commit().map_err(GeneratorError::graph(Phase::Commit, 0))?;
        debug!("Committed {} items", item_count);

        let mut batches = 1;
        let mut in_batch = 0;
        let mut tx = store.begin_write();
        for index in 0..person_count {
            if in_batch > 0 && self.should_commit(in_batch) {
                tx.commit().map_err(GeneratorError::graph(Phase::Commit, index))?;
                debug!("Committed person batch {} ({} persons)", batches, in_batch);
                batches += 1;
                in_batch = 0;
                tx = store.begin_write();
            }

            let person = tx
                .create_node_with_properties(PERSON, [(PERSON_KEY, PropertyValue::from(index))])
                .map_err(GeneratorError::graph(Phase::People, index))?;
            pools.people.push(person);
            in_batch += 1;

            self.create_likes(&mut tx, index, person, &pools.items)?;
        }
        tx.commit()
            .map_err(GeneratorError::graph(Phase::Commit, person_count))?;

        info!(
            "Generated {} persons and {} items in {} person batches",
            pools.people.len(),
            pools.items.len(),
            batches
        );
        Ok(pools)
    }

    fn create_likes(
        &mut self,
        tx: &mut WriteTransaction<'_>,
        index: usize,
        person: NodeId,
        items: &[NodeId],
    ) -> GeneratorResult<()> {
        for _ in 0..self.config.likes_count {
            let item = self.sampler.pick(items)?;
            let weight = self.sampler.uniform(0.0, MAX_WEIGHT);
            tx.create_edge(person, item, LIKES)
                .and_then(|edge| tx.set_edge_property(edge, WEIGHT, weight))
                .map_err(GeneratorError::graph(Phase::Likes, index))?;
        }
        Ok(())
    }

    fn should_commit(&mut self, in_batch: usize) -> bool {
        match self.config.batch {
            BatchPolicy::Probabilistic { commit_probability } => {
                self.batch_sampler.chance(commit_probability)
            }
            BatchPolicy::FixedSize { persons_per_batch } => in_batch >= persons_per_batch.max(1),
            BatchPolicy::Single => false,
        }
    }
}
