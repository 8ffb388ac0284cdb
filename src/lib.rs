//! likegraph
//!
//! Generates a synthetic bipartite property graph (Person and Item nodes
//! joined by weighted LIKES edges) in an in-memory graph store, and runs
//! multi-hop traversal workloads over it.
//!
//! # Components
//!
//! - [`graph`]: the store. Arena storage with adjacency lists, a label
//!   index, uniqueness constraints, atomic write transactions and counted
//!   read transactions.
//! - [`generator`]: the bulk load, batched into bounded transactions.
//! - [`sampling`]: seeded uniform choice of traversal start nodes.
//! - [`traversal`]: the four query shapes (ordered fan-out, unordered
//!   fan-in, recommendation walk, weighted recommendation walk).
//! - [`context`]: `open`/`close` lifecycle hooks for a benchmark harness.
//!
//! ## Example Usage
//!
//! ```rust
//! use likegraph::{BenchConfig, BenchContext, GeneratorConfig};
//!
//! let config = BenchConfig::new(GeneratorConfig::new(10, 5, 3).with_seed(42));
//! let ctx = BenchContext::open(config).unwrap();
//!
//! let person = ctx.pools().people[0];
//! let engine = ctx.engine();
//! assert_eq!(engine.fan_out(person, likegraph::Direction::Outgoing), 3);
//! assert!(engine.recommendation_count(person) >= 9);
//!
//! let stats = ctx.close();
//! assert_eq!(stats.edge_count, 30);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod graph;
pub mod index;
pub mod sampling;
pub mod traversal;

// Re-export main types for convenience
pub use config::{BenchConfig, ConfigError, ConfigResult};
pub use context::BenchContext;
pub use error::{BenchError, BenchResult};
pub use generator::{
    BatchPolicy, EntryPools, Generator, GeneratorConfig, GeneratorError, GeneratorResult, Phase,
};
pub use graph::{
    Direction, Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStatistics, GraphStore, Label,
    Node, NodeId, PropertyMap, PropertyValue, ReadTransaction, StoreConfig, WriteTransaction,
};
pub use sampling::{Sampler, SamplingError, SamplingResult};
pub use traversal::{TraversalConfig, TraversalEngine};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
