//! Uniqueness constraints
//!
//! Provides hash indices that enforce one node per (label, property, value).

pub mod manager;
pub mod unique_index;

pub use manager::{ConstraintKey, ConstraintManager};
pub use unique_index::{IndexKey, UniqueIndex};
