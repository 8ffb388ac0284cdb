//! Benchmark configuration
//!
//! Loaded from YAML, e.g.
//!
//! ```yaml
//! graph:
//!   person_count: 100000
//!   item_count: 2000
//!   likes_count: 100
//!   seed: 42
//!   batch:
//!     mode: probabilistic
//!     commit_probability: 0.01
//! traversal:
//!   weight_threshold: -1.0
//! store:
//!   max_transaction_size: 1000000
//! ```
//!
//! The three counts are required; everything else has a default.

use crate::generator::{BatchPolicy, GeneratorConfig};
use crate::graph::StoreConfig;
use crate::traversal::TraversalConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub graph: GeneratorConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl BenchConfig {
    pub fn new(graph: GeneratorConfig) -> Self {
        Self {
            graph,
            traversal: TraversalConfig::default(),
            store: StoreConfig::default(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: BenchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match self.graph.batch {
            BatchPolicy::Probabilistic { commit_probability }
                if !(0.0..=1.0).contains(&commit_probability) =>
            {
                return Err(ConfigError::Invalid(format!(
                    "commit_probability must be within [0, 1], got {}",
                    commit_probability
                )));
            }
            BatchPolicy::FixedSize { persons_per_batch: 0 } => {
                return Err(ConfigError::Invalid(
                    "persons_per_batch must be at least 1".to_string(),
                ));
            }
            _ => {}
        }
        if self.traversal.weight_threshold.is_nan() {
            return Err(ConfigError::Invalid("weight_threshold must be a number".to_string()));
        }
        if self.store.max_transaction_size == Some(0) {
            return Err(ConfigError::Invalid(
                "max_transaction_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = BenchConfig::from_yaml_str(
            "graph:\n  person_count: 10\n  item_count: 5\n  likes_count: 3\n",
        )
        .unwrap();
        assert_eq!(config.graph, GeneratorConfig::new(10, 5, 3));
        assert_eq!(config.traversal, TraversalConfig::default());
        assert_eq!(config.store.max_transaction_size, None);
    }

    #[test]
    fn test_counts_are_required() {
        let err = BenchConfig::from_yaml_str("graph:\n  person_count: 10\n  item_count: 5\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_batch_modes() {
        let config = BenchConfig::from_yaml_str(
            "graph:\n  person_count: 1\n  item_count: 1\n  likes_count: 1\n  batch:\n    mode: fixed_size\n    persons_per_batch: 500\n",
        )
        .unwrap();
        assert_eq!(config.graph.batch, BatchPolicy::FixedSize { persons_per_batch: 500 });

        let config = BenchConfig::from_yaml_str(
            "graph:\n  person_count: 1\n  item_count: 1\n  likes_count: 1\n  batch:\n    mode: single\n",
        )
        .unwrap();
        assert_eq!(config.graph.batch, BatchPolicy::Single);
    }

    #[test]
    fn test_invalid_probability() {
        let mut config = BenchConfig::new(GeneratorConfig::new(1, 1, 1));
        config.graph.batch = BatchPolicy::Probabilistic {
            commit_probability: 1.5,
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = BenchConfig::new(GeneratorConfig::new(100, 20, 5).with_seed(7));
        config.traversal.weight_threshold = 2.5;
        config.store.max_transaction_size = Some(10_000);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(BenchConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
