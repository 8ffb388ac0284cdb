use likegraph::{BatchPolicy, BenchConfig, BenchContext, ConfigError, GeneratorConfig};
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE: &str = r#"
graph:
  person_count: 12
  item_count: 4
  likes_count: 2
  seed: 42
  batch:
    mode: fixed_size
    persons_per_batch: 5
traversal:
  ordered_iterations: 10
  weight_threshold: 2.5
store:
  max_transaction_size: 1000
"#;

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let config = BenchConfig::from_file(file.path()).unwrap();
    assert_eq!(config.graph.person_count, 12);
    assert_eq!(config.graph.seed, Some(42));
    assert_eq!(config.graph.batch, BatchPolicy::FixedSize { persons_per_batch: 5 });
    assert_eq!(config.traversal.ordered_iterations, 10);
    // Unset traversal fields keep their defaults
    assert_eq!(config.traversal.unordered_iterations, 10_000);
    assert_eq!(config.traversal.weight_threshold, 2.5);
    assert_eq!(config.store.max_transaction_size, Some(1000));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");
    let err = BenchConfig::from_file(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_malformed_yaml() {
    let err = BenchConfig::from_yaml_str("graph: [1, 2").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_batch_size_rejected() {
    let yaml = "graph:\n  person_count: 1\n  item_count: 1\n  likes_count: 1\n  batch:\n    mode: fixed_size\n    persons_per_batch: 0\n";
    assert!(matches!(
        BenchConfig::from_yaml_str(yaml),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_context_from_file_config() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    let config = BenchConfig::from_file(file.path()).unwrap();

    let ctx = BenchContext::open(config).unwrap();
    let stats = ctx.close();
    assert_eq!(stats.node_count, 16);
    assert_eq!(stats.edge_count, 24);
    // constraints + items + persons in batches of 5, 5, 2
    assert_eq!(stats.committed_transactions, 5);
}

#[test]
fn test_written_config_reloads() {
    let config = BenchConfig::new(GeneratorConfig::new(7, 3, 1).with_seed(1));
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();
    assert_eq!(BenchConfig::from_file(file.path()).unwrap(), config);
}
