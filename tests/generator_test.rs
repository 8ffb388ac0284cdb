use likegraph::generator::{ITEM, ITEM_KEY, LIKES, MAX_WEIGHT, PERSON, PERSON_KEY, WEIGHT};
use likegraph::{
    BatchPolicy, Direction, EdgeType, Generator, GeneratorConfig, GeneratorError, GraphError,
    GraphStore, Label, PropertyValue,
};

fn generate(config: GeneratorConfig) -> (GraphStore, likegraph::EntryPools) {
    let mut store = GraphStore::new();
    let pools = Generator::new(config).generate(&mut store).unwrap();
    (store, pools)
}

#[test]
fn test_small_graph_shape() {
    let (store, pools) = generate(GeneratorConfig::new(10, 5, 3).with_seed(42));

    assert_eq!(store.count_nodes_by_label(&Label::new(PERSON)), 10);
    assert_eq!(store.count_nodes_by_label(&Label::new(ITEM)), 5);
    assert_eq!(store.count_edges_by_type(&EdgeType::new(LIKES)), 30);

    for &person in &pools.people {
        assert_eq!(store.degree(person, Direction::Outgoing), 3);
        assert_eq!(store.degree(person, Direction::Incoming), 0);
    }

    // Every like lands on an item
    let incoming: usize = pools
        .items
        .iter()
        .map(|&item| store.degree(item, Direction::Incoming))
        .sum();
    assert_eq!(incoming, 30);
}

#[test]
fn test_weights_in_range() {
    let (store, _) = generate(GeneratorConfig::new(200, 20, 10).with_seed(9));
    assert_eq!(store.edge_count(), 2_000);
    for edge in store.all_edges() {
        let weight = edge.get_number(WEIGHT).unwrap();
        assert!((0.0..MAX_WEIGHT).contains(&weight), "weight {} out of range", weight);
    }
}

#[test]
fn test_unique_keys() {
    let (store, pools) = generate(GeneratorConfig::new(20, 10, 2).with_seed(4));
    let person = Label::new(PERSON);
    let item = Label::new(ITEM);

    for (index, &id) in pools.items.iter().enumerate() {
        let key = PropertyValue::from(index);
        assert_eq!(store.find_node(&item, ITEM_KEY, &key), Some(id));
    }
    for (index, &id) in pools.people.iter().enumerate() {
        let key = PropertyValue::from(index);
        assert_eq!(store.find_node(&person, PERSON_KEY, &key), Some(id));
    }
}

#[test]
fn test_same_seed_same_graph() {
    let config = GeneratorConfig::new(30, 8, 4).with_seed(123);
    let (a, _) = generate(config.clone());
    let (b, _) = generate(config);

    let dump = |store: &GraphStore| -> Vec<(u64, u64, f64)> {
        store
            .all_edges()
            .map(|e| {
                (
                    e.source.as_u64(),
                    e.target.as_u64(),
                    e.get_number(WEIGHT).unwrap(),
                )
            })
            .collect()
    };
    assert_eq!(dump(&a), dump(&b));
}

#[test]
fn test_empty_domain_creates_no_person() {
    let mut store = GraphStore::new();
    let err = Generator::new(GeneratorConfig::new(10, 0, 3))
        .generate(&mut store)
        .unwrap_err();

    assert_eq!(err, GeneratorError::EmptyDomain);
    assert_eq!(store.count_nodes_by_label(&Label::new(PERSON)), 0);
    assert!(store.constraints().is_empty());
}

#[test]
fn test_empty_domain_even_without_likes() {
    let mut store = GraphStore::new();
    let err = Generator::new(GeneratorConfig::new(10, 0, 0))
        .generate(&mut store)
        .unwrap_err();
    assert_eq!(err, GeneratorError::EmptyDomain);
}

#[test]
fn test_no_persons() {
    let (store, pools) = generate(GeneratorConfig::new(0, 4, 5).with_seed(1));
    assert!(pools.people.is_empty());
    assert_eq!(pools.items.len(), 4);
    assert_eq!(store.edge_count(), 0);
}

#[test]
fn test_constraint_setup_is_idempotent() {
    let mut store = GraphStore::new();
    assert_eq!(Generator::ensure_constraints(&mut store).unwrap(), 2);
    assert_eq!(Generator::ensure_constraints(&mut store).unwrap(), 0);
    assert_eq!(store.constraints().len(), 2);
    assert!(store.has_constraint(&Label::new(ITEM), ITEM_KEY));
    assert!(store.has_constraint(&Label::new(PERSON), PERSON_KEY));

    // Generation on top of existing constraints adds none
    Generator::new(GeneratorConfig::new(3, 2, 1).with_seed(1))
        .generate(&mut store)
        .unwrap();
    assert_eq!(store.constraints().len(), 2);
}

#[test]
fn test_second_run_violates_item_constraint() {
    let mut store = GraphStore::new();
    let config = GeneratorConfig::new(2, 3, 1).with_seed(5);
    Generator::new(config.clone()).generate(&mut store).unwrap();

    let err = Generator::new(config).generate(&mut store).unwrap_err();
    match err {
        GeneratorError::Graph { index, source, .. } => {
            assert_eq!(index, 0);
            assert!(matches!(source, GraphError::ConstraintViolation { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
    // The failed items batch was rolled back
    assert_eq!(store.count_nodes_by_label(&Label::new(ITEM)), 3);
    assert_eq!(store.count_nodes_by_label(&Label::new(PERSON)), 2);
}

#[test]
fn test_single_batch_policy() {
    let config = GeneratorConfig::new(25, 3, 2)
        .with_seed(8)
        .with_batch(BatchPolicy::Single);
    let (store, _) = generate(config);
    // constraints, items, persons
    assert_eq!(store.committed_transactions(), 3);
    assert_eq!(store.edge_count(), 50);
}
