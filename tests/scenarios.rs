use graph_census::{GraphStore, MotifConfig, MotifEngine, PageRankConfig, VariationTable};

fn all_triples_table() -> VariationTable {
    let entries: Vec<(u32, u32)> = (0u32..=(1 << 18) - 1).map(|sig| (sig, 1)).collect();
    VariationTable::from_entries(entries)
}

fn total_feature_count(features: &graph_census::Features) -> u32 {
    features.iter().flat_map(|m| m.values()).sum()
}

#[test]
fn empty_graph_round_trips_and_yields_no_motifs() {
    let graph = GraphStore::assign(vec![0], vec![], None, true).unwrap();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.sorted_nodes_by_degree().is_empty());
    assert!(graph.k_core().is_empty());

    let mut buf = Vec::new();
    graph.serialize(&mut buf).unwrap();
    let mut cursor = std::io::Cursor::new(buf);
    let loaded = GraphStore::deserialize(&mut cursor).unwrap();
    assert_eq!(loaded.node_count(), 0);
    assert_eq!(loaded.edge_count(), 0);

    let table = all_triples_table();
    let mut engine = MotifEngine::new(MotifConfig::new(3).unwrap(), true, table);
    engine.bind(&graph);
    let features = engine.calculate().unwrap();
    assert!(features.is_empty());
}

#[test]
fn directed_triangle_has_uniform_degree_and_shell_and_one_triple() {
    // 0 -> 1 -> 2 -> 0
    let graph = GraphStore::assign(vec![0, 1, 2, 3], vec![1, 2, 0], None, true).unwrap();

    assert_eq!(graph.compute_node_degrees(), vec![1, 1, 1]);
    assert_eq!(graph.k_core(), vec![1, 1, 1]);

    let table = all_triples_table();
    let mut engine = MotifEngine::new(MotifConfig::new(3).unwrap(), true, table);
    engine.bind(&graph);
    let features = engine.calculate().unwrap();

    assert_eq!(total_feature_count(features), 3);
    for node_features in features {
        assert_eq!(node_features.values().sum::<u32>(), 1);
    }
}

#[test]
fn path_inverts_and_symmetrizes_correctly() {
    // 0 -> 1 -> 2
    let graph = GraphStore::assign(vec![0, 1, 2, 2], vec![1, 2], None, true).unwrap();
    let inverse = graph.inverse();

    assert!(inverse.are_neighbors(1, 0));
    assert!(inverse.are_neighbors(2, 1));
    assert!(!inverse.are_neighbors(0, 1));

    let undirected = graph.undirected(&inverse);
    assert_eq!(undirected.neighbors(0), &[1]);
    assert_eq!(undirected.neighbors(1), &[0, 2]);
    assert_eq!(undirected.neighbors(2), &[1]);
    assert!(!undirected.are_neighbors(0, 2));
}

#[test]
fn star_with_center_zero_has_expected_degree_order_and_shells() {
    // center 0 -> leaves 1, 2, 3
    let graph = GraphStore::assign(vec![0, 3, 3, 3, 3], vec![1, 2, 3], None, true).unwrap();
    let inverse = graph.inverse();
    let undirected = graph.undirected(&inverse);

    assert_eq!(undirected.sorted_nodes_by_degree(), vec![1, 2, 3, 0]);
    assert_eq!(undirected.k_core(), vec![1, 1, 1, 1]);

    let table = all_triples_table();
    let mut engine = MotifEngine::new(MotifConfig::new(3).unwrap(), false, table);
    engine.bind(&undirected);
    let features = engine.calculate().unwrap();

    // Three V-shapes centered on the hub, no triangles (the graph has none).
    assert_eq!(total_feature_count(features) / 3, 3);
}

#[test]
fn two_disconnected_triangles_preserve_components_and_count_six_credits() {
    let offsets = vec![0, 1, 2, 3, 4, 5, 6];
    let adjacency = vec![1, 2, 0, 4, 5, 3];
    let graph = GraphStore::assign(offsets, adjacency, None, true).unwrap();

    let inverse = graph.inverse();
    assert!(inverse.are_neighbors(1, 0));
    assert!(inverse.are_neighbors(4, 3));
    assert!(!inverse.are_neighbors(0, 3));
    assert!(!inverse.are_neighbors(3, 0));

    let table = all_triples_table();
    let mut engine = MotifEngine::new(MotifConfig::new(3).unwrap(), true, table);
    engine.bind(&graph);
    let features = engine.calculate().unwrap();

    assert_eq!(total_feature_count(features), 6);
}

#[test]
fn page_rank_on_three_cycle_converges_to_one() {
    let graph = GraphStore::assign(vec![0, 1, 2, 3], vec![1, 2, 0], None, true).unwrap();
    let ranks = graph.page_rank(PageRankConfig::new(0.85, 20));

    assert_eq!(ranks.len(), 3);
    for rank in ranks {
        assert!((rank - 1.0).abs() < 1e-4, "rank was {rank}");
    }
}
