mod common;

use common::{grid_edge_count, grid_id, grid_records, square, square_ring};
use foodnet::{
    build_adjacency, load_counties, AdjacencyConfig, BoundaryRecord, CountyId, GeometryError,
};
use geo::{LineString, Polygon};
use std::collections::HashSet;

fn id(geoid: &str) -> CountyId {
    geoid.parse().unwrap()
}

#[test]
fn test_grid_has_rook_adjacency_only() {
    let counties = load_counties(&grid_records(5, 4, 1)).unwrap();
    let result = build_adjacency(&counties, &AdjacencyConfig::default());

    assert_eq!(result.node_count(), 20);
    assert_eq!(result.edge_count(), grid_edge_count(5, 4));

    // Cell 0 is the bottom-left corner: right neighbour 1, upper neighbour 5
    assert_eq!(result.neighbors(grid_id(0)), vec![grid_id(1), grid_id(5)]);
    // Diagonal cells only share a corner
    assert!(!result.is_adjacent(grid_id(0), grid_id(6)));
    assert!(!result.is_adjacent(grid_id(1), grid_id(5)));
}

#[test]
fn test_adjacency_is_symmetric_without_self_edges() {
    let counties = load_counties(&grid_records(6, 6, 3)).unwrap();
    let result = build_adjacency(&counties, &AdjacencyConfig::default());

    for edge in &result.edges {
        assert_ne!(edge.a(), edge.b());
        assert!(result.is_adjacent(edge.a(), edge.b()));
        assert!(result.is_adjacent(edge.b(), edge.a()));
        assert!(result.neighbors(edge.a()).contains(&edge.b()));
        assert!(result.neighbors(edge.b()).contains(&edge.a()));
    }
    for &node in &result.nodes {
        assert!(!result.is_adjacent(node, node));
    }
}

#[test]
fn test_rebuilding_yields_the_same_edge_set() {
    let records = grid_records(7, 5, 2);
    let mut reversed = records.clone();
    reversed.reverse();

    let config = AdjacencyConfig::default();
    let first = build_adjacency(&load_counties(&records).unwrap(), &config);
    let second = build_adjacency(&load_counties(&records).unwrap(), &config);
    let shuffled = build_adjacency(&load_counties(&reversed).unwrap(), &config);

    let as_set = |edges: &[foodnet::AdjacencyEdge]| edges.iter().copied().collect::<HashSet<_>>();
    assert_eq!(first.edges, second.edges);
    assert_eq!(as_set(&first.edges), as_set(&shuffled.edges));
}

#[test]
fn test_malformed_county_does_not_block_the_rest() {
    let mut records = grid_records(10, 10, 2);
    // Replace cell 44 with a bow tie
    records[44] = BoundaryRecord::new(
        grid_id(44).to_string(),
        Polygon::new(
            LineString::from(vec![(4.0, 4.0), (5.0, 5.0), (5.0, 4.0), (4.0, 5.0), (4.0, 4.0)]),
            vec![],
        ),
    );
    // And cell 55 with a flat sliver
    records[55] = BoundaryRecord::new(
        grid_id(55).to_string(),
        Polygon::new(
            LineString::from(vec![(5.0, 5.0), (6.0, 5.0), (5.0, 5.0)]),
            vec![],
        ),
    );

    let counties = load_counties(&records).unwrap();
    let result = build_adjacency(&counties, &AdjacencyConfig::default());

    assert_eq!(result.node_count(), 98);
    assert!(!result.nodes.contains(&grid_id(44)));
    assert!(!result.nodes.contains(&grid_id(55)));
    assert_eq!(result.skipped.len(), 2);
    assert_eq!(result.skipped[0].error, GeometryError::SelfIntersecting);
    assert!(matches!(result.skipped[1].error, GeometryError::TooFewVertices { .. }));

    // Each removed interior cell takes four edges with it
    assert_eq!(result.edge_count(), grid_edge_count(10, 10) - 8);
    assert!(result.edges.iter().all(|e| !e.contains(grid_id(44)) && !e.contains(grid_id(55))));
}

#[test]
fn test_boundaries_with_different_vertex_counts_still_touch() {
    // The left county splits the shared side into many segments, the right one does not
    let records = vec![
        BoundaryRecord::new("01001", Polygon::new(square_ring(0.0, 0.0, 1.0, 7), vec![])),
        BoundaryRecord::new("01003", square(1.0, 0.0, 1.0)),
    ];
    let result = build_adjacency(&load_counties(&records).unwrap(), &AdjacencyConfig::default());
    assert!(result.is_adjacent(id("01001"), id("01003")));
}

#[test]
fn test_tolerance_bridges_small_gaps() {
    let records = vec![
        BoundaryRecord::new("01001", square(0.0, 0.0, 1.0)),
        BoundaryRecord::new("01003", square(1.001, 0.0, 1.0)),
    ];
    let counties = load_counties(&records).unwrap();

    let strict = build_adjacency(&counties, &AdjacencyConfig::default());
    assert_eq!(strict.edge_count(), 0);

    let loose = build_adjacency(
        &counties,
        &AdjacencyConfig {
            tolerance: 0.01,
            ..AdjacencyConfig::default()
        },
    );
    assert_eq!(loose.edge_count(), 1);
}

#[test]
fn test_min_shared_boundary_threshold() {
    // Offset squares share a side of length 0.001
    let records = vec![
        BoundaryRecord::new("01001", square(0.0, 0.0, 1.0)),
        BoundaryRecord::new("01003", square(1.0, 0.999, 1.0)),
    ];
    let counties = load_counties(&records).unwrap();

    let default = build_adjacency(&counties, &AdjacencyConfig::default());
    assert_eq!(default.edge_count(), 1);

    let coarse = build_adjacency(
        &counties,
        &AdjacencyConfig {
            min_shared_boundary: 0.01,
            ..AdjacencyConfig::default()
        },
    );
    assert_eq!(coarse.edge_count(), 0);
}

#[test]
fn test_multipolygon_counties() {
    // An island county whose second part touches a third county
    let island = geo::MultiPolygon::new(vec![square(0.0, 0.0, 1.0), square(5.0, 0.0, 1.0)]);
    let records = vec![
        BoundaryRecord::new("01001", island),
        BoundaryRecord::new("01003", square(6.0, 0.0, 1.0)),
        BoundaryRecord::new("01005", square(2.0, 0.0, 1.0)),
    ];
    let result = build_adjacency(&load_counties(&records).unwrap(), &AdjacencyConfig::default());
    assert_eq!(result.edge_count(), 1);
    assert!(result.is_adjacent(id("01001"), id("01003")));
    assert!(result.neighbors(id("01005")).is_empty());
}
