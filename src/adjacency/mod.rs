//! County adjacency builder
//!
//! Two counties are adjacent when their boundaries run together for at least
//! `min_shared_boundary` or their interiors overlap, both under the
//! configured tolerance. A single shared point is a corner touch and does not
//! count.
//!
//! Candidate pairs come from an R-tree over county bounding boxes; the exact
//! test only runs on pairs whose boxes meet. With `parallel` set, each
//! worker handles a range of nodes and returns its own edge list, and the
//! lists are merged, sorted and deduplicated at the end.

mod contact;

pub use self::contact::Contact;
pub use crate::graph::AdjacencyEdge;

use self::contact::{contact, PreparedShape};
use crate::config::AdjacencyConfig;
use crate::county::CountyId;
use crate::error::{FoodNetResult, GeometryError};
use crate::geometry::CountyCollection;
use crate::spatial::{expand, BoxIndex};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info, info_span, warn};

/// A county left out of the node set because its boundary is malformed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCounty {
    pub county: CountyId,
    pub error: GeometryError,
}

/// Nodes and edges of the adjacency graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyResult {
    /// Counties with a valid boundary, in source order
    pub nodes: Vec<CountyId>,
    /// Sorted, without duplicates
    pub edges: Vec<AdjacencyEdge>,
    pub skipped: Vec<SkippedCounty>,
}

impl AdjacencyResult {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_adjacent(&self, a: CountyId, b: CountyId) -> bool {
        AdjacencyEdge::new(a, b).is_some_and(|edge| self.edges.binary_search(&edge).is_ok())
    }

    /// Neighbours of `id`, ascending.
    pub fn neighbors(&self, id: CountyId) -> Vec<CountyId> {
        let mut out: Vec<CountyId> = self.edges.iter().filter_map(|e| e.other(id)).collect();
        out.sort_unstable();
        out
    }

    /// Write the edge list as `county_a,county_b` rows.
    pub fn write_csv<W: Write>(&self, writer: W) -> FoodNetResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["county_a", "county_b"])?;
        for edge in &self.edges {
            csv.write_record([edge.a().to_string(), edge.b().to_string()])?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// Build the adjacency graph of every county in `counties`.
///
/// Malformed boundaries are skipped and reported; they never fail the build.
pub fn build_adjacency(counties: &CountyCollection, config: &AdjacencyConfig) -> AdjacencyResult {
    let span = info_span!("build_adjacency", counties = counties.len());
    let _guard = span.enter();

    let boundaries: Vec<_> = counties.iter().collect();
    let prepared: Vec<Result<PreparedShape, GeometryError>> = if config.parallel {
        boundaries.par_iter().map(|c| PreparedShape::new(c)).collect()
    } else {
        boundaries.iter().map(|c| PreparedShape::new(c)).collect()
    };

    let mut shapes = Vec::with_capacity(prepared.len());
    let mut skipped = Vec::new();
    for (county, shape) in boundaries.iter().zip(prepared) {
        match shape {
            Ok(shape) => shapes.push(shape),
            Err(error) => {
                warn!(county = %county.id, %error, "Excluding malformed county boundary");
                skipped.push(SkippedCounty {
                    county: county.id,
                    error,
                });
            }
        }
    }

    let index = BoxIndex::new(
        shapes
            .iter()
            .map(|s| expand(&s.bbox, config.tolerance))
            .collect(),
    );
    debug!(entries = index.len(), "Built county bounding-box index");

    let neighbours_of = |i: usize| -> Vec<AdjacencyEdge> {
        index
            .query(index.rect(i))
            .into_iter()
            .filter(|&j| j > i)
            .filter(|&j| contact(&shapes[i], &shapes[j], config).is_adjacent())
            .filter_map(|j| AdjacencyEdge::new(shapes[i].id, shapes[j].id))
            .collect()
    };

    let mut edges: Vec<AdjacencyEdge> = if config.parallel {
        (0..shapes.len()).into_par_iter().flat_map_iter(neighbours_of).collect()
    } else {
        (0..shapes.len()).flat_map(neighbours_of).collect()
    };
    edges.sort_unstable();
    edges.dedup();

    info!(
        nodes = shapes.len(),
        edges = edges.len(),
        skipped = skipped.len(),
        "Built adjacency graph"
    );

    AdjacencyResult {
        nodes: shapes.iter().map(|s| s.id).collect(),
        edges,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{load_counties, BoundaryRecord};
    use geo::{LineString, Polygon};

    fn square(x: f64, y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0), (x, y)]),
            vec![],
        )
    }

    fn id(geoid: &str) -> CountyId {
        geoid.parse().unwrap()
    }

    /// 2x2 block: 01001 01003 on the bottom row, 01005 01007 above
    fn block() -> CountyCollection {
        let records = vec![
            BoundaryRecord::new("01001", square(0.0, 0.0)),
            BoundaryRecord::new("01003", square(1.0, 0.0)),
            BoundaryRecord::new("01005", square(0.0, 1.0)),
            BoundaryRecord::new("01007", square(1.0, 1.0)),
        ];
        load_counties(&records).unwrap()
    }

    #[test]
    fn test_block_excludes_diagonals() {
        let result = build_adjacency(&block(), &AdjacencyConfig::default());
        assert_eq!(result.node_count(), 4);
        assert_eq!(result.edge_count(), 4);
        assert!(result.is_adjacent(id("01001"), id("01003")));
        assert!(result.is_adjacent(id("01003"), id("01001")));
        assert!(!result.is_adjacent(id("01001"), id("01007")));
        assert!(!result.is_adjacent(id("01003"), id("01005")));
        assert_eq!(result.neighbors(id("01001")), vec![id("01003"), id("01005")]);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let counties = block();
        let parallel = build_adjacency(&counties, &AdjacencyConfig::default());
        let sequential = build_adjacency(
            &counties,
            &AdjacencyConfig {
                parallel: false,
                ..AdjacencyConfig::default()
            },
        );
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_mixed_coordinate_scales() {
        let tiny = |x: f64| {
            Polygon::new(
                LineString::from(vec![(x, 0.0), (x + 1e-3, 0.0), (x + 1e-3, 1e-3), (x, 1e-3), (x, 0.0)]),
                vec![],
            )
        };
        let huge = Polygon::new(
            LineString::from(vec![(1e9, 1e9), (2e9, 1e9), (2e9, 2e9), (1e9, 2e9), (1e9, 1e9)]),
            vec![],
        );
        let records = vec![
            BoundaryRecord::new("01001", tiny(0.0)),
            BoundaryRecord::new("01003", tiny(1e-3)),
            BoundaryRecord::new("01005", huge),
        ];
        let result = build_adjacency(&load_counties(&records).unwrap(), &AdjacencyConfig::default());
        assert_eq!(result.node_count(), 3);
        assert_eq!(result.edges.len(), 1);
        assert!(result.is_adjacent(id("01001"), id("01003")));
    }

    #[test]
    fn test_overlapping_diamond_is_adjacent() {
        // Meets the square's right side only at its corners
        let diamond = Polygon::new(
            LineString::from(vec![(1.5, 0.5), (1.0, 1.0), (0.5, 0.5), (1.0, 0.0), (1.5, 0.5)]),
            vec![],
        );
        let records = vec![
            BoundaryRecord::new("01001", square(0.0, 0.0)),
            BoundaryRecord::new("01003", diamond),
        ];
        let result = build_adjacency(&load_counties(&records).unwrap(), &AdjacencyConfig::default());
        assert!(result.is_adjacent(id("01001"), id("01003")));
    }

    #[test]
    fn test_malformed_boundary_is_skipped() {
        let bow_tie = Polygon::new(
            LineString::from(vec![(1.0, 0.0), (2.0, 1.0), (2.0, 0.0), (1.0, 1.0), (1.0, 0.0)]),
            vec![],
        );
        let records = vec![
            BoundaryRecord::new("01001", square(0.0, 0.0)),
            BoundaryRecord::new("01003", bow_tie),
            BoundaryRecord::new("01005", square(0.0, 1.0)),
        ];
        let result = build_adjacency(&load_counties(&records).unwrap(), &AdjacencyConfig::default());

        assert_eq!(result.nodes, vec![id("01001"), id("01005")]);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(
            result.skipped,
            vec![SkippedCounty {
                county: id("01003"),
                error: GeometryError::SelfIntersecting,
            }]
        );
    }

    #[test]
    fn test_write_csv() {
        let result = build_adjacency(&block(), &AdjacencyConfig::default());
        let mut out = Vec::new();
        result.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("county_a,county_b"));
        assert_eq!(lines.next(), Some("01001,01003"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_empty_collection() {
        let result = build_adjacency(&CountyCollection::default(), &AdjacencyConfig::default());
        assert_eq!(result, AdjacencyResult::default());
    }
}
