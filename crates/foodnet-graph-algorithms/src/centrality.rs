//! Degree-based centrality

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Degree metrics of a single node
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DegreeStats {
    /// Number of incident edges
    pub degree: usize,
    /// Sum of incident edge weights
    pub weighted_degree: f64,
    /// `degree / (N - 1)`; zero for a single-node graph
    pub centrality: f64,
}

/// Degree, weighted degree and normalised degree centrality for every node.
///
/// Uses outgoing arcs, which for a symmetric view equals the undirected degree.
pub fn degree_centrality(view: &GraphView) -> HashMap<NodeId, DegreeStats> {
    let n = view.node_count;
    let scale = if n > 1 { 1.0 / (n - 1) as f64 } else { 0.0 };

    (0..n)
        .map(|idx| {
            let degree = view.out_degree(idx);
            let stats = DegreeStats {
                degree,
                weighted_degree: view.weighted_out_degree(idx),
                centrality: degree as f64 * scale,
            };
            (view.index_to_node[idx], stats)
        })
        .collect()
}
