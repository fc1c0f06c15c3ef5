//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the graph topology for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Every arc carries a weight. Undirected inputs are stored as a pair of
/// opposing arcs, so the outgoing and incoming structures are mirror images.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,
    /// Arc weights, aligned with `out_targets`
    pub out_weights: Vec<f64>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,
    /// Arc weights, aligned with `in_sources`
    pub in_weights: Vec<f64>,

    /// Sum of outgoing arc weights per node
    weighted_out: Vec<f64>,
}

impl GraphView {
    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Sum of outgoing arc weights of a node (by index)
    pub fn weighted_out_degree(&self, idx: usize) -> f64 {
        self.weighted_out[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Get weights for outgoing edges of a node
    pub fn weights(&self, idx: usize) -> &[f64] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_weights[start..end]
    }

    /// Get weights for incoming edges of a node, aligned with `predecessors`
    pub fn incoming_weights(&self, idx: usize) -> &[f64] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_weights[start..end]
    }

    /// Dense index of a node id, if present
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.node_to_index.get(&node).copied()
    }

    /// Build a view from an undirected, weighted edge list over dense indices.
    ///
    /// Each `(u, v, w)` becomes the arcs `u -> v` and `v -> u`, both with
    /// weight `w`. Callers are expected to pass a deduplicated list without
    /// self-pairs; endpoints must be `< index_to_node.len()`.
    pub fn from_undirected_edges(index_to_node: Vec<NodeId>, edges: &[(usize, usize, f64)]) -> Self {
        let node_count = index_to_node.len();
        let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];

        for &(u, v, w) in edges {
            outgoing[u].push((v, w));
            outgoing[v].push((u, w));
        }

        Self::from_weighted_adjacency(index_to_node, outgoing)
    }

    /// Build a view from directed adjacency lists of `(target, weight)` pairs.
    pub fn from_weighted_adjacency(
        index_to_node: Vec<NodeId>,
        mut outgoing: Vec<Vec<(usize, f64)>>,
    ) -> Self {
        let node_count = index_to_node.len();
        let node_to_index: HashMap<NodeId, usize> = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
        for (u, arcs) in outgoing.iter_mut().enumerate() {
            // Stable neighbor order keeps floating point sums reproducible
            arcs.sort_by_key(|&(v, _)| v);
            for &(v, w) in arcs.iter() {
                incoming[v].push((u, w));
            }
        }

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut out_weights = Vec::new();
        let mut weighted_out = Vec::with_capacity(node_count);

        // Flatten Outgoing
        out_offsets.push(0);
        for arcs in outgoing {
            weighted_out.push(arcs.iter().map(|&(_, w)| w).sum());
            for (v, w) in arcs {
                out_targets.push(v);
                out_weights.push(w);
            }
            out_offsets.push(out_targets.len());
        }

        // Flatten Incoming
        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();
        let mut in_weights = Vec::new();
        in_offsets.push(0);
        for arcs in incoming {
            for (u, w) in arcs {
                in_sources.push(u);
                in_weights.push(w);
            }
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            out_weights,
            in_offsets,
            in_sources,
            in_weights,
            weighted_out,
        }
    }
}
