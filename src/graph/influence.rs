//! Weighted, undirected county graph
//!
//! Wraps the CSR [`GraphView`] of the algorithm crate with county-keyed
//! lookups. Each undirected edge is stored as two opposing arcs, which is how
//! PageRank sees flow in both directions. Once built the graph is read-only.

use super::edge::WeightedEdge;
use crate::county::CountyId;
use foodnet_graph_algorithms::{
    degree_centrality, page_rank, weakly_connected_components, DegreeStats, GraphView,
    PageRankConfig, PageRankResult, WccResult,
};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised while assembling an influence graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("County {0} appears twice in the node set")]
    DuplicateNode(CountyId),

    #[error("Edge endpoint {0} is not a node of the graph")]
    UnknownEndpoint(CountyId),

    #[error("Edge {a}-{b} has non-positive weight {weight}")]
    InvalidWeight { a: CountyId, b: CountyId, weight: f64 },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Per-county values keyed by identifier
pub type CountyScores = FxHashMap<CountyId, f64>;

/// County graph ready for ranking
#[derive(Debug, Clone)]
pub struct InfluenceGraph {
    nodes: Vec<CountyId>,
    index: FxHashMap<CountyId, usize>,
    view: GraphView,
    edge_count: usize,
}

impl InfluenceGraph {
    /// Build from the node set and that year's weighted edges.
    ///
    /// # Errors
    /// Fails when a node repeats, an endpoint is not in `nodes`, or a weight
    /// is not a positive finite number.
    pub fn build(nodes: &[CountyId], edges: &[WeightedEdge]) -> GraphResult<Self> {
        let mut index = FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        for (idx, &id) in nodes.iter().enumerate() {
            if index.insert(id, idx).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
        }

        let mut arcs = Vec::with_capacity(edges.len());
        for e in edges {
            let (a, b) = (e.edge.a(), e.edge.b());
            let u = *index.get(&a).ok_or(GraphError::UnknownEndpoint(a))?;
            let v = *index.get(&b).ok_or(GraphError::UnknownEndpoint(b))?;
            if !(e.weight > 0.0 && e.weight.is_finite()) {
                return Err(GraphError::InvalidWeight { a, b, weight: e.weight });
            }
            arcs.push((u, v, e.weight));
        }

        let ids = nodes.iter().map(CountyId::as_u64).collect();
        Ok(Self {
            nodes: nodes.to_vec(),
            index,
            view: GraphView::from_undirected_edges(ids, &arcs),
            edge_count: arcs.len(),
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Undirected edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains(&self, id: CountyId) -> bool {
        self.index.contains_key(&id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[CountyId] {
        &self.nodes
    }

    pub fn view(&self) -> &GraphView {
        &self.view
    }

    /// Neighbours of `id` with edge weights, in node order.
    pub fn neighbors(&self, id: CountyId) -> impl Iterator<Item = (CountyId, f64)> + '_ {
        let idx = self.index.get(&id).copied();
        let (targets, weights): (&[usize], &[f64]) = match idx {
            Some(i) => (self.view.successors(i), self.view.weights(i)),
            None => (&[], &[]),
        };
        targets
            .iter()
            .zip(weights)
            .map(move |(&t, &w)| (self.nodes[t], w))
    }

    pub fn edge_weight(&self, a: CountyId, b: CountyId) -> Option<f64> {
        let u = *self.index.get(&a)?;
        let v = *self.index.get(&b)?;
        let pos = self.view.successors(u).binary_search(&v).ok()?;
        Some(self.view.weights(u)[pos])
    }

    /// Number of incident edges
    pub fn degree(&self, id: CountyId) -> Option<usize> {
        self.index.get(&id).map(|&i| self.view.out_degree(i))
    }

    /// Sum of incident edge weights
    pub fn weighted_degree(&self, id: CountyId) -> Option<f64> {
        self.index.get(&id).map(|&i| self.view.weighted_out_degree(i))
    }

    pub fn page_rank(&self, config: PageRankConfig) -> (CountyScores, PageRankResult) {
        let result = page_rank(&self.view, config);
        let scores = self.by_county(|id| result.scores.get(&id.as_u64()).copied().unwrap_or(0.0));
        (scores, result)
    }

    pub fn degree_stats(&self) -> FxHashMap<CountyId, DegreeStats> {
        let stats = degree_centrality(&self.view);
        self.nodes
            .iter()
            .filter_map(|&id| stats.get(&id.as_u64()).map(|s| (id, *s)))
            .collect()
    }

    /// Component id per county plus the component count
    pub fn components(&self) -> (FxHashMap<CountyId, usize>, usize) {
        let wcc: WccResult = weakly_connected_components(&self.view);
        let ids = self
            .nodes
            .iter()
            .filter_map(|&id| wcc.node_component.get(&id.as_u64()).map(|&c| (id, c)))
            .collect();
        (ids, wcc.component_count())
    }

    fn by_county(&self, value: impl Fn(CountyId) -> f64) -> CountyScores {
        self.nodes.iter().map(|&id| (id, value(id))).collect()
    }
}
