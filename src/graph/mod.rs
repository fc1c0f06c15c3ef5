//! County graph
//!
//! Edge types shared by the adjacency builder and edge weighting, and the
//! weighted [`InfluenceGraph`] that PageRank runs on.

pub mod edge;
pub mod influence;

pub use edge::{AdjacencyEdge, WeightedEdge};
pub use influence::{CountyScores, GraphError, GraphResult, InfluenceGraph};
