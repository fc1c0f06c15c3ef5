//! Graph algorithms for county influence networks
//!
//! Operates on a dense, read-only [`GraphView`] keyed by `u64` node ids.

pub mod common;
pub mod pagerank;
pub mod community;
pub mod centrality;

pub use common::{GraphView, NodeId};
pub use pagerank::{page_rank, PageRankConfig, PageRankResult};
pub use community::{weakly_connected_components, WccResult};
pub use centrality::{degree_centrality, DegreeStats};
