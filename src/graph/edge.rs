//! Edge types of the county adjacency graph

use crate::county::CountyId;
use serde::{Deserialize, Serialize};

/// Unordered pair of distinct, geographically adjacent counties.
///
/// Stored with the lower identifier first so that equality, ordering and
/// hashing ignore the order the pair was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdjacencyEdge {
    a: CountyId,
    b: CountyId,
}

impl AdjacencyEdge {
    /// Returns `None` for a self-pair.
    pub fn new(x: CountyId, y: CountyId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Lower endpoint
    pub fn a(&self) -> CountyId {
        self.a
    }

    /// Higher endpoint
    pub fn b(&self) -> CountyId {
        self.b
    }

    pub fn contains(&self, id: CountyId) -> bool {
        self.a == id || self.b == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other(&self, id: CountyId) -> Option<CountyId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Adjacency edge with its economic weight for one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedEdge {
    pub edge: AdjacencyEdge,
    pub weight: f64,
}
