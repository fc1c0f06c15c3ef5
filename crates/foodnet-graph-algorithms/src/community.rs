//! Connected components

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

/// Result of WCC algorithm
#[derive(Debug, Clone)]
pub struct WccResult {
    /// Map of Component ID -> List of NodeIds
    pub components: HashMap<usize, Vec<NodeId>>,
    /// Map of NodeId -> Component ID
    pub node_component: HashMap<NodeId, usize>,
}

impl WccResult {
    /// Number of components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Finds all disjoint subgraphs in the graph, ignoring edge direction.
/// Component ids are dense (`0..count`) and numbered in order of the
/// lowest dense node index they contain, so they are stable across runs.
pub fn weakly_connected_components(view: &GraphView) -> WccResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    // Iterate all edges and Union connected nodes
    for u_idx in 0..n {
        for &v_idx in view.successors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    // Build results
    let mut root_to_component: HashMap<usize, usize> = HashMap::new();
    let mut components: HashMap<usize, Vec<NodeId>> = HashMap::new();
    let mut node_component = HashMap::with_capacity(n);

    for i in 0..n {
        let root = uf.find(i);
        let next_id = root_to_component.len();
        let component = *root_to_component.entry(root).or_insert(next_id);
        let node_id = view.index_to_node[i];

        components.entry(component).or_default().push(node_id);
        node_component.insert(node_id, component);
    }

    WccResult {
        components,
        node_component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wcc() {
        // Nodes: 1, 2, 3, 4, 5, 6
        // Edges: 1-2, 3-4-5, 6 (isolated)
        let view = GraphView::from_undirected_edges(
            vec![1, 2, 3, 4, 5, 6],
            &[(0, 1, 1.0), (2, 3, 1.0), (3, 4, 1.0)],
        );

        let result = weakly_connected_components(&view);

        assert_eq!(result.component_count(), 3);

        let c1 = result.node_component[&1];
        let c2 = result.node_component[&2];
        assert_eq!(c1, c2);
        assert_eq!(c1, 0);

        let c3 = result.node_component[&3];
        let c4 = result.node_component[&4];
        let c5 = result.node_component[&5];
        assert_eq!(c3, c4);
        assert_eq!(c4, c5);
        assert_ne!(c1, c3);

        assert_eq!(result.node_component[&6], 2);
        assert_eq!(result.components[&2], vec![6]);
    }
}
