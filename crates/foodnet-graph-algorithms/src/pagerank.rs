//! Weighted PageRank
//!
//! Power iteration over a [`GraphView`]. Each round reads the previous score
//! vector and writes a fresh one; the two buffers are swapped between rounds
//! so no round ever observes a partially updated vector.

use super::common::{GraphView, NodeId};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// PageRank configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageRankConfig {
    /// Probability of following an edge rather than jumping uniformly (usually 0.85)
    pub damping_factor: f64,
    /// Upper bound on power iterations
    pub max_iterations: usize,
    /// L1 distance between successive score vectors that counts as converged
    pub tolerance: f64,
    /// Spread the mass of nodes without outgoing weight uniformly each round
    pub dangling_correction: bool,
    /// Compute the nodes of a round on the rayon pool
    pub parallel: bool,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            dangling_correction: true,
            parallel: true,
        }
    }
}

/// Output of a PageRank run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageRankResult {
    /// Score per node id
    pub scores: HashMap<NodeId, f64>,
    /// Rounds actually executed
    pub iterations: usize,
    /// Whether `delta` dropped below the tolerance before the iteration cap
    pub converged: bool,
    /// L1 distance between the last two score vectors
    pub delta: f64,
}

impl PageRankResult {
    /// Scores sorted from most to least influential; ties broken by node id.
    pub fn ranked(&self) -> Vec<(NodeId, f64)> {
        let mut ranked: Vec<(NodeId, f64)> = self.scores.iter().map(|(&id, &s)| (id, s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    /// Sum of all scores
    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }
}

/// Calculate weighted PageRank for the graph view.
///
/// `next[i] = (1 - d) / N + d * sum_j(score[j] * w(j, i) / W(j)) + d * D / N`
/// where `W(j)` is the weighted out-degree of `j` and `D` is the total score
/// held by dangling nodes (zero only when the correction is disabled).
pub fn page_rank(view: &GraphView, config: PageRankConfig) -> PageRankResult {
    let n = view.node_count;

    if n == 0 {
        return PageRankResult {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
            delta: 0.0,
        };
    }

    if n == 1 {
        return PageRankResult {
            scores: HashMap::from([(view.index_to_node[0], 1.0)]),
            iterations: 0,
            converged: true,
            delta: 0.0,
        };
    }

    let d = config.damping_factor;
    let n_f = n as f64;
    let teleport = (1.0 - d) / n_f;

    let dangling: Vec<usize> = (0..n)
        .filter(|&i| view.weighted_out_degree(i) <= 0.0)
        .collect();

    let mut scores = vec![1.0 / n_f; n];
    let mut next_scores = vec![0.0; n];
    let mut iterations = 0;
    let mut delta = f64::INFINITY;

    while iterations < config.max_iterations {
        let dangling_share = if config.dangling_correction {
            d * dangling.iter().map(|&i| scores[i]).sum::<f64>() / n_f
        } else {
            0.0
        };

        let previous = &scores;
        let score_node = |i: usize| -> f64 {
            let mut sum_incoming = 0.0;
            for (&source, &w) in view.predecessors(i).iter().zip(view.incoming_weights(i)) {
                let out_weight = view.weighted_out_degree(source);
                if out_weight > 0.0 {
                    sum_incoming += previous[source] * w / out_weight;
                }
            }
            teleport + d * sum_incoming + dangling_share
        };

        if config.parallel {
            next_scores
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, slot)| *slot = score_node(i));
        } else {
            for (i, slot) in next_scores.iter_mut().enumerate() {
                *slot = score_node(i);
            }
        }

        delta = scores
            .iter()
            .zip(&next_scores)
            .map(|(old, new)| (new - old).abs())
            .sum();

        // Swap buffers
        std::mem::swap(&mut scores, &mut next_scores);
        iterations += 1;
        debug!(iteration = iterations, delta, "pagerank round");

        // Check convergence
        if delta < config.tolerance {
            break;
        }
    }

    let scores = scores
        .into_iter()
        .enumerate()
        .map(|(idx, score)| (view.index_to_node[idx], score))
        .collect();

    PageRankResult {
        scores,
        iterations,
        converged: delta < config.tolerance,
        delta,
    }
}
