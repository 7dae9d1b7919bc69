//! Execution order via Kahn's algorithm.

use super::error::{CompileError, CompileResult};
use crate::pipeline::graph::{Adjacency, PipelineGraph};
use crate::pipeline::id::NodeIndex;
use std::collections::VecDeque;

/// Stateless topological sorter.
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Sort the graph's nodes so every connection's source precedes its target.
    ///
    /// Zero in-degree nodes are seeded in node index order (the description's
    /// declaration order) and newly freed nodes are queued in discovery
    /// order, so the same graph always yields the same order.
    pub fn sort(graph: &PipelineGraph) -> CompileResult<Vec<NodeIndex>> {
        let adjacency = graph.adjacency();
        Self::sort_adjacency(&adjacency).map_err(|remaining| CompileError::CyclicGraph {
            remaining: remaining
                .into_iter()
                .map(|idx| graph.node(idx).id.to_string())
                .collect(),
        })
    }

    /// Kahn's algorithm over a bare adjacency table.
    ///
    /// On failure returns the nodes whose in-degree never reached zero, in
    /// index order. These are the cycle members plus everything downstream
    /// of a cycle.
    pub fn sort_adjacency(adjacency: &Adjacency) -> Result<Vec<NodeIndex>, Vec<NodeIndex>> {
        let n = adjacency.len();
        let mut in_degree = adjacency.in_degree.clone();
        let mut queue = VecDeque::new();
        let mut result = Vec::with_capacity(n);

        for (i, &degree) in in_degree.iter().enumerate() {
            if degree == 0 {
                queue.push_back(NodeIndex(i as u32));
            }
        }

        while let Some(node) = queue.pop_front() {
            result.push(node);

            for &neighbor in &adjacency.adjacency[node.index()] {
                in_degree[neighbor.index()] -= 1;
                if in_degree[neighbor.index()] == 0 {
                    queue.push_back(neighbor);
                }
            }
        }

        if result.len() == n {
            Ok(result)
        } else {
            Err(in_degree
                .iter()
                .enumerate()
                .filter(|(_, &degree)| degree > 0)
                .map(|(i, _)| NodeIndex(i as u32))
                .collect())
        }
    }
}
