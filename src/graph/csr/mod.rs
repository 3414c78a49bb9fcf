//! A compact CSR (compressed sparse row) graph.
//!
//! Memory layout:
//! - `row_start`: `Vec<usize>` of length `n + 1`
//! - `edge_dst`: `Vec<usize>` of length `m`
//!
//! Out-edges of `u` are the indices `row_start[u]..row_start[u + 1]`.

use core::ops::Range;

use crate::error::{FrontierError, Result};
use crate::graph::{EdgeId, GraphView, NodeId};

/// An immutable CSR graph.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `from_adjacency` | \(O(n + m)\) | Builds CSR from adjacency list |
/// | `out_edge_range` | \(O(1)\) | Two offset loads |
/// | `edge_destination` | \(O(1)\) | One load |
/// | `neighbors` | \(O(1)\) | Returns iterator over out-neighbors |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    row_start: Vec<usize>,
    edge_dst: Vec<usize>,
}

impl CsrGraph {
    /// Builds a CSR graph from an adjacency list.
    ///
    /// # Panics
    ///
    /// Panics if any edge references a node index out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<usize>]) -> Self {
        let n = adjacency.len();

        let mut row_start = Vec::with_capacity(n + 1);
        row_start.push(0);

        let mut total_edges = 0usize;
        for nbrs in adjacency {
            total_edges = total_edges.saturating_add(nbrs.len());
            row_start.push(total_edges);
        }

        let mut edge_dst = Vec::with_capacity(total_edges);
        for (u, nbrs) in adjacency.iter().enumerate() {
            for &v in nbrs {
                assert!(v < n, "edge {u}->{v} is out of bounds for n={n}");
                edge_dst.push(v);
            }
        }

        Self { row_start, edge_dst }
    }

    /// Builds a graph from a directed edge list over `node_count` nodes.
    ///
    /// Edges keep their relative order per source.
    ///
    /// # Errors
    /// Returns [`FrontierError::NodeOutOfRange`] if an endpoint is not a node.
    pub fn from_edges(node_count: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        let mut adjacency = vec![Vec::new(); node_count];
        for &(u, v) in edges {
            for node in [u, v] {
                if node >= node_count {
                    return Err(FrontierError::NodeOutOfRange { node, node_count });
                }
            }
            adjacency[u].push(v);
        }
        Ok(Self::from_adjacency(&adjacency))
    }

    /// Builds a graph directly from CSR parts.
    ///
    /// # Errors
    /// Returns [`FrontierError::InvalidGraph`]
    /// - if `row_start` is empty or does not start at 0,
    /// - if `row_start` is not monotone,
    /// - if `row_start.last() != edge_dst.len()`,
    /// - if a destination is not a node.
    pub fn from_csr_parts(row_start: Vec<usize>, edge_dst: Vec<usize>) -> Result<Self> {
        let invalid = |msg: String| Err(FrontierError::InvalidGraph(msg));
        let Some(&last) = row_start.last() else {
            return invalid("row_start must have length n+1".into());
        };
        if row_start[0] != 0 {
            return invalid(format!("row_start[0] must be 0, found {}", row_start[0]));
        }
        if let Some(w) = row_start.windows(2).find(|w| w[0] > w[1]) {
            return invalid(format!("row_start must be monotone ({} > {})", w[0], w[1]));
        }
        if last != edge_dst.len() {
            return invalid(format!(
                "row_start ends at {last} but there are {} edges",
                edge_dst.len()
            ));
        }
        let n = row_start.len() - 1;
        if let Some(&v) = edge_dst.iter().find(|&&v| v >= n) {
            return invalid(format!("edge to {v} out of bounds for n={n}"));
        }
        Ok(Self { row_start, edge_dst })
    }

    /// Returns the out-neighbors of `node`.
    ///
    /// # Panics
    /// Panics if `node` is out of bounds.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        assert!(node < self.node_count(), "node {node} out of bounds");
        self.edge_dst[self.out_edge_range(node)].iter().copied()
    }

    /// Largest out-degree in the graph (0 for an empty graph).
    pub fn max_out_degree(&self) -> usize {
        self.row_start
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
}

impl GraphView for CsrGraph {
    #[inline]
    fn node_count(&self) -> usize {
        // `row_start` is length `n + 1` by construction.
        self.row_start.len().saturating_sub(1)
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.edge_dst.len()
    }

    #[inline]
    fn out_edge_range(&self, node: NodeId) -> Range<EdgeId> {
        self.row_start[node]..self.row_start[node + 1]
    }

    #[inline]
    fn edge_destination(&self, edge: EdgeId) -> NodeId {
        self.edge_dst[edge]
    }
}

#[cfg(test)]
mod tests;
