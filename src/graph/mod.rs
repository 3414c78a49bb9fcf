//! Read-only graph views consumed by the scheduler.
//!
//! The scheduler only ever asks two questions of a graph: which edge indices
//! leave a node, and where an edge index points. Anything that can answer
//! those in `O(1)` implements [`GraphView`]; [`CsrGraph`] is the in-crate
//! compressed-sparse-row implementation.

pub mod csr;

pub use csr::CsrGraph;

use core::ops::Range;

/// Node identifier in `[0, node_count)`.
pub type NodeId = usize;

/// Edge index in `[0, edge_count)`.
pub type EdgeId = usize;

/// Sentinel for "no node". Any id `>= node_count` is treated the same way.
pub const NO_NODE: NodeId = usize::MAX;

/// Sentinel for "no edge". Any index `>= edge_count` is treated the same way.
///
/// Lanes that must take part in an operator call in lockstep but have no real
/// edge are handed this value.
pub const NO_EDGE: EdgeId = usize::MAX;

/// An immutable, CSR-like graph.
pub trait GraphView: Sync {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of edges.
    fn edge_count(&self) -> usize;

    /// Half-open range of edge indices leaving `node`.
    fn out_edge_range(&self, node: NodeId) -> Range<EdgeId>;

    /// Destination node of `edge`.
    fn edge_destination(&self, edge: EdgeId) -> NodeId;

    /// Out-degree of `node`.
    #[inline]
    fn out_degree(&self, node: NodeId) -> usize {
        self.out_edge_range(node).len()
    }

    /// Returns `true` iff `node` is a real node id.
    #[inline]
    fn is_valid_node(&self, node: NodeId) -> bool {
        node < self.node_count()
    }

    /// Returns `true` iff `edge` is a real edge index.
    #[inline]
    fn is_valid_edge(&self, edge: EdgeId) -> bool {
        edge < self.edge_count()
    }
}
