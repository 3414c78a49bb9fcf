//! Data-driven breadth-first search.

use std::collections::VecDeque;

use core::sync::atomic::Ordering;

use serde::Serialize;

use crate::concurrency::atomic::GhostAtomicUsize;
use crate::concurrency::par;
use crate::config::LaunchConfig;
use crate::driver::{DriverStats, LevelDriver, LevelProgram};
use crate::error::{FrontierError, Result};
use crate::frontier::Pipe;
use crate::graph::{EdgeId, GraphView, NodeId};
use crate::scheduler::{EdgeOperator, Lane, PassOutcome, Scheduler};
use crate::token::GhostToken;

const UNREACHED: usize = usize::MAX;

/// Levels computed by [`bfs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BfsRun {
    /// Distance from the start node, `None` if unreachable.
    pub levels: Vec<Option<usize>>,
    /// Driver counters.
    pub stats: DriverStats,
}

impl BfsRun {
    /// Number of reached nodes, the start node included.
    pub fn reached(&self) -> usize {
        self.levels.iter().filter(|l| l.is_some()).count()
    }

    /// Largest finite level.
    pub fn depth(&self) -> Option<usize> {
        self.levels.iter().flatten().copied().max()
    }
}

/// Relaxes one edge: an unreached destination is pushed and, if the push
/// landed, gets the next level.
struct BfsOperator<'a, 'brand, G: ?Sized> {
    graph: &'a G,
    levels: &'a [GhostAtomicUsize<'brand>],
    next_level: usize,
}

impl<'brand, G: GraphView + ?Sized> EdgeOperator<'brand> for BfsOperator<'_, 'brand, G> {
    fn apply(&self, lane: &Lane<'_, 'brand>, _src: NodeId, edge: EdgeId) {
        if !self.graph.is_valid_edge(edge) {
            return;
        }
        let dst = self.graph.edge_destination(edge);
        // A failed push leaves `dst` unreached so the rerun pushes it again.
        if self.levels[dst].load(Ordering::Relaxed) == UNREACHED && lane.push(dst) {
            self.levels[dst].store(self.next_level, Ordering::Relaxed);
        }
    }
}

struct BfsProgram<'a, 'brand, G: GraphView + ?Sized> {
    scheduler: &'a Scheduler<'a, G>,
    levels: &'a [GhostAtomicUsize<'brand>],
}

impl<'brand, G: GraphView + ?Sized> LevelProgram<'brand> for BfsProgram<'_, 'brand, G> {
    fn run_level(&mut self, level: usize, token: &GhostToken<'brand>, pipe: &Pipe<'brand>) -> Result<PassOutcome> {
        let op = BfsOperator {
            graph: self.scheduler.graph(),
            levels: self.levels,
            next_level: level + 1,
        };
        self.scheduler.run_pass(token, pipe, &op)
    }
}

/// Runs BFS from `start` with a frontier sized to the node count.
///
/// # Errors
/// - [`FrontierError::NodeOutOfRange`] if `start` is not a node,
/// - [`FrontierError::InvalidConfig`] if `config` fails validation,
/// - [`FrontierError::RetryLimit`] / [`FrontierError::LaneFault`] from the driver.
pub fn bfs<G: GraphView + ?Sized>(graph: &G, start: NodeId, config: LaunchConfig) -> Result<BfsRun> {
    bfs_with_capacity(graph, start, config, graph.node_count())
}

/// Runs BFS from `start` with an explicit frontier capacity.
///
/// A capacity below the widest level is legal: overflowing levels are
/// compressed and rerun by the driver.
///
/// # Errors
/// Same as [`bfs`].
pub fn bfs_with_capacity<G: GraphView + ?Sized>(
    graph: &G,
    start: NodeId,
    config: LaunchConfig,
    capacity: usize,
) -> Result<BfsRun> {
    let node_count = graph.node_count();
    if start >= node_count {
        return Err(FrontierError::NodeOutOfRange { node: start, node_count });
    }
    let scheduler = Scheduler::new(config, graph)?;

    GhostToken::new(|mut token| {
        let levels: Vec<GhostAtomicUsize<'_>> = par::map_indices(node_count, |node| {
            GhostAtomicUsize::new(if node == start { 0 } else { UNREACHED })
        });
        let pipe = Pipe::new(&config, capacity, node_count);
        pipe.initialize(&mut token);
        pipe.seed(&mut token, &[start])?;

        let mut program = BfsProgram {
            scheduler: &scheduler,
            levels: &levels,
        };
        let stats = LevelDriver::new(&config).run(&mut token, &pipe, &mut program)?;

        let levels = levels
            .into_iter()
            .map(|level| match level.into_inner() {
                UNREACHED => None,
                depth => Some(depth),
            })
            .collect();
        Ok(BfsRun { levels, stats })
    })
}

/// Serial queue-based BFS used to check [`bfs`].
///
/// # Panics
/// Panics if `start` is not a node of `graph`.
pub fn reference_bfs<G: GraphView + ?Sized>(graph: &G, start: NodeId) -> Vec<Option<usize>> {
    let mut levels = vec![None; graph.node_count()];
    levels[start] = Some(0);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let next = levels[node].map(|l| l + 1);
        for edge in graph.out_edge_range(node) {
            let dst = graph.edge_destination(edge);
            if levels[dst].is_none() {
                levels[dst] = next;
                queue.push_back(dst);
            }
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrGraph;

    fn diamond() -> CsrGraph {
        CsrGraph::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap()
    }

    #[test]
    fn diamond_levels() {
        let run = bfs(&diamond(), 0, LaunchConfig::for_lanes(2, 4, 2)).unwrap();
        assert_eq!(run.levels, vec![Some(0), Some(1), Some(1), Some(2)]);
        assert_eq!(run.stats.levels, 3);
        assert_eq!(run.reached(), 4);
        assert_eq!(run.depth(), Some(2));
    }

    #[test]
    fn unreachable_nodes_stay_none() {
        let graph = CsrGraph::from_edges(5, &[(0, 1), (3, 4)]).unwrap();
        let run = bfs(&graph, 0, LaunchConfig::for_lanes(1, 2, 1)).unwrap();
        assert_eq!(run.levels, vec![Some(0), Some(1), None, None, None]);
        assert_eq!(run.levels, reference_bfs(&graph, 0));
    }

    #[test]
    fn start_out_of_range_is_rejected() {
        assert_eq!(
            bfs(&diamond(), 9, LaunchConfig::default()),
            Err(FrontierError::NodeOutOfRange { node: 9, node_count: 4 })
        );
    }

    #[test]
    fn undersized_frontier_is_rerun_not_truncated() {
        let star: Vec<(NodeId, NodeId)> = (1..=8).map(|v| (0, v)).collect();
        let graph = CsrGraph::from_edges(9, &star).unwrap();
        let config = LaunchConfig::for_lanes(2, 4, 2);
        let run = bfs_with_capacity(&graph, 0, config, 7).unwrap();
        assert!(run.stats.retries >= 1);
        assert_eq!(run.levels, reference_bfs(&graph, 0));
    }

    #[test]
    fn reference_bfs_on_a_cycle() {
        let graph = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        assert_eq!(reference_bfs(&graph, 2), vec![Some(2), Some(3), Some(0), Some(1)]);
    }
}
