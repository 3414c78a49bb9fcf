//! Degree-aware multi-tier edge scheduling.
//!
//! [`Scheduler::run_pass`] visits every outgoing edge of every in-frontier
//! node exactly once, calling the [`EdgeOperator`] for each, and reports
//! whether any out-frontier partition overflowed.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use lanepipe::{CsrGraph, GhostToken, Lane, LaunchConfig, Pipe, Scheduler};
//!
//! let graph = CsrGraph::from_adjacency(&[vec![1, 2], vec![2], vec![]]);
//! let config = LaunchConfig::for_lanes(2, 4, 2);
//! let visited = AtomicUsize::new(0);
//!
//! GhostToken::new(|mut token| {
//!     let pipe = Pipe::new(&config, 3, 3);
//!     pipe.initialize(&mut token);
//!     pipe.seed(&mut token, &[0, 1]).unwrap();
//!
//!     let scheduler = Scheduler::new(config, &graph).unwrap();
//!     let op = |_: &Lane<'_, '_>, _src: usize, edge: usize| {
//!         if edge < 3 {
//!             visited.fetch_add(1, Ordering::Relaxed);
//!         }
//!     };
//!     let outcome = scheduler.run_pass(&token, &pipe, &op).unwrap();
//!     assert!(!outcome.needs_retry());
//! });
//! assert_eq!(visited.into_inner(), 3);
//! ```

pub mod grid;
mod tiers;

pub use grid::{Grid, Lane};

use serde::Serialize;

use crate::config::LaunchConfig;
use crate::error::Result;
use crate::frontier::Pipe;
use crate::graph::{EdgeId, GraphView, NodeId};
use crate::token::GhostToken;

use tiers::TeamShared;

/// Per-edge callback invoked by the scheduler.
///
/// `edge` may be [`NO_EDGE`](crate::graph::NO_EDGE) (and `src` may be
/// [`NO_NODE`](crate::graph::NO_NODE)) when a lane takes part in a lockstep
/// round without a real edge; treat that as a no-op. Every lane of a team
/// makes the same number of `apply` calls, so an operator may call
/// [`Lane::barrier`] exactly once per call.
///
/// Calls for many edges run concurrently, including edges that share a
/// destination. The operator synchronizes its own node data.
pub trait EdgeOperator<'brand>: Sync {
    /// Visits `edge` leaving `src`.
    fn apply(&self, lane: &Lane<'_, 'brand>, src: NodeId, edge: EdgeId);
}

impl<'brand, F> EdgeOperator<'brand> for F
where
    F: for<'l> Fn(&Lane<'l, 'brand>, NodeId, EdgeId) + Sync,
{
    #[inline]
    fn apply(&self, lane: &Lane<'_, 'brand>, src: NodeId, edge: EdgeId) {
        self(lane, src, edge);
    }
}

/// Result of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassOutcome {
    /// Every push landed in the out-frontier.
    Complete,
    /// At least one push hit a full partition.
    Overflowed,
}

impl PassOutcome {
    /// Returns `true` if the driver must compress and rerun the pass.
    pub fn needs_retry(self) -> bool {
        matches!(self, Self::Overflowed)
    }
}

/// Runs passes over one graph with a fixed launch configuration.
pub struct Scheduler<'g, G: GraphView + ?Sized> {
    grid: Grid,
    graph: &'g G,
}

impl<'g, G: GraphView + ?Sized> Scheduler<'g, G> {
    /// Creates a scheduler for `graph`.
    ///
    /// # Errors
    /// Returns [`FrontierError::InvalidConfig`](crate::FrontierError::InvalidConfig)
    /// if `config` fails validation.
    pub fn new(config: LaunchConfig, graph: &'g G) -> Result<Self> {
        Ok(Self {
            grid: Grid::new(config)?,
            graph,
        })
    }

    /// Launch configuration of every pass.
    pub fn config(&self) -> &LaunchConfig {
        self.grid.config()
    }

    /// The scheduled graph.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The lane grid, for launching non-edge kernels with the same shape.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Runs one pass over the pipe's in-frontier.
    ///
    /// # Errors
    /// - [`FrontierError::InvalidConfig`](crate::FrontierError::InvalidConfig)
    ///   if the pipe's partition count does not match the grid,
    /// - [`FrontierError::LaneFault`](crate::FrontierError::LaneFault) if an
    ///   operator call panicked.
    #[tracing::instrument(level = "debug", skip_all, fields(frontier = pipe.in_frontier_len(token)))]
    pub fn run_pass<'brand, O>(&self, token: &GhostToken<'brand>, pipe: &Pipe<'brand>, op: &O) -> Result<PassOutcome>
    where
        O: EdgeOperator<'brand> + ?Sized,
    {
        let frontier = pipe.in_view(token);
        let graph = self.graph;
        self.grid.launch_with(
            token,
            pipe,
            |_| TeamShared::new(self.grid.config()),
            |lane, shared| tiers::run_lane(lane, shared, graph, frontier, op),
        )
    }
}
