//! Data-driven residual PageRank.
//!
//! Every node starts with probability `1 - alpha` and sits in the first
//! frontier. A level has two launches:
//!
//! 1. an edge pass where each frontier node adds its outgoing update to the
//!    residual of every destination,
//! 2. an update kernel over all nodes that folds residuals into the
//!    probability and pushes a node whose residual exceeded `epsilon`.
//!
//! Residuals are kept per team so teams never write the same cell. Lanes of
//! one team that hit the same destination in the same round take turns
//! through a per-team race mutex.

use core::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};

use crate::concurrency::atomic::{GhostAtomicBool, GhostAtomicF32};
use crate::concurrency::{par, RaceTable};
use crate::config::LaunchConfig;
use crate::driver::{DriverStats, LevelDriver, LevelProgram};
use crate::error::{FrontierError, Result};
use crate::frontier::Pipe;
use crate::graph::{EdgeId, GraphView, NodeId};
use crate::scheduler::{EdgeOperator, Lane, PassOutcome, Scheduler};
use crate::token::GhostToken;

/// Damping and convergence parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Damping factor in `(0, 1)`.
    pub alpha: f32,
    /// A node is re-activated only if its residual exceeds this.
    pub epsilon: f32,
    /// Optional cap on levels.
    pub max_iterations: Option<usize>,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            alpha: 0.85,
            epsilon: 1e-6,
            max_iterations: None,
        }
    }
}

impl PageRankConfig {
    /// Checks the parameter ranges.
    ///
    /// # Errors
    /// Returns [`FrontierError::InvalidConfig`] if `alpha` is outside `(0, 1)`
    /// or `epsilon` is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.alpha.is_nan() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(FrontierError::InvalidConfig(format!("alpha {} not in (0, 1)", self.alpha)));
        }
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err(FrontierError::InvalidConfig(format!("epsilon {} must be > 0", self.epsilon)));
        }
        Ok(())
    }
}

/// Ranks computed by [`pagerank`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRankRun {
    /// Probability per node.
    pub ranks: Vec<f32>,
    /// Driver counters.
    pub stats: DriverStats,
}

impl PageRankRun {
    /// The `k` highest-ranked nodes, best first. Ties go to the lower node id.
    pub fn top_ranks(&self, k: usize) -> Vec<(NodeId, f32)> {
        let mut ranked: Vec<(NodeId, f32)> = self.ranks.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }

    /// Sum of all ranks.
    pub fn rank_sum(&self) -> f64 {
        self.ranks.iter().map(|&r| f64::from(r)).sum()
    }
}

struct PageRankState<'brand> {
    teams: usize,
    prob: Vec<GhostAtomicF32<'brand>>,
    // node-major: residual of `node` for `team` lives at `node * teams + team`
    residual: Vec<GhostAtomicF32<'brand>>,
    outgoing: Vec<GhostAtomicF32<'brand>>,
    // one election cell per (destination, team), same layout as `residual`
    mutex: RaceTable<'brand>,
    bids_made: Vec<GhostAtomicBool<'brand>>,
}

impl<'brand> PageRankState<'brand> {
    #[allow(clippy::cast_precision_loss)]
    fn new<G: GraphView + ?Sized>(graph: &G, teams: usize, alpha: f32) -> Self {
        let n = graph.node_count();
        Self {
            teams,
            prob: par::map_indices(n, |_| GhostAtomicF32::new(1.0 - alpha)),
            residual: par::map_indices(n * teams, |_| GhostAtomicF32::new(0.0)),
            outgoing: par::map_indices(n, |node| {
                let degree = graph.out_degree(node);
                GhostAtomicF32::new(if degree == 0 {
                    0.0
                } else {
                    alpha * (1.0 - alpha) / degree as f32
                })
            }),
            mutex: RaceTable::new(n * teams),
            bids_made: (0..teams).map(|_| GhostAtomicBool::new(false)).collect(),
        }
    }
}

/// Adds the source's outgoing update to the destination's team residual.
///
/// Calls `lane.barrier()`, so it relies on every lane of a team calling
/// `apply` the same number of times.
struct ResidualOperator<'a, 'brand, G: ?Sized> {
    graph: &'a G,
    state: &'a PageRankState<'brand>,
}

impl<'brand, G: GraphView + ?Sized> EdgeOperator<'brand> for ResidualOperator<'_, 'brand, G> {
    fn apply(&self, lane: &Lane<'_, 'brand>, src: NodeId, edge: EdgeId) {
        let state = self.state;
        let team = lane.team_id();
        let me = lane.lane_id();
        let bids_made = &state.bids_made[team];
        let mut pending = (self.graph.is_valid_edge(edge) && self.graph.is_valid_node(src))
            .then(|| self.graph.edge_destination(edge) * state.teams + team);

        bids_made.store(false, Ordering::Relaxed);
        lane.barrier();
        loop {
            if let Some(slot) = pending {
                state.mutex.cell(slot).bid(me);
                bids_made.store(true, Ordering::Relaxed);
            }
            lane.barrier();
            if !bids_made.load(Ordering::Relaxed) {
                break;
            }
            lane.barrier();
            bids_made.store(false, Ordering::Relaxed);
            if let Some(slot) = pending {
                if state.mutex.cell(slot).is_held_by(me) {
                    let update = state.outgoing[src].load(Ordering::Relaxed);
                    let residual = &state.residual[slot];
                    residual.store(residual.load(Ordering::Relaxed) + update, Ordering::Relaxed);
                    pending = None;
                }
            }
            lane.barrier();
        }
    }
}

struct PageRankProgram<'a, 'brand, G: GraphView + ?Sized> {
    scheduler: &'a Scheduler<'a, G>,
    state: &'a PageRankState<'brand>,
    params: PageRankConfig,
}

impl<'brand, G: GraphView + ?Sized> PageRankProgram<'_, 'brand, G> {
    /// Folds residuals into probabilities and pushes nodes that moved more than epsilon.
    #[allow(clippy::cast_precision_loss)]
    fn update_probabilities(&self, token: &GhostToken<'brand>, pipe: &Pipe<'brand>) -> Result<PassOutcome> {
        let graph = self.scheduler.graph();
        let state = self.state;
        let PageRankConfig { alpha, epsilon, .. } = self.params;
        let nodes = graph.node_count();
        self.scheduler.grid().launch(token, pipe, |lane| {
            let stride = lane.config().total_lanes();
            for node in (lane.global_id()..nodes).step_by(stride) {
                let columns = &state.residual[node * state.teams..(node + 1) * state.teams];
                let total: f32 = columns.iter().map(|r| r.swap(0.0, Ordering::Relaxed)).sum();
                let prob = &state.prob[node];
                prob.store(prob.load(Ordering::Relaxed) + total, Ordering::Relaxed);
                if total > epsilon {
                    lane.push(node);
                }
                let degree = graph.out_degree(node);
                let update = if degree == 0 { 0.0 } else { total * alpha / degree as f32 };
                state.outgoing[node].store(update, Ordering::Relaxed);
            }
        })
    }
}

impl<'brand, G: GraphView + ?Sized> LevelProgram<'brand> for PageRankProgram<'_, 'brand, G> {
    fn run_level(&mut self, level: usize, token: &GhostToken<'brand>, pipe: &Pipe<'brand>) -> Result<PassOutcome> {
        let op = ResidualOperator {
            graph: self.scheduler.graph(),
            state: self.state,
        };
        self.scheduler.run_pass(token, pipe, &op)?;

        // Rerunning would apply the edge pass twice, so an overflow here is fatal.
        if self.update_probabilities(token, pipe)?.needs_retry() {
            tracing::error!(level, capacity = pipe.capacity(), "probability update overflowed");
            return Err(FrontierError::CapacityExceeded {
                requested: pipe.node_count(),
                capacity: pipe.capacity(),
            });
        }
        Ok(PassOutcome::Complete)
    }
}

/// Runs data-driven PageRank until no residual exceeds `params.epsilon`.
///
/// # Errors
/// - [`FrontierError::InvalidConfig`] if either configuration fails validation,
/// - [`FrontierError::LaneFault`] from a pass.
pub fn pagerank<G: GraphView + ?Sized>(graph: &G, config: LaunchConfig, params: PageRankConfig) -> Result<PageRankRun> {
    params.validate()?;
    let scheduler = Scheduler::new(config, graph)?;
    let nodes = graph.node_count();
    // Every team needs room for its share of the update kernel's pushes.
    let capacity = nodes.max(graph.edge_count()).max(config.total_lanes()) + config.total_lanes();

    GhostToken::new(|mut token| {
        let state = PageRankState::new(graph, config.num_teams, params.alpha);
        let pipe = Pipe::new(&config, capacity, nodes);
        pipe.initialize(&mut token);
        let all: Vec<NodeId> = (0..nodes).collect();
        pipe.seed(&mut token, &all)?;

        let mut driver = LevelDriver::new(&config);
        if let Some(cap) = params.max_iterations {
            driver = driver.with_max_levels(cap);
        }
        let mut program = PageRankProgram {
            scheduler: &scheduler,
            state: &state,
            params,
        };
        let stats = driver.run(&mut token, &pipe, &mut program)?;

        let ranks = state.prob.into_iter().map(|p| p.load(Ordering::Relaxed)).collect();
        Ok(PageRankRun { ranks, stats })
    })
}
