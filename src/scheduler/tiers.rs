//! The three cooperative tiers run by every lane of a pass.
//!
//! Each batch gives every lane at most one frontier node. Nodes are then
//! drained by degree: the whole team takes the heaviest ones one at a time,
//! each sub-group takes medium ones, and everything left goes through the
//! team's bounded fine-grained edge buffer.
//!
//! Every loop below runs the same number of iterations on every lane of a
//! team, and every lane calls the operator the same number of times per
//! iteration. Lanes without a real edge call it with `NO_EDGE`.

use core::sync::atomic::Ordering;

use crate::concurrency::atomic::{GhostAtomicBool, GhostAtomicUsize};
use crate::concurrency::RaceCell;
use crate::config::LaunchConfig;
use crate::frontier::InFrontierView;
use crate::graph::{EdgeId, GraphView, NodeId, NO_EDGE, NO_NODE};

use super::grid::Lane;
use super::EdgeOperator;

/// Team-local scratch shared by the lanes of one team.
pub(crate) struct TeamShared<'brand> {
    // per-lane node of the current batch and its edge range
    src: Vec<GhostAtomicUsize<'brand>>,
    first: Vec<GhostAtomicUsize<'brand>>,
    last: Vec<GhostAtomicUsize<'brand>>,
    team_bid: RaceCell<'brand>,
    subgroup_bid: Vec<RaceCell<'brand>>,
    subgroup_has_work: GhostAtomicBool<'brand>,
    fine_count: GhostAtomicUsize<'brand>,
    fine_src: Vec<GhostAtomicUsize<'brand>>,
    fine_edge: Vec<GhostAtomicUsize<'brand>>,
}

impl<'brand> TeamShared<'brand> {
    pub(crate) fn new(config: &LaunchConfig) -> Self {
        let cells = |n: usize, v: usize| (0..n).map(|_| GhostAtomicUsize::new(v)).collect::<Vec<_>>();
        Self {
            src: cells(config.team_size, NO_NODE),
            first: cells(config.team_size, 0),
            last: cells(config.team_size, 0),
            team_bid: RaceCell::new(),
            subgroup_bid: (0..config.subgroups_per_team()).map(|_| RaceCell::new()).collect(),
            subgroup_has_work: GhostAtomicBool::new(false),
            fine_count: GhostAtomicUsize::new(0),
            fine_src: cells(config.fine_grain_capacity, NO_NODE),
            fine_edge: cells(config.fine_grain_capacity, NO_EDGE),
        }
    }

    fn node_of(&self, lane: usize) -> (NodeId, EdgeId, EdgeId) {
        (
            self.src[lane].load(Ordering::Relaxed),
            self.first[lane].load(Ordering::Relaxed),
            self.last[lane].load(Ordering::Relaxed),
        )
    }
}

/// The node a lane holds in the current batch.
struct Assigned {
    src: NodeId,
    first: EdgeId,
    last: EdgeId,
    work_left: usize,
}

/// Runs one lane's share of a pass.
pub(crate) fn run_lane<'brand, G, O>(
    lane: &Lane<'_, 'brand>,
    shared: &TeamShared<'brand>,
    graph: &G,
    frontier: InFrontierView<'_, 'brand>,
    op: &O,
) where
    G: GraphView + ?Sized,
    O: EdgeOperator<'brand> + ?Sized,
{
    let config = lane.config();
    let len = frontier.len();
    let mut base = lane.team_id() * config.team_size;
    while base < len {
        let mut own = match frontier.get(base + lane.lane_id()) {
            Some(node) if graph.is_valid_node(node) => {
                let range = graph.out_edge_range(node);
                Assigned {
                    src: node,
                    first: range.start,
                    last: range.end,
                    work_left: range.len(),
                }
            }
            _ => Assigned {
                src: NO_NODE,
                first: 0,
                last: 0,
                work_left: 0,
            },
        };
        let me = lane.lane_id();
        shared.src[me].store(own.src, Ordering::Relaxed);
        shared.first[me].store(own.first, Ordering::Relaxed);
        shared.last[me].store(own.last, Ordering::Relaxed);
        if me == 0 {
            shared.fine_count.store(0, Ordering::Relaxed);
        }
        lane.barrier();

        team_tier(lane, shared, &mut own, op);
        subgroup_tier(lane, shared, &mut own, op);
        fine_tier(lane, shared, &mut own, op);

        // The next batch overwrites the shared node table.
        lane.barrier();
        base += config.total_lanes();
    }
}

fn team_tier<'brand, O>(lane: &Lane<'_, 'brand>, shared: &TeamShared<'brand>, own: &mut Assigned, op: &O)
where
    O: EdgeOperator<'brand> + ?Sized,
{
    let config = lane.config();
    let me = lane.lane_id();
    loop {
        if own.work_left >= config.min_team_degree {
            shared.team_bid.bid(me);
        }
        lane.barrier();
        let Some(winner) = shared.team_bid.winner() else {
            break;
        };
        lane.barrier();
        if winner == me {
            shared.team_bid.reset();
            own.work_left = 0;
        }
        lane.barrier();

        let (src, first, last) = shared.node_of(winner);
        let rounds = (last - first).div_ceil(config.team_size);
        for round in 0..rounds {
            let edge = first + round * config.team_size + me;
            op.apply(lane, src, if edge < last { edge } else { NO_EDGE });
        }
    }
}

fn subgroup_tier<'brand, O>(lane: &Lane<'_, 'brand>, shared: &TeamShared<'brand>, own: &mut Assigned, op: &O)
where
    O: EdgeOperator<'brand> + ?Sized,
{
    let config = lane.config();
    let me = lane.lane_id();
    let cell = &shared.subgroup_bid[lane.subgroup_id()];
    loop {
        if (config.min_subgroup_degree..config.min_team_degree).contains(&own.work_left) {
            cell.bid(me);
            shared.subgroup_has_work.store(true, Ordering::Relaxed);
        }
        lane.barrier();
        if !shared.subgroup_has_work.load(Ordering::Relaxed) {
            break;
        }
        let winner = cell.winner();
        // Idle sub-groups keep calling the operator until the busiest one is done.
        let rounds = shared
            .subgroup_bid
            .iter()
            .filter_map(RaceCell::winner)
            .map(|w| {
                let (_, first, last) = shared.node_of(w);
                (last - first).div_ceil(config.subgroup_size)
            })
            .max()
            .unwrap_or(0);
        lane.barrier();
        if winner == Some(me) {
            cell.reset();
            own.work_left = 0;
        }
        if me == 0 {
            shared.subgroup_has_work.store(false, Ordering::Relaxed);
        }
        lane.barrier();

        let (src, first, last) = winner.map_or((NO_NODE, 0, 0), |w| shared.node_of(w));
        for round in 0..rounds {
            let edge = first + round * config.subgroup_size + lane.subgroup_lane();
            op.apply(lane, src, if edge < last { edge } else { NO_EDGE });
        }
    }
}

fn fine_tier<'brand, O>(lane: &Lane<'_, 'brand>, shared: &TeamShared<'brand>, own: &mut Assigned, op: &O)
where
    O: EdgeOperator<'brand> + ?Sized,
{
    let config = lane.config();
    let capacity = config.fine_grain_capacity;
    let queued = own.work_left > 0 && own.work_left < config.min_subgroup_degree;
    let mut index = if queued {
        shared.fine_count.fetch_add(own.work_left, Ordering::Relaxed)
    } else {
        0
    };
    let mut next_edge = own.first;
    own.work_left = 0;
    lane.barrier();

    let mut remaining = shared.fine_count.load(Ordering::Relaxed);
    while remaining > 0 {
        if queued {
            while next_edge < own.last && index < capacity {
                shared.fine_src[index].store(own.src, Ordering::Relaxed);
                shared.fine_edge[index].store(next_edge, Ordering::Relaxed);
                index += 1;
                next_edge += 1;
            }
        }
        lane.barrier();

        let rounds = remaining.min(capacity).div_ceil(config.team_size);
        for round in 0..rounds {
            let slot = round * config.team_size + lane.lane_id();
            let (src, edge) = if slot < capacity {
                (
                    shared.fine_src[slot].swap(NO_NODE, Ordering::Relaxed),
                    shared.fine_edge[slot].swap(NO_EDGE, Ordering::Relaxed),
                )
            } else {
                (NO_NODE, NO_EDGE)
            };
            op.apply(lane, src, edge);
        }
        lane.barrier();

        remaining = remaining.saturating_sub(capacity);
        if queued && next_edge < own.last {
            index -= capacity;
        }
    }
}
