//! The frontier pipe: two ping-ponged node buffers plus out-frontier partitions.
//!
//! An out-frontier buffer has two parts:
//!
//! ```text
//! [ contiguous prefix ; team 0 partition ; team 1 partition ; ... ; team T-1 partition ]
//!   0 .. offset[0]      offset[0] .. offset[1]                    offset[T-1] .. capacity
//! ```
//!
//! During a pass every team appends into its own partition through an atomic
//! size counter. [`Pipe::compress`] removes duplicate nodes and folds the
//! partitions into the contiguous prefix; [`Pipe::swap_slots`] then turns the
//! prefix into the next in-frontier.

use core::sync::atomic::Ordering;

use crossbeam_utils::CachePadded;
use serde::Serialize;

use crate::concurrency::atomic::GhostAtomicUsize;
use crate::concurrency::RaceTable;
use crate::config::LaunchConfig;
use crate::error::{FrontierError, Result};
use crate::frontier::{InFrontierView, OutFrontierView};
use crate::graph::NodeId;
use crate::token::GhostToken;

mod compress;

pub use compress::CompressStats;

/// Manages an in-frontier and a partitioned out-frontier of node ids in `[0, node_count)`.
pub struct Pipe<'brand> {
    capacity: usize,
    num_teams: usize,
    node_count: usize,
    slots: [Vec<GhostAtomicUsize<'brand>>; 2],
    // index into `slots` of the current in-frontier
    in_slot: GhostAtomicUsize<'brand>,
    in_len: GhostAtomicUsize<'brand>,
    out_sizes: Vec<CachePadded<GhostAtomicUsize<'brand>>>,
    out_offsets: Vec<GhostAtomicUsize<'brand>>,
    owner: RaceTable<'brand>,
}

impl<'brand> Pipe<'brand> {
    /// Creates a pipe able to hold at least `capacity` nodes per buffer.
    ///
    /// The capacity is rounded up to a multiple of `num_teams` and then grown
    /// by one slot per team, so even a tiny frontier leaves every team at least
    /// one out-frontier slot.
    ///
    /// # Panics
    /// Panics if `config.num_teams == 0`.
    pub fn new(config: &LaunchConfig, capacity: usize, node_count: usize) -> Self {
        let teams = config.num_teams;
        assert!(teams != 0, "pipe needs at least one team");
        let capacity = capacity + teams + (teams - capacity % teams) % teams;
        let buffer = || (0..capacity).map(|_| GhostAtomicUsize::new(0)).collect::<Vec<_>>();
        let pipe = Self {
            capacity,
            num_teams: teams,
            node_count,
            slots: [buffer(), buffer()],
            in_slot: GhostAtomicUsize::new(0),
            in_len: GhostAtomicUsize::new(0),
            out_sizes: (0..teams).map(|_| CachePadded::new(GhostAtomicUsize::new(0))).collect(),
            out_offsets: (0..teams).map(|_| GhostAtomicUsize::new(0)).collect(),
            owner: RaceTable::new(node_count),
        };
        pipe.spread_partitions_evenly();
        pipe
    }

    /// Slots per buffer after rounding.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of out-frontier partitions.
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// Node ids accepted by this pipe are `< node_count`.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Empties the in-frontier and spreads the out-frontier partitions evenly.
    pub fn initialize(&self, _token: &mut GhostToken<'brand>) {
        self.in_len.store(0, Ordering::Relaxed);
        self.spread_partitions_evenly();
    }

    /// Replaces the in-frontier with `nodes`.
    ///
    /// # Errors
    /// - [`FrontierError::CapacityExceeded`] if `nodes` does not fit,
    /// - [`FrontierError::NodeOutOfRange`] if a node id is `>= node_count`.
    pub fn seed(&self, _token: &mut GhostToken<'brand>, nodes: &[NodeId]) -> Result<()> {
        if nodes.len() > self.capacity {
            return Err(FrontierError::CapacityExceeded {
                requested: nodes.len(),
                capacity: self.capacity,
            });
        }
        if let Some(&node) = nodes.iter().find(|&&n| n >= self.node_count) {
            return Err(FrontierError::NodeOutOfRange {
                node,
                node_count: self.node_count,
            });
        }
        let slot = self.in_buffer();
        for (cell, &node) in slot.iter().zip(nodes) {
            cell.store(node, Ordering::Relaxed);
        }
        self.in_len.store(nodes.len(), Ordering::Relaxed);
        Ok(())
    }

    /// Number of nodes in the in-frontier.
    pub fn in_frontier_len(&self, _token: &GhostToken<'brand>) -> usize {
        self.in_len.load(Ordering::Relaxed)
    }

    /// Copies the in-frontier out of the pipe.
    pub fn in_frontier(&self, token: &GhostToken<'brand>) -> Vec<NodeId> {
        let len = self.in_frontier_len(token);
        self.in_buffer()[..len]
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Length of the contiguous out-frontier prefix (equal to `offset[0]`).
    pub fn out_prefix_len(&self, _token: &GhostToken<'brand>) -> usize {
        self.out_offsets[0].load(Ordering::Relaxed)
    }

    /// Copies the contiguous out-frontier prefix out of the pipe.
    pub fn out_prefix(&self, token: &GhostToken<'brand>) -> Vec<NodeId> {
        let len = self.out_prefix_len(token);
        self.out_buffer()[..len]
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Returns `[offset, next_offset)` of `team`'s partition.
    pub fn partition_bounds(&self, team: usize) -> (usize, usize) {
        (
            self.out_offsets[team].load(Ordering::Relaxed),
            self.next_offset(team),
        )
    }

    /// Entries currently held by `team`'s partition.
    pub fn partition_len(&self, team: usize) -> usize {
        let (offset, next) = self.partition_bounds(team);
        self.out_sizes[team].load(Ordering::Relaxed).min(next - offset)
    }

    /// Read-only view of the in-frontier for one pass.
    pub fn in_view<'a>(&'a self, token: &'a GhostToken<'brand>) -> InFrontierView<'a, 'brand> {
        InFrontierView::new(&self.in_buffer()[..self.in_frontier_len(token)])
    }

    /// Stages `team`'s partition into a team-local out-frontier view.
    pub fn stage_out<'a>(&'a self, _token: &'a GhostToken<'brand>, team: usize) -> OutFrontierView<'a, 'brand> {
        let (offset, next_offset) = self.partition_bounds(team);
        OutFrontierView::stage_local(
            self,
            team,
            offset,
            next_offset,
            self.out_sizes[team].load(Ordering::Relaxed),
        )
    }

    /// Pushes `node` straight into `team`'s partition through the shared counter.
    ///
    /// Returns `false` without writing if the partition is full; the counter is
    /// left clamped to the partition length. Never touches another partition.
    ///
    /// # Panics
    /// Panics if `node >= node_count` or `team >= num_teams`.
    pub fn push(&self, _token: &GhostToken<'brand>, team: usize, node: NodeId) -> bool {
        let (offset, next_offset) = self.partition_bounds(team);
        reserve_and_write(self, &self.out_sizes[team], offset, next_offset, node)
    }

    /// Swaps in/out roles after a compress.
    ///
    /// The compacted prefix of the out-frontier becomes the in-frontier and the
    /// old in-frontier buffer is re-partitioned as the next out-frontier.
    pub fn swap_slots(&self, _token: &mut GhostToken<'brand>) {
        let compacted = self.out_offsets[0].load(Ordering::Relaxed);
        let in_slot = self.in_slot.load(Ordering::Relaxed);
        self.in_slot.store(1 - in_slot, Ordering::Relaxed);
        self.in_len.store(compacted, Ordering::Relaxed);
        self.spread_partitions_evenly();
    }

    /// Host-side dump of the pipe for debugging and tests.
    pub fn snapshot(&self, token: &GhostToken<'brand>) -> PipeSnapshot {
        let out = self.out_buffer();
        let partitions = (0..self.num_teams)
            .map(|team| {
                let (offset, next_offset) = self.partition_bounds(team);
                let len = self.partition_len(team);
                PartitionSnapshot {
                    offset,
                    next_offset,
                    nodes: out[offset..offset + len]
                        .iter()
                        .map(|c| c.load(Ordering::Relaxed))
                        .collect(),
                }
            })
            .collect();
        PipeSnapshot {
            capacity: self.capacity,
            in_frontier: self.in_frontier(token),
            out_prefix: self.out_prefix(token),
            partitions,
        }
    }

    pub(crate) fn out_buffer(&self) -> &[GhostAtomicUsize<'brand>] {
        &self.slots[1 - self.in_slot.load(Ordering::Relaxed)]
    }

    fn in_buffer(&self) -> &[GhostAtomicUsize<'brand>] {
        &self.slots[self.in_slot.load(Ordering::Relaxed)]
    }

    fn next_offset(&self, team: usize) -> usize {
        if team + 1 < self.num_teams {
            self.out_offsets[team + 1].load(Ordering::Relaxed)
        } else {
            self.capacity
        }
    }

    fn spread_partitions_evenly(&self) {
        let stride = self.capacity / self.num_teams;
        for team in 0..self.num_teams {
            self.out_sizes[team].store(0, Ordering::Relaxed);
            self.out_offsets[team].store(team * stride, Ordering::Relaxed);
        }
    }

    pub(crate) fn publish_partition_len(&self, team: usize, len: usize) {
        self.out_sizes[team].store(len, Ordering::Relaxed);
    }
}

/// Reserves the next slot of a partition through `size` and stores `node` there.
///
/// Shared by [`Pipe::push`] (global counter) and [`OutFrontierView::push`]
/// (team-local counter).
pub(crate) fn reserve_and_write(
    pipe: &Pipe<'_>,
    size: &GhostAtomicUsize<'_>,
    offset: usize,
    next_offset: usize,
    node: NodeId,
) -> bool {
    assert!(node < pipe.node_count, "node {node} out of range for pipe");
    let bound = next_offset - offset;
    let index = size.fetch_add(1, Ordering::Relaxed);
    if index >= bound {
        size.fetch_min(bound, Ordering::Relaxed);
        return false;
    }
    pipe.out_buffer()[offset + index].store(node, Ordering::Relaxed);
    true
}

/// One partition as seen by [`Pipe::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSnapshot {
    /// First slot of the partition.
    pub offset: usize,
    /// First slot past the partition.
    pub next_offset: usize,
    /// Nodes currently in the partition.
    pub nodes: Vec<NodeId>,
}

/// Copy of a pipe's logical contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipeSnapshot {
    /// Slots per buffer.
    pub capacity: usize,
    /// Current in-frontier.
    pub in_frontier: Vec<NodeId>,
    /// Compacted out-frontier prefix.
    pub out_prefix: Vec<NodeId>,
    /// Per-team partitions of the out-frontier.
    pub partitions: Vec<PartitionSnapshot>,
}
