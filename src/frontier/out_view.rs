//! Team-local out-frontier view.
//!
//! Pushing through the pipe's shared size counter means every push from every
//! lane hits the same cache line. A team instead stages its partition's
//! offset, bound and size into this view once, pushes against the view's own
//! counter for the whole pass, and publishes the final size back once.

use crossbeam_utils::CachePadded;

use crate::concurrency::atomic::GhostAtomicUsize;
use crate::frontier::pipe::{reserve_and_write, Pipe};
use crate::graph::NodeId;

/// One team's staged out-frontier partition.
pub struct OutFrontierView<'a, 'brand> {
    pipe: &'a Pipe<'brand>,
    team: usize,
    offset: usize,
    next_offset: usize,
    size: CachePadded<GhostAtomicUsize<'brand>>,
}

impl<'a, 'brand> OutFrontierView<'a, 'brand> {
    /// Copies the partition state into team-local memory.
    pub(crate) fn stage_local(
        pipe: &'a Pipe<'brand>,
        team: usize,
        offset: usize,
        next_offset: usize,
        size: usize,
    ) -> Self {
        Self {
            pipe,
            team,
            offset,
            next_offset,
            size: CachePadded::new(GhostAtomicUsize::new(size.min(next_offset - offset))),
        }
    }

    /// Team owning the partition.
    pub fn team(&self) -> usize {
        self.team
    }

    /// Slots in the partition.
    pub fn partition_capacity(&self) -> usize {
        self.next_offset - self.offset
    }

    /// Returns `true` if `node` is a node of the pipe's graph.
    ///
    /// `NO_NODE` and every other out-of-range id are rejected.
    #[inline]
    pub fn accepts(&self, node: NodeId) -> bool {
        node < self.pipe.node_count()
    }

    /// Tries to append `node`; returns `false` if the partition is full.
    ///
    /// # Panics
    /// Panics if `node` is not a node of the pipe's graph.
    #[inline]
    pub fn push(&self, node: NodeId) -> bool {
        reserve_and_write(self.pipe, &self.size, self.offset, self.next_offset, node)
    }

    /// Entries pushed so far (clamped to the partition).
    pub fn len(&self) -> usize {
        self.size
            .load(core::sync::atomic::Ordering::Relaxed)
            .min(self.partition_capacity())
    }

    /// Returns `true` if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the team-local size back to the pipe.
    pub fn publish_local(self) {
        self.pipe.publish_partition_len(self.team, self.len());
    }
}
