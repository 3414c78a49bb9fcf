//! Any-winner election cells.
//!
//! A `RaceCell` is the explicit form of a deliberate data race: many lanes
//! write their identity with a plain relaxed store, and whichever store lands
//! last is the winner. The protocol is correct for *every* possible winner, so
//! no compare-exchange or lock is used and none should be added.
//!
//! Callers must separate the bidding phase from the reading phase with a
//! barrier (or a kernel boundary); the cell itself provides no ordering.
//!
//! Uses in this crate:
//! - team and sub-group bidding in the scheduler (who gets the group's lanes),
//! - the ownership table in `Pipe::compress` (which copy of a node survives),
//! - the per-destination mutex in the PageRank operator.

use core::sync::atomic::Ordering;

use crate::concurrency::atomic::GhostAtomicUsize;

/// A single any-winner election slot.
#[repr(transparent)]
pub struct RaceCell<'brand> {
    slot: GhostAtomicUsize<'brand>,
}

impl<'brand> RaceCell<'brand> {
    /// Value of a cell nobody has bid on.
    pub const EMPTY: usize = usize::MAX;

    /// Creates an empty cell.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            slot: GhostAtomicUsize::new(Self::EMPTY),
        }
    }

    /// Writes `id` into the cell. Last writer wins; the winner is arbitrary.
    #[inline(always)]
    pub fn bid(&self, id: usize) {
        debug_assert!(id != Self::EMPTY);
        self.slot.store(id, Ordering::Relaxed);
    }

    /// Returns the current winner, if anyone has bid since the last reset.
    #[inline(always)]
    pub fn winner(&self) -> Option<usize> {
        match self.slot.load(Ordering::Relaxed) {
            Self::EMPTY => None,
            id => Some(id),
        }
    }

    /// Returns `true` iff `id` currently holds the cell.
    #[inline(always)]
    pub fn is_held_by(&self, id: usize) -> bool {
        self.slot.load(Ordering::Relaxed) == id
    }

    /// Empties the cell.
    #[inline(always)]
    pub fn reset(&self) {
        self.slot.store(Self::EMPTY, Ordering::Relaxed);
    }
}

impl Default for RaceCell<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RaceCell<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RaceCell").field(&self.winner()).finish()
    }
}

/// A table of election cells, one per key.
///
/// Used as the ownership table during deduplication: every occupied slot of
/// the out-frontier bids its own position under the node it holds.
pub struct RaceTable<'brand> {
    cells: Vec<RaceCell<'brand>>,
}

impl<'brand> RaceTable<'brand> {
    /// Creates a table of `len` empty cells.
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| RaceCell::new()).collect(),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the table has no keys.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell for `key`.
    ///
    /// # Panics
    /// Panics if `key >= len()`.
    #[inline(always)]
    pub fn cell(&self, key: usize) -> &RaceCell<'brand> {
        &self.cells[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_has_no_winner() {
        let cell = RaceCell::new();
        assert_eq!(cell.winner(), None);
        assert!(!cell.is_held_by(0));
    }

    #[test]
    fn last_bid_wins_single_thread() {
        let cell = RaceCell::new();
        cell.bid(3);
        cell.bid(7);
        assert_eq!(cell.winner(), Some(7));
        assert!(cell.is_held_by(7));
        cell.reset();
        assert_eq!(cell.winner(), None);
    }

    #[test]
    fn concurrent_bids_elect_exactly_one_bidder() {
        let cell = RaceCell::new();
        std::thread::scope(|scope| {
            for id in 0..8 {
                let cell = &cell;
                scope.spawn(move || cell.bid(id));
            }
        });
        let winner = cell.winner().unwrap();
        assert!(winner < 8);
    }
}
