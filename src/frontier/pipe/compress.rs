//! Out-frontier compression: ownership race, per-team dedupe, compaction.

use core::sync::atomic::Ordering;

use serde::Serialize;

use super::Pipe;
use crate::concurrency::atomic::GhostAtomicUsize;
use crate::concurrency::par;
use crate::token::GhostToken;

/// What a [`Pipe::compress`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompressStats {
    /// Duplicate entries dropped from the partitions.
    pub duplicates_removed: usize,
    /// Entries moved from the partitions into the prefix.
    pub moved: usize,
    /// Length of the contiguous prefix afterwards.
    pub compacted_len: usize,
}

impl<'brand> Pipe<'brand> {
    /// Compresses the out-frontier into its contiguous prefix.
    ///
    /// 1. **Dedupe.** Every occupied partition slot bids its own buffer
    ///    position into the ownership table under the node it holds; prefix
    ///    slots from an earlier compress bid last so they always survive. A
    ///    partition slot whose bid was overwritten is a duplicate. Each team
    ///    fills its duplicate slots with surviving slots taken from the tail
    ///    of its own partition and shrinks its size.
    /// 2. **Compact.** Teams in ascending order move their survivors down to
    ///    `offset[0] + sum(earlier sizes)`.
    /// 3. **Reset.** Sizes go to zero and the remaining capacity past the new
    ///    prefix is re-spread across the teams.
    ///
    /// Running it again on an already-compressed out-frontier changes nothing.
    #[tracing::instrument(level = "debug", skip_all, fields(teams = self.num_teams))]
    pub fn compress(&self, _token: &mut GhostToken<'brand>) -> CompressStats {
        let out = self.out_buffer();
        let prefix = self.out_offsets[0].load(Ordering::Relaxed);
        let partitions: Vec<(usize, usize)> = (0..self.num_teams)
            .map(|team| (self.out_offsets[team].load(Ordering::Relaxed), self.partition_len(team)))
            .collect();

        // Ownership race. Which slot wins a node is irrelevant; only that one does.
        par::for_each_index(self.num_teams, |team| {
            let (offset, len) = partitions[team];
            for pos in offset..offset + len {
                self.owner.cell(out[pos].load(Ordering::Relaxed)).bid(pos);
            }
        });
        for (pos, cell) in out[..prefix].iter().enumerate() {
            self.owner.cell(cell.load(Ordering::Relaxed)).bid(pos);
        }

        let kept: Vec<usize> = par::map_indices(self.num_teams, |team| {
            let (offset, len) = partitions[team];
            self.dedupe_partition(out, offset, len)
        });

        let mut start = prefix;
        for (team, &(offset, _)) in partitions.iter().enumerate() {
            // `start <= offset`, so an ascending copy never clobbers unread entries.
            for i in 0..kept[team] {
                out[start + i].store(out[offset + i].load(Ordering::Relaxed), Ordering::Relaxed);
            }
            start += kept[team];
        }

        self.spread_remaining(start);

        let before: usize = partitions.iter().map(|&(_, len)| len).sum();
        let moved: usize = kept.iter().sum();
        let stats = CompressStats {
            duplicates_removed: before - moved,
            moved,
            compacted_len: start,
        };
        tracing::debug!(
            duplicates = stats.duplicates_removed,
            moved = stats.moved,
            compacted = stats.compacted_len,
            "compressed out-frontier"
        );
        stats
    }

    /// Removes the losers of the ownership race from one partition; returns the new size.
    fn dedupe_partition(&self, out: &[GhostAtomicUsize<'brand>], offset: usize, len: usize) -> usize {
        let survives = |pos: usize| self.owner.cell(out[pos].load(Ordering::Relaxed)).is_held_by(pos);

        let end = offset + len;
        let duplicates = (offset..end).filter(|&pos| !survives(pos)).count();
        let keep_end = end - duplicates;

        // Duplicates in the head and survivors in the tail are equal in number,
        // so every head duplicate finds a tail survivor without leaving the tail.
        let mut tail = end;
        for pos in offset..keep_end {
            if survives(pos) {
                continue;
            }
            loop {
                tail -= 1;
                debug_assert!(tail >= keep_end, "tail scan ran into the kept region");
                if survives(tail) {
                    out[pos].store(out[tail].load(Ordering::Relaxed), Ordering::Relaxed);
                    break;
                }
            }
        }
        keep_end - offset
    }

    /// Every team gets `remaining / teams` or one more slot, so no team is
    /// left empty while `remaining >= teams`.
    fn spread_remaining(&self, prefix: usize) {
        let teams = self.num_teams;
        let remaining = self.capacity - prefix;
        for team in 0..teams {
            self.out_sizes[team].store(0, Ordering::Relaxed);
            self.out_offsets[team].store(prefix + team * remaining / teams, Ordering::Relaxed);
        }
    }
}
