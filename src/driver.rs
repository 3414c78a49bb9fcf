//! The host-side level loop.
//!
//! ```text
//! while in-frontier not empty:
//!     outcome = program.run_level(level)
//!     compress
//!     overflowed? -> rerun the same level (bounded by max_retries)
//!     otherwise   -> swap slots, next level
//! ```
//!
//! A level may be rerun any number of times as long as each attempt grows
//! the compacted prefix; `max_retries` bounds the reruns in a row that make
//! no progress.
//!
//! A rerun keeps what the failed attempt already pushed: compress folds it
//! into the out-frontier prefix and hands the remaining capacity back to the
//! partitions. Programs must therefore only record a node as visited once its
//! push succeeded, so the rerun pushes exactly what was dropped.

use serde::Serialize;

use crate::config::LaunchConfig;
use crate::error::{FrontierError, Result};
use crate::frontier::Pipe;
use crate::scheduler::PassOutcome;
use crate::token::GhostToken;

/// One application's per-level work.
pub trait LevelProgram<'brand> {
    /// Runs every launch of `level` over the pipe's in-frontier.
    ///
    /// `level` counts completed levels, starting at 0 for the seeded frontier.
    ///
    /// # Errors
    /// Any error aborts the driver run and is returned unchanged.
    fn run_level(&mut self, level: usize, token: &GhostToken<'brand>, pipe: &Pipe<'brand>) -> Result<PassOutcome>;
}

/// Counters describing a finished driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverStats {
    /// Levels completed.
    pub levels: usize,
    /// Passes launched, reruns included.
    pub passes: usize,
    /// Reruns caused by out-frontier overflow.
    pub retries: usize,
    /// `true` if the run stopped at the level cap with work left.
    pub hit_level_cap: bool,
}

/// Alternates program passes with compress and swap until the frontier drains.
#[derive(Debug, Clone, Copy)]
pub struct LevelDriver {
    max_retries: usize,
    max_levels: Option<usize>,
}

impl LevelDriver {
    /// Creates a driver with `config`'s retry budget and no level cap.
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            max_levels: None,
        }
    }

    /// Stops after `max_levels` completed levels even if work remains.
    #[must_use]
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = Some(max_levels);
        self
    }

    /// Runs `program` until the in-frontier is empty or the level cap is hit.
    ///
    /// The pipe must already be initialized and seeded.
    ///
    /// # Errors
    /// - [`FrontierError::RetryLimit`] if a level overflows `max_retries + 1`
    ///   times in a row without its compacted prefix growing,
    /// - any error returned by the program.
    #[tracing::instrument(level = "debug", skip_all, fields(max_retries = self.max_retries))]
    pub fn run<'brand, P>(&self, token: &mut GhostToken<'brand>, pipe: &Pipe<'brand>, program: &mut P) -> Result<DriverStats>
    where
        P: LevelProgram<'brand> + ?Sized,
    {
        let mut stats = DriverStats::default();
        // Reruns in a row that did not grow the out-frontier prefix.
        let mut stalled = 0;
        let mut prefix = 0;
        loop {
            let frontier = pipe.in_frontier_len(token);
            if frontier == 0 {
                break;
            }
            if self.max_levels.is_some_and(|cap| stats.levels >= cap) {
                stats.hit_level_cap = true;
                break;
            }

            let level = stats.levels;
            let outcome = program.run_level(level, token, pipe)?;
            stats.passes += 1;
            let compressed = pipe.compress(token);
            tracing::debug!(level, frontier, ?outcome, next = compressed.compacted_len, "level pass done");

            if outcome.needs_retry() {
                if compressed.compacted_len > prefix {
                    stalled = 0;
                } else if stalled == self.max_retries {
                    return Err(FrontierError::RetryLimit { level, retries: stalled });
                } else {
                    stalled += 1;
                }
                prefix = compressed.compacted_len;
                stats.retries += 1;
                tracing::warn!(level, prefix, stalled, "out-frontier overflowed; rerunning level");
                continue;
            }

            pipe.swap_slots(token);
            stats.levels += 1;
            stalled = 0;
            prefix = 0;
        }
        tracing::info!(
            levels = stats.levels,
            passes = stats.passes,
            retries = stats.retries,
            "frontier drained"
        );
        Ok(stats)
    }
}
