//! The lane grid: one scoped OS thread per lane, grouped into teams.
//!
//! A launch shares `&GhostToken<'brand>` with every lane, stages one
//! [`OutFrontierView`] per team before the lanes start and publishes them once
//! every lane has joined. Lanes of one team meet only at their team's
//! [`TeamBarrier`]; teams never wait for each other.

use core::sync::atomic::Ordering;

use crate::concurrency::atomic::GhostAtomicBool;
use crate::concurrency::{PoisonOnPanic, TeamBarrier};
use crate::config::LaunchConfig;
use crate::error::{FrontierError, Result};
use crate::frontier::{OutFrontierView, Pipe};
use crate::graph::NodeId;
use crate::token::GhostToken;

use super::PassOutcome;

/// Execution context handed to a lane body and to every operator call.
pub struct Lane<'a, 'brand> {
    team_id: usize,
    lane_id: usize,
    config: &'a LaunchConfig,
    barrier: &'a TeamBarrier,
    out: &'a OutFrontierView<'a, 'brand>,
    overflow: &'a GhostAtomicBool<'brand>,
}

impl<'a, 'brand> Lane<'a, 'brand> {
    /// Team this lane belongs to.
    #[inline]
    pub fn team_id(&self) -> usize {
        self.team_id
    }

    /// Position of the lane inside its team.
    #[inline]
    pub fn lane_id(&self) -> usize {
        self.lane_id
    }

    /// Position of the lane in the whole grid.
    #[inline]
    pub fn global_id(&self) -> usize {
        self.team_id * self.config.team_size + self.lane_id
    }

    /// Sub-group this lane belongs to inside its team.
    #[inline]
    pub fn subgroup_id(&self) -> usize {
        self.lane_id / self.config.subgroup_size
    }

    /// Position of the lane inside its sub-group.
    #[inline]
    pub fn subgroup_lane(&self) -> usize {
        self.lane_id % self.config.subgroup_size
    }

    /// Shape of the grid this lane runs in.
    #[inline]
    pub fn config(&self) -> &LaunchConfig {
        self.config
    }

    /// Waits for every lane of the team. Returns `true` on exactly one lane.
    ///
    /// Only call this from code that every lane of the team reaches the same
    /// number of times, otherwise the team deadlocks.
    #[inline]
    pub fn barrier(&self) -> bool {
        self.barrier.wait()
    }

    /// Pushes `node` into the team's out-frontier partition.
    ///
    /// A full partition raises the pass's overflow flag and returns `false`.
    /// Sentinels such as [`NO_NODE`](crate::graph::NO_NODE) are dropped:
    /// the call returns `false` and leaves the flag alone.
    #[inline]
    pub fn push(&self, node: NodeId) -> bool {
        if !self.out.accepts(node) {
            return false;
        }
        if self.out.push(node) {
            return true;
        }
        self.overflow.raise(Ordering::Relaxed);
        false
    }
}

/// Launches lane bodies over a validated [`LaunchConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    config: LaunchConfig,
}

impl Grid {
    /// Creates a grid after validating `config`.
    ///
    /// # Errors
    /// Returns [`FrontierError::InvalidConfig`] if the configuration is inconsistent.
    pub fn new(config: LaunchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The grid's configuration.
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Runs `body` once on every lane of the grid.
    ///
    /// # Errors
    /// - [`FrontierError::InvalidConfig`] if `pipe` was built for another team count,
    /// - [`FrontierError::LaneFault`] if any lane panicked; nothing is published.
    pub fn launch<'brand, F>(&self, token: &GhostToken<'brand>, pipe: &Pipe<'brand>, body: F) -> Result<PassOutcome>
    where
        F: for<'l> Fn(&Lane<'l, 'brand>) + Sync,
    {
        self.launch_with(token, pipe, |_| (), |lane, _| body(lane))
    }

    /// Runs `body` on every lane, handing each team a scratch value built by `scratch`.
    ///
    /// # Errors
    /// Same as [`launch`](Self::launch).
    pub fn launch_with<'brand, S, M, F>(
        &self,
        token: &GhostToken<'brand>,
        pipe: &Pipe<'brand>,
        scratch: M,
        body: F,
    ) -> Result<PassOutcome>
    where
        S: Sync,
        M: Fn(usize) -> S,
        F: for<'l> Fn(&Lane<'l, 'brand>, &S) + Sync,
    {
        let config = &self.config;
        if pipe.num_teams() != config.num_teams {
            return Err(FrontierError::InvalidConfig(format!(
                "pipe has {} partitions but the grid launches {} teams",
                pipe.num_teams(),
                config.num_teams
            )));
        }
        tracing::trace!(
            teams = config.num_teams,
            team_size = config.team_size,
            "launching lane grid"
        );

        let overflow = GhostAtomicBool::new(false);
        let views: Vec<OutFrontierView<'_, 'brand>> =
            (0..config.num_teams).map(|team| pipe.stage_out(token, team)).collect();
        let barriers: Vec<TeamBarrier> =
            (0..config.num_teams).map(|_| TeamBarrier::new(config.team_size)).collect();
        let scratch: Vec<S> = (0..config.num_teams).map(scratch).collect();

        let fault = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(config.total_lanes());
            for team_id in 0..config.num_teams {
                for lane_id in 0..config.team_size {
                    let lane = Lane {
                        team_id,
                        lane_id,
                        config,
                        barrier: &barriers[team_id],
                        out: &views[team_id],
                        overflow: &overflow,
                    };
                    let (body, scratch) = (&body, &scratch[team_id]);
                    let handle = scope.spawn(move || {
                        let _guard = PoisonOnPanic::new(lane.barrier);
                        body(&lane, scratch);
                    });
                    handles.push((team_id, handle));
                }
            }
            handles
                .into_iter()
                .filter_map(|(team, handle)| handle.join().err().map(|_| team))
                .min()
        });

        if let Some(team) = fault {
            tracing::error!(team, "lane panicked; abandoning pass");
            return Err(FrontierError::LaneFault { team });
        }
        for view in views {
            view.publish_local();
        }
        Ok(if overflow.load(Ordering::Relaxed) {
            PassOutcome::Overflowed
        } else {
            PassOutcome::Complete
        })
    }
}
