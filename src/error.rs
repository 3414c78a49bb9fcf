//! Error types for frontier scheduling.
//!
//! Partition overflow is *not* an error: it is reported as
//! [`PassOutcome::Overflowed`](crate::scheduler::PassOutcome) and recovered by
//! the level driver. Only exhausted recovery, bad inputs and lane faults end up
//! here.

/// Errors produced by the pipe, scheduler, driver and applications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontierError {
    /// The launch configuration is inconsistent.
    #[error("invalid launch configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(String),

    /// CSR offsets/destinations do not describe a graph.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A node id is outside `[0, node_count)`.
    #[error("node {node} out of range for graph with {node_count} nodes")]
    NodeOutOfRange {
        /// The offending node id.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// More nodes were seeded than the frontier buffer can hold.
    #[error("cannot seed {requested} nodes into a frontier of capacity {capacity}")]
    CapacityExceeded {
        /// Number of nodes requested.
        requested: usize,
        /// Buffer capacity.
        capacity: usize,
    },

    /// A level kept overflowing the out-frontier without its compacted prefix growing.
    #[error("level {level} still overflowed after {retries} compress+retry cycles without progress")]
    RetryLimit {
        /// Level that could not complete.
        level: usize,
        /// Reruns in a row that made no progress.
        retries: usize,
    },

    /// A lane panicked during a launch. Fatal for the whole pass.
    #[error("lane fault in team {team}; pass abandoned")]
    LaneFault {
        /// Lowest team with a faulted lane.
        team: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = FrontierError> = core::result::Result<T, E>;

impl From<serde_json::Error> for FrontierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
