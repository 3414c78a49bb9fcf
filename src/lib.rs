//! # `lanepipe` - degree-aware edge scheduling over a partitioned frontier
//!
//! Irregular graph analytics (BFS, PageRank) spend a pass visiting every
//! outgoing edge of every node in a frontier. Out-degrees vary by orders of
//! magnitude, so a lane per node leaves most lanes idle behind one hub. This
//! crate provides:
//!
//! - a **multi-tier scheduler** that hands each frontier node's edges to the
//!   whole team, to one sub-group, or to a shared fine-grained edge buffer,
//!   depending on its degree;
//! - a **frontier pipe** whose out-frontier is split into one partition per
//!   team, so pushes never contend across teams, and which later removes
//!   duplicates and compacts the partitions into one contiguous frontier;
//! - a **level driver** that alternates passes with compress/swap and reruns
//!   a level whose out-frontier overflowed.
//!
//! ## Execution model
//!
//! Lanes are scoped OS threads. `num_teams × team_size` lanes form one pass;
//! lanes of a team meet at a team barrier, teams never wait for each other.
//!
//! ## Phase safety
//!
//! All frontier state is branded with the `'brand` of a [`GhostToken`].
//! Host phases take `&mut GhostToken`, passes share `&GhostToken` with every
//! lane, so the borrow checker rules out a compress racing a pass.
//!
//! ## Races on purpose
//!
//! Team bids, sub-group bids, the dedupe ownership table and the PageRank
//! mutex are any-winner races expressed through [`RaceCell`]. Which lane wins
//! is unspecified; every outcome is correct.
//!
//! ```rust
//! use lanepipe::{apps::bfs, CsrGraph, LaunchConfig};
//!
//! let graph = CsrGraph::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();
//! let run = bfs(&graph, 0, LaunchConfig::for_lanes(2, 4, 2)).unwrap();
//! assert_eq!(run.levels, vec![Some(0), Some(1), Some(1), Some(2)]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod apps;
pub mod concurrency;
pub mod config;
pub mod driver;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod scheduler;
pub mod token;

pub use concurrency::{RaceCell, RaceTable, TeamBarrier};
pub use config::LaunchConfig;
pub use driver::{DriverStats, LevelDriver, LevelProgram};
pub use error::{FrontierError, Result};
pub use frontier::{CompressStats, InFrontierView, OutFrontierView, Pipe, PipeSnapshot};
pub use graph::{CsrGraph, EdgeId, GraphView, NodeId, NO_EDGE, NO_NODE};
pub use scheduler::{EdgeOperator, Grid, Lane, PassOutcome, Scheduler};
pub use token::GhostToken;

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Tokens are ZSTs.
    assert!(mem::size_of::<GhostToken<'static>>() == 0);

    // Branded atomics and race cells are exactly their raw atomic.
    assert!(
        mem::size_of::<concurrency::atomic::GhostAtomicUsize<'static>>()
            == mem::size_of::<core::sync::atomic::AtomicUsize>()
    );
    assert!(mem::size_of::<RaceCell<'static>>() == mem::size_of::<usize>());
    assert!(
        mem::size_of::<concurrency::atomic::GhostAtomicF32<'static>>() == mem::size_of::<u32>()
    );
};
