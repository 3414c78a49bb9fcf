//! Concurrency building blocks for lanes and teams.
//!
//! Everything here is either an atomic, an any-winner race cell, or a team
//! barrier. There is no cross-team blocking primitive: teams only meet through
//! the frontier pipe's atomics.

pub mod atomic;
pub(crate) mod par;
pub mod race;
pub mod sync;

pub use race::{RaceCell, RaceTable};
pub use sync::{PoisonOnPanic, TeamBarrier};
