//! Team synchronization.

pub mod team_barrier;

pub use team_barrier::{PoisonOnPanic, TeamBarrier};

#[cfg(test)]
mod tests;
