//! Graph algorithms built on the scheduler, pipe and level driver.
//!
//! - [`bfs`]: level-synchronous BFS; levels are recorded only for pushes that
//!   landed, so overflowing levels can be rerun.
//! - [`pagerank`]: data-driven residual PageRank with per-team residuals.

pub mod bfs;
pub mod pagerank;

pub use bfs::{bfs, bfs_with_capacity, reference_bfs, BfsRun};
pub use pagerank::{pagerank, PageRankConfig, PageRankRun};
