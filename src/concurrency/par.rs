//! Host-side index maps that fan out over rayon when `parallel` is enabled.
//!
//! These run between launches (compress phases, application state setup),
//! never inside a pass, so they may freely use a work-stealing pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps `f` over `0..n`, collecting results in index order.
#[cfg(feature = "parallel")]
pub(crate) fn map_indices<R, F>(n: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    (0..n).into_par_iter().map(f).collect()
}

/// Maps `f` over `0..n`, collecting results in index order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_indices<R, F>(n: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    (0..n).map(f).collect()
}

/// Runs `f` for every index in `0..n`.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_index<F>(n: usize, f: F)
where
    F: Fn(usize) + Sync + Send,
{
    (0..n).into_par_iter().for_each(f);
}

/// Runs `f` for every index in `0..n`.
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_index<F>(n: usize, f: F)
where
    F: Fn(usize) + Sync + Send,
{
    (0..n).for_each(f);
}
