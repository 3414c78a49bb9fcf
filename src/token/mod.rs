//! `GhostToken` - the phase capability for frontier state.
//!
//! Every frontier structure in this crate is branded with a `'brand` lifetime
//! and gated by the matching `GhostToken<'brand>`:
//!
//! - **Host phases** (`Pipe::initialize`, `Pipe::seed`, `Pipe::compress`,
//!   `Pipe::swap_slots`) take `&mut GhostToken<'brand>`.
//! - **Passes** (`Scheduler::run_pass`, `Grid::launch`) take `&GhostToken<'brand>`
//!   and share it with every lane thread.
//!
//! Rust forbids a live `&mut` and `&` of the same token at once, so a compress
//! can never run while lanes are still pushing into the out-frontier.
//!
//! ## Core invariant (linearity)
//!
//! `GhostToken<'brand>` is intentionally **not** `Copy`/`Clone`.

/// Invariant lifetime definitions for branding.
pub mod invariant;

pub use invariant::InvariantLifetime;

/// A zero-sized token that controls access to branded frontier state.
#[derive(Debug)]
pub struct GhostToken<'brand>(InvariantLifetime<'brand>);

impl<'brand> GhostToken<'brand> {
    /// Creates a new token and executes a closure with it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lanepipe::{GhostToken, LaunchConfig, Pipe};
    ///
    /// GhostToken::new(|mut token| {
    ///     let config = LaunchConfig::for_lanes(2, 4, 2);
    ///     let pipe = Pipe::new(&config, 16, 16);
    ///     pipe.initialize(&mut token);
    ///     assert_eq!(pipe.in_frontier_len(&token), 0);
    /// });
    /// ```
    pub fn new<F, R>(f: F) -> R
    where
        F: for<'new_brand> FnOnce(GhostToken<'new_brand>) -> R,
    {
        f(GhostToken(InvariantLifetime::default()))
    }
}

// Sharing `&GhostToken<'brand>` across lane threads only unlocks pass-phase
// operations, which are all atomic. Host phases still need `&mut`, which the
// borrow checker keeps exclusive.
unsafe impl<'brand> Sync for GhostToken<'brand> {}
