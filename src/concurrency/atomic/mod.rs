//! Branded atomic primitives for frontier state.
//!
//! The brand is compile-time only; each type is `repr(transparent)` over the
//! matching `core::sync::atomic` type so the wrapper costs nothing at runtime.

/// Branded `AtomicBool`.
pub mod bool;
/// Branded `f32` stored in an `AtomicU32`.
pub mod f32;
/// Branded `AtomicUsize`.
pub mod usize;

pub use self::bool::GhostAtomicBool;
pub use self::f32::GhostAtomicF32;
pub use self::usize::GhostAtomicUsize;
