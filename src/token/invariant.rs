use core::marker::PhantomData;

/// Brand marker carried by [`GhostToken`](super::GhostToken) and by every
/// pipe, atomic and race cell created under it.
///
/// `'id` is invariant, so two `GhostToken::new` scopes always produce
/// incompatible brands. A pipe initialized under one token cannot be
/// compressed or swapped with another:
///
/// ```rust,compile_fail
/// use lanepipe::{GhostToken, LaunchConfig, Pipe};
///
/// let config = LaunchConfig::for_lanes(1, 2, 1);
/// GhostToken::new(|mut outer| {
///     let pipe = Pipe::new(&config, 4, 4);
///     pipe.initialize(&mut outer);
///     GhostToken::new(|mut inner| {
///         pipe.compress(&mut inner);
///     });
/// });
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvariantLifetime<'id>(PhantomData<fn(&'id ()) -> &'id ()>);

impl<'id> InvariantLifetime<'id> {
    /// Creates the marker for a fresh brand scope.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}
