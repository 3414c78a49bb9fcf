use core::{
    marker::PhantomData,
    sync::atomic::{AtomicBool, Ordering},
};

/// A branded `AtomicBool`.
///
/// Used for the per-pass overflow flag and the team-wide bidding flags.
#[repr(transparent)]
pub struct GhostAtomicBool<'brand> {
    inner: AtomicBool,
    _brand: PhantomData<&'brand mut ()>,
}

impl<'brand> GhostAtomicBool<'brand> {
    /// Creates a new branded atomic bool.
    #[inline(always)]
    pub const fn new(value: bool) -> Self {
        Self {
            inner: AtomicBool::new(value),
            _brand: PhantomData,
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> bool {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: bool, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Sets the flag, returning whether it was previously set.
    ///
    /// Overflow flags only ever move `false -> true` during a pass, so many lanes
    /// may raise the same flag without coordination.
    #[inline]
    pub fn raise(&self, order: Ordering) -> bool {
        self.inner.swap(true, order)
    }
}

impl core::fmt::Debug for GhostAtomicBool<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.load(Ordering::Relaxed), f)
    }
}

unsafe impl<'brand> Send for GhostAtomicBool<'brand> {}
unsafe impl<'brand> Sync for GhostAtomicBool<'brand> {}
