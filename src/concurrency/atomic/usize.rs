use core::{
    marker::PhantomData,
    sync::atomic::{AtomicUsize, Ordering},
};

/// A branded `AtomicUsize`.
///
/// Holds node ids in frontier buffers, partition sizes and offsets, and the
/// per-team fine-grained edge slots.
#[repr(transparent)]
pub struct GhostAtomicUsize<'brand> {
    inner: AtomicUsize,
    _brand: PhantomData<&'brand mut ()>,
}

impl<'brand> GhostAtomicUsize<'brand> {
    /// Creates a new branded atomic usize.
    #[inline(always)]
    pub const fn new(value: usize) -> Self {
        Self {
            inner: AtomicUsize::new(value),
            _brand: PhantomData,
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> usize {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: usize, order: Ordering) {
        self.inner.store(value, order);
    }

    /// Takes the current value and leaves `value` behind.
    #[inline(always)]
    pub fn swap(&self, value: usize, order: Ordering) -> usize {
        self.inner.swap(value, order)
    }

    /// Reserves `value` units, returning the first reserved index.
    #[inline(always)]
    pub fn fetch_add(&self, value: usize, order: Ordering) -> usize {
        self.inner.fetch_add(value, order)
    }

    /// Lowers the value to `value` if it is currently larger, returning the previous value.
    ///
    /// Partition counters use this to clamp an over-reserved size back to the
    /// partition bound. Concurrent clamps to the same bound commute.
    #[inline(always)]
    pub fn fetch_min(&self, value: usize, order: Ordering) -> usize {
        self.inner.fetch_min(value, order)
    }

    /// Consumes the atomic and returns the contained value.
    #[inline(always)]
    pub fn into_inner(self) -> usize {
        self.inner.into_inner()
    }
}

impl core::fmt::Debug for GhostAtomicUsize<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.load(Ordering::Relaxed), f)
    }
}

unsafe impl<'brand> Send for GhostAtomicUsize<'brand> {}
unsafe impl<'brand> Sync for GhostAtomicUsize<'brand> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_reservation_clamps_back_to_bound() {
        let size = GhostAtomicUsize::new(0);
        let bound = 4;
        let mut granted = 0;
        for _ in 0..10 {
            if size.fetch_add(1, Ordering::Relaxed) < bound {
                granted += 1;
            } else {
                size.fetch_min(bound, Ordering::Relaxed);
            }
        }
        assert_eq!(granted, bound);
        assert_eq!(size.into_inner(), bound);
    }
}
