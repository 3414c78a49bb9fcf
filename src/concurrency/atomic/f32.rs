use core::{
    marker::PhantomData,
    sync::atomic::{AtomicU32, Ordering},
};

/// A branded `f32` cell backed by an `AtomicU32` holding the IEEE-754 bits.
///
/// PageRank residuals and probabilities use plain `load`/`store`: each cell
/// has a single writer at a time, either by ownership or through the
/// residual operator's race mutex.
#[repr(transparent)]
pub struct GhostAtomicF32<'brand> {
    bits: AtomicU32,
    _brand: PhantomData<&'brand mut ()>,
}

impl<'brand> GhostAtomicF32<'brand> {
    /// Creates a new branded atomic float.
    #[inline(always)]
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
            _brand: PhantomData,
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.bits.load(order))
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: f32, order: Ordering) {
        self.bits.store(value.to_bits(), order);
    }

    /// Swaps the current value, returning the previous value.
    #[inline(always)]
    pub fn swap(&self, value: f32, order: Ordering) -> f32 {
        f32::from_bits(self.bits.swap(value.to_bits(), order))
    }
}

impl core::fmt::Debug for GhostAtomicF32<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.load(Ordering::Relaxed), f)
    }
}

unsafe impl<'brand> Send for GhostAtomicF32<'brand> {}
unsafe impl<'brand> Sync for GhostAtomicF32<'brand> {}
