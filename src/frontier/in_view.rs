//! Read-only in-frontier view bound to one pass.

use core::sync::atomic::Ordering;

use crate::concurrency::atomic::GhostAtomicUsize;
use crate::graph::NodeId;

/// The in-frontier as seen by lanes during a pass.
///
/// The size is read once when the view is created; the pipe cannot change it
/// while the view is alive because host phases need `&mut GhostToken`.
#[derive(Clone, Copy)]
pub struct InFrontierView<'a, 'brand> {
    nodes: &'a [GhostAtomicUsize<'brand>],
}

impl<'a, 'brand> InFrontierView<'a, 'brand> {
    pub(crate) fn new(nodes: &'a [GhostAtomicUsize<'brand>]) -> Self {
        Self { nodes }
    }

    /// Number of frontier nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the frontier is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the `index`th frontier node, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).map(|c| c.load(Ordering::Relaxed))
    }
}
