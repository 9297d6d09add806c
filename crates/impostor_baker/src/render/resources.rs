//! Scoped bake resources
//!
//! Proxy trees, capture cameras, and render targets are acquired through a
//! [`ResourceTracker`]. Each acquisition returns a [`Tracked`] guard that
//! releases the resource when dropped, so every early return, `?`, or panic
//! unwinding through the pipeline gives the resource back. The tracker counts
//! live resources, which lets callers verify that nothing outlives a bake.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};

/// Kind of bake-scoped resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Render-only mirror of the source hierarchy
    ProxyTree,
    /// Orthographic capture camera
    Camera,
    /// Off-screen color/depth target
    RenderTarget,
}

impl ResourceKind {
    const ALL: [ResourceKind; 3] = [Self::ProxyTree, Self::Camera, Self::RenderTarget];

    fn slot(self) -> usize {
        match self {
            Self::ProxyTree => 0,
            Self::Camera => 1,
            Self::RenderTarget => 2,
        }
    }
}

/// Counts live and total acquisitions per resource kind
///
/// Single-threaded by construction (`Cell` counters); a tracker belongs to
/// one pipeline and therefore to one rasterization context.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    live: [Cell<usize>; 3],
    acquired: [Cell<usize>; 3],
}

impl ResourceTracker {
    /// Create a tracker with no live resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `value` until the returned guard is dropped
    pub fn acquire<T>(&self, kind: ResourceKind, value: T) -> Tracked<'_, T> {
        let slot = kind.slot();
        self.live[slot].set(self.live[slot].get() + 1);
        self.acquired[slot].set(self.acquired[slot].get() + 1);
        log::trace!("Acquired {:?} ({} live)", kind, self.live[slot].get());
        Tracked { value, kind, tracker: self }
    }

    fn release(&self, kind: ResourceKind) {
        let slot = kind.slot();
        self.live[slot].set(self.live[slot].get().saturating_sub(1));
        log::trace!("Released {:?} ({} live)", kind, self.live[slot].get());
    }

    /// Number of live resources of one kind
    pub fn live(&self, kind: ResourceKind) -> usize {
        self.live[kind.slot()].get()
    }

    /// Number of live resources of every kind
    pub fn live_total(&self) -> usize {
        ResourceKind::ALL.iter().map(|kind| self.live(*kind)).sum()
    }

    /// Number of acquisitions of one kind since the tracker was created
    pub fn acquired(&self, kind: ResourceKind) -> usize {
        self.acquired[kind.slot()].get()
    }
}

/// Guard owning a tracked resource
pub struct Tracked<'t, T> {
    value: T,
    kind: ResourceKind,
    tracker: &'t ResourceTracker,
}

impl<T> Tracked<'_, T> {
    /// Kind this guard was acquired as
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl<T> Deref for Tracked<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Tracked<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for Tracked<'_, T> {
    fn drop(&mut self) {
        self.tracker.release(self.kind);
    }
}
