//! Cross-thread resource handles (§3, §5).
//!
//! The source hands out `Methcla_Resource` ids backed by manual retain/
//! release counting so an NRT-allocated resource (a loaded sample buffer,
//! an open sound file) can be referenced from RT-side synth instances
//! without a use-after-free if the NRT side releases it first. `Arc`
//! already provides exactly this guarantee, so `Resource<T>` is a thin
//! newtype: the interesting property is that cloning it and dropping the
//! last clone from either thread is safe, not that it reimplements
//! refcounting by hand.

extern crate alloc;

use alloc::sync::Arc;

/// A reference-counted handle to engine-managed data shared between the
/// NRT thread that created it and RT-thread synth instances that read it.
///
/// `T` itself must be `Send + Sync`; the handle carries no interior
/// mutability of its own; share mutable state inside `T` the same way
/// `AudioBus` does, through a port-binding-driven handoff rather than a
/// lock.
#[derive(Debug)]
pub struct Resource<T: Send + Sync>(Arc<T>);

impl<T: Send + Sync> Resource<T> {
    /// Wrap `value` in a new resource handle.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Number of live handles referencing this resource, including `self`.
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl<T: Send + Sync> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Send + Sync> core::ops::Deref for Resource<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}
