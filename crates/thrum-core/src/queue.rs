//! Bounded single-producer/single-consumer command queues (§4.2, §4.8).
//!
//! The source's `MessageQueue` is a fixed-capacity ring buffer of raw
//! request structs, shared between the RT and NRT threads via a
//! `WorkerThread` condvar. Here the same shape is built on `ringbuf`'s
//! lock-free SPSC ring buffer (already in this workspace's dependency
//! graph via the scheduling code this module replaces), split into a
//! `Sender`/`Receiver` pair per direction. `try_send` never blocks and
//! never allocates, matching the "RT thread never blocks" invariant (§5);
//! a full queue drops the newest command and reports `QueueFull` so the
//! dispatcher can retry or surface a timeout to its caller.

extern crate alloc;

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

use crate::command::RtCommand;
use crate::error::{EngineError, EngineResult};
use crate::world::NrtJob;

/// The producing half of a bounded command queue.
pub struct Sender<T> {
    inner: ringbuf::HeapProd<T>,
}

/// The consuming half of a bounded command queue.
pub struct Receiver<T> {
    inner: ringbuf::HeapCons<T>,
}

/// Build a fresh bounded queue with room for `capacity` items.
#[must_use]
pub fn channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (prod, cons) = HeapRb::<T>::new(capacity).split();
    (Sender { inner: prod }, Receiver { inner: cons })
}

impl<T> Sender<T> {
    /// Attempt to enqueue `item`, failing with `QueueFull` without
    /// blocking if the queue has no free slot.
    ///
    /// # Errors
    /// Returns `QueueFull` if the queue is at capacity.
    pub fn try_send(&mut self, item: T) -> EngineResult<()> {
        self.inner.try_push(item).map_err(|_| EngineError::QueueFull)
    }

    /// Number of free slots remaining.
    #[must_use]
    pub fn vacant_len(&self) -> usize {
        self.inner.vacant_len()
    }
}

impl<T> Receiver<T> {
    /// Drain at most one queued item, if any is available.
    pub fn try_recv(&mut self) -> Option<T> {
        self.inner.try_pop()
    }

    /// Drain every currently queued item, invoking `f` on each in FIFO
    /// order. Used by the RT thread to bound how much NRT-originated work
    /// it admits per block (§4.7 step 2) and by the NRT dispatcher loop to
    /// drain RT-originated jobs and responses.
    pub fn drain(&mut self, mut f: impl FnMut(T)) {
        while let Some(item) = self.inner.try_pop() {
            f(item);
        }
    }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.occupied_len()
    }

    /// Whether the queue currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.occupied_len() == 0
    }
}

/// Commands flowing from the dispatcher (NRT) to the engine (RT).
pub type RtCommandSender = Sender<RtCommand>;
/// Commands flowing from the dispatcher (NRT) to the engine (RT).
pub type RtCommandReceiver = Receiver<RtCommand>;

/// Jobs flowing from the engine (RT) to the dispatcher (NRT).
pub type NrtJobSender = Sender<NrtJob>;
/// Jobs flowing from the engine (RT) to the dispatcher (NRT).
pub type NrtJobReceiver = Receiver<NrtJob>;
