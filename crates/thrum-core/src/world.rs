//! RT-thread facet exposed to synth instances (§4.9, §6).
//!
//! The source's `Methcla_World` is a function-pointer table handed to every
//! plugin callback. Here it's an object-safe trait: a concrete
//! [`Environment`](crate::environment::Environment) implements it and hands
//! out `&mut dyn World` for the duration of each `process` call, so a synth
//! can reach buses and schedule NRT follow-up work without holding a
//! reference to the engine itself.

extern crate alloc;

use alloc::boxed::Box;

use crate::bus::{AudioBus, AudioBusId};
use crate::epoch::Epoch;
use crate::error::EngineResult;

/// Deferred work a synth instance wants run later on the NRT thread, boxed
/// the same way the source's `performCommand(fn, data)` pairing is
/// unified here into a single closure (§9).
pub type NrtJob = Box<dyn FnOnce(&mut dyn crate::host::Host) + Send>;

/// The facet of the engine visible to synth instances while they run on the
/// RT thread.
pub trait World {
    /// The engine's current sample rate, fixed for the lifetime of a
    /// configuration (§9: no reconfiguration once running).
    fn sample_rate(&self) -> f64;

    /// The block size in frames for the current `process` call.
    fn block_size(&self) -> usize;

    /// The epoch stamped on buses written during the current block.
    fn current_epoch(&self) -> Epoch;

    /// Read-only access to a bus by id.
    ///
    /// # Errors
    /// Returns `InvalidBusId` if `id` is out of range.
    fn bus(&self, id: AudioBusId) -> EngineResult<&AudioBus>;

    /// Mutable access to a bus by id.
    ///
    /// # Errors
    /// Returns `InvalidBusId` if `id` is out of range.
    fn bus_mut(&mut self, id: AudioBusId) -> EngineResult<&mut AudioBus>;

    /// Enqueue work to run later on the NRT thread (§4.8 "RT-originated
    /// commands"). Fails with `QueueFull` if the RT-to-NRT queue has no
    /// room; callers should treat this as "try again next block" rather
    /// than a fatal error.
    ///
    /// # Errors
    /// Returns `QueueFull` if the outgoing queue has no capacity.
    fn schedule_nrt(&mut self, job: NrtJob) -> EngineResult<()>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A minimal `World` stand-in for node-table unit tests that never
    /// touch bus contents or NRT scheduling.
    #[derive(Default)]
    pub struct NullWorld;

    impl World for NullWorld {
        fn sample_rate(&self) -> f64 {
            48_000.0
        }

        fn block_size(&self) -> usize {
            64
        }

        fn current_epoch(&self) -> Epoch {
            Epoch::ZERO
        }

        fn bus(&self, _id: AudioBusId) -> EngineResult<&AudioBus> {
            Err(crate::error::EngineError::InvalidBusId)
        }

        fn bus_mut(&mut self, _id: AudioBusId) -> EngineResult<&mut AudioBus> {
            Err(crate::error::EngineError::InvalidBusId)
        }

        fn schedule_nrt(&mut self, _job: NrtJob) -> EngineResult<()> {
            Ok(())
        }
    }
}
