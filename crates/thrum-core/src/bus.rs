//! Audio bus registry (§3, §4.3).

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::epoch::Epoch;
use crate::error::{EngineError, EngineResult};

/// Identifies a bus in the registry.
///
/// External input buses, external output buses, and internal buses each
/// occupy their own contiguous index range within a single flat
/// `AudioBusId` space, assigned at `Environment` construction time: inputs
/// first, then outputs, then internal buses. This keeps bus lookup O(1)
/// without a tagged enum indirection on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioBusId(pub(crate) u32);

impl AudioBusId {
    /// The raw index into the bus registry.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Build an id from a raw index, e.g. one decoded off a `MapPort`
    /// request. Construction never fails; an out-of-range index is only
    /// discovered when the id is actually resolved through
    /// [`BusRegistry::bus`], which returns `InvalidBusId`.
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }
}

/// How a bus's backing storage is acquired.
enum BusStorage {
    /// Pointer-equivalent slice refreshed from the driver each block; not
    /// owned by the engine.
    ExternalInput,
    /// Slice refreshed from the driver each block; written by the engine.
    ExternalOutput,
    /// Owned by the engine, zeroed on first write of each epoch.
    Internal,
}

/// A block-sized sample buffer plus the epoch it was last written at.
pub struct AudioBus {
    storage: BusStorage,
    samples: Vec<f32>,
    epoch: Epoch,
}

impl AudioBus {
    fn new(storage: BusStorage, block_size: usize) -> Self {
        Self {
            storage,
            samples: vec![0.0; block_size],
            epoch: Epoch::ZERO,
        }
    }

    /// The buffer's contents, valid for the bus's `epoch`.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable access to the buffer's contents. Callers writing to a bus
    /// must also call [`AudioBus::mark_written`] to stamp the current
    /// epoch.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// The epoch this bus was last written at.
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Whether this bus has been written during `current_epoch`. A bus
    /// whose epoch lags the engine's current epoch reads as silence (§3
    /// invariant).
    #[must_use]
    pub fn is_live(&self, current_epoch: Epoch) -> bool {
        self.epoch == current_epoch
    }

    /// Stamp this bus as written during `current_epoch`.
    pub fn mark_written(&mut self, current_epoch: Epoch) {
        self.epoch = current_epoch;
    }

    fn resize(&mut self, block_size: usize) {
        self.samples.clear();
        self.samples.resize(block_size, 0.0);
    }
}

/// Fixed-size table of external-input, external-output, and internal audio
/// buses (§4.3).
pub struct BusRegistry {
    buses: Vec<AudioBus>,
    num_inputs: usize,
    num_outputs: usize,
    block_size: usize,
}

impl BusRegistry {
    /// Build a registry with `num_inputs` external-input buses,
    /// `num_outputs` external-output buses, and `num_internal` internal
    /// buses, each sized to `block_size` samples.
    #[must_use]
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        num_internal: usize,
        block_size: usize,
    ) -> Self {
        let mut buses = Vec::with_capacity(num_inputs + num_outputs + num_internal);
        for _ in 0..num_inputs {
            buses.push(AudioBus::new(BusStorage::ExternalInput, block_size));
        }
        for _ in 0..num_outputs {
            buses.push(AudioBus::new(BusStorage::ExternalOutput, block_size));
        }
        for _ in 0..num_internal {
            buses.push(AudioBus::new(BusStorage::Internal, block_size));
        }
        Self {
            buses,
            num_inputs,
            num_outputs,
            block_size,
        }
    }

    /// Id of the `index`-th external input bus.
    #[must_use]
    pub fn input_bus(&self, index: usize) -> Option<AudioBusId> {
        (index < self.num_inputs).then(|| AudioBusId(index as u32))
    }

    /// Id of the `index`-th external output bus.
    #[must_use]
    pub fn output_bus(&self, index: usize) -> Option<AudioBusId> {
        (index < self.num_outputs).then(|| AudioBusId((self.num_inputs + index) as u32))
    }

    /// Number of external input buses.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Number of external output buses.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Look up a bus by id. O(1); out-of-range ids fail with
    /// `InvalidBusId`.
    pub fn bus(&self, id: AudioBusId) -> EngineResult<&AudioBus> {
        self.buses
            .get(id.0 as usize)
            .ok_or(EngineError::InvalidBusId)
    }

    /// Mutable lookup by id.
    pub fn bus_mut(&mut self, id: AudioBusId) -> EngineResult<&mut AudioBus> {
        self.buses
            .get_mut(id.0 as usize)
            .ok_or(EngineError::InvalidBusId)
    }

    /// Refresh external input bus contents from driver-supplied slices, one
    /// per hardware input channel, called at the start of each block
    /// (§4.7 step 3).
    ///
    /// `num_frames` may be shorter than `block_size` (a partial block); a
    /// short driver-supplied slice is itself clamped to its own length
    /// rather than assumed to cover `num_frames`, since a partial cpal
    /// callback can hand over fewer samples than it asked to process. Any
    /// frames left over between what was copied and `num_frames` are
    /// zeroed rather than left holding a prior block's samples, since
    /// `bus.samples()` exposes the whole backing buffer to callers that
    /// don't themselves bound their reads to `num_frames`.
    pub fn refresh_inputs(&mut self, inputs: &[&[f32]], epoch: Epoch, num_frames: usize) {
        let frames = num_frames.min(self.block_size);
        for (index, input) in inputs.iter().enumerate().take(self.num_inputs) {
            let bus = &mut self.buses[index];
            let n = frames.min(input.len());
            bus.samples[..n].copy_from_slice(&input[..n]);
            bus.samples[n..frames].iter_mut().for_each(|s| *s = 0.0);
            bus.mark_written(epoch);
        }
    }

    /// Zero every external output bus, called at the start of each block
    /// (§4.7 step 4) before synths mix additively into them.
    pub fn zero_outputs(&mut self, epoch: Epoch, num_frames: usize) {
        let frames = num_frames.min(self.block_size);
        for index in 0..self.num_outputs {
            let bus = &mut self.buses[self.num_inputs + index];
            bus.samples[..frames].iter_mut().for_each(|s| *s = 0.0);
            bus.mark_written(epoch);
        }
    }

    /// Copy external output bus contents into driver-supplied slices after
    /// the tree walk completes.
    pub fn publish_outputs(&self, outputs: &mut [&mut [f32]], num_frames: usize) {
        for (index, output) in outputs.iter_mut().enumerate().take(self.num_outputs) {
            let bus = &self.buses[self.num_inputs + index];
            let n = output.len().min(bus.samples.len()).min(num_frames);
            output[..n].copy_from_slice(&bus.samples[..n]);
        }
    }

    /// Re-size every bus's backing buffer, used only during `configure`
    /// (never on the RT thread mid-stream — §9 forbids sample-rate/
    /// block-size changes after `configure`).
    pub fn resize_all(&mut self, block_size: usize) {
        self.block_size = block_size;
        for bus in &mut self.buses {
            bus.resize(block_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_bus_reads_as_silent() {
        let registry = BusRegistry::new(0, 0, 1, 4);
        let id = AudioBusId(0);
        let bus = registry.bus(id).unwrap();
        assert!(!bus.is_live(Epoch::ZERO.next()));
    }

    #[test]
    fn out_of_range_bus_is_invalid() {
        let registry = BusRegistry::new(1, 1, 0, 4);
        assert!(registry.bus(AudioBusId(5)).is_err());
    }

    #[test]
    fn zero_outputs_clears_and_stamps() {
        let mut registry = BusRegistry::new(0, 1, 0, 4);
        let id = registry.output_bus(0).unwrap();
        registry.bus_mut(id).unwrap().samples_mut().fill(1.0);
        let epoch = Epoch::ZERO.next();
        registry.zero_outputs(epoch, 4);
        let bus = registry.bus(id).unwrap();
        assert!(bus.samples().iter().all(|&s| s == 0.0));
        assert!(bus.is_live(epoch));
    }

    #[test]
    fn refresh_inputs_tolerates_short_driver_slice() {
        let mut registry = BusRegistry::new(1, 0, 0, 8);
        let id = registry.input_bus(0).unwrap();
        let short_input = [1.0f32, 2.0, 3.0];
        registry.refresh_inputs(&[&short_input], Epoch::ZERO.next(), 8);
        let bus = registry.bus(id).unwrap();
        assert_eq!(&bus.samples()[..3], &[1.0, 2.0, 3.0]);
        assert!(bus.samples()[3..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn refresh_inputs_clamps_to_num_frames() {
        let mut registry = BusRegistry::new(1, 0, 0, 8);
        let id = registry.input_bus(0).unwrap();
        registry.bus_mut(id).unwrap().samples_mut().fill(9.0);
        let full_input = [1.0f32; 8];
        registry.refresh_inputs(&[&full_input], Epoch::ZERO.next(), 3);
        let bus = registry.bus(id).unwrap();
        assert_eq!(&bus.samples()[..3], &[1.0, 1.0, 1.0]);
        assert_eq!(&bus.samples()[3..], &[9.0, 9.0, 9.0, 9.0, 9.0]);
    }
}
