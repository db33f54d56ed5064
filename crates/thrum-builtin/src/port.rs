//! Shared helpers for reading and mixing into ports, used by every
//! `SynthInstance` in this crate.
//!
//! A synth's `process` implementation must add its contribution to an
//! output bus rather than overwrite it outright (several synths can share
//! an internal bus as a summing point), while still treating a bus left
//! over from a previous block as silence rather than stale audio. The two
//! halves of that contract - "first writer zeros, later writers add" and
//! "a bus not written this epoch reads as silence" - are pulled out here so
//! each synth only states what to read and what to generate.

use thrum_core::{AudioBusId, PortBinding, World};

/// Read `num_frames` samples from `binding` into `out`, treating an
/// unconnected port or a bus not written this epoch as silence.
pub(crate) fn read_audio(world: &dyn World, binding: PortBinding, num_frames: usize, out: &mut [f32]) {
    let epoch = world.current_epoch();
    let live = match binding {
        PortBinding::Bus(Some(id)) => world
            .bus(id)
            .ok()
            .filter(|bus| bus.is_live(epoch))
            .map(|bus| &bus.samples()[..num_frames.min(bus.samples().len())]),
        _ => None,
    };
    match live {
        Some(samples) => {
            out[..samples.len()].copy_from_slice(samples);
            out[samples.len()..num_frames.min(out.len())].fill(0.0);
        }
        None => out[..num_frames.min(out.len())].fill(0.0),
    }
}

/// Mix `num_frames` samples of `binding`, generated on demand by `gen`, into
/// the bound bus. Zeros the bus first if nothing else has written to it
/// this epoch; otherwise adds to whatever is already there. A no-op if the
/// port is unconnected.
pub(crate) fn mix_audio(
    world: &mut dyn World,
    binding: PortBinding,
    num_frames: usize,
    mut gen: impl FnMut(usize) -> f32,
) {
    let PortBinding::Bus(Some(id)) = binding else {
        return;
    };
    mix_into(world, id, num_frames, gen);
}

fn mix_into(world: &mut dyn World, id: AudioBusId, num_frames: usize, mut gen: impl FnMut(usize) -> f32) {
    let epoch = world.current_epoch();
    let Ok(bus) = world.bus_mut(id) else {
        return;
    };
    let first_writer = !bus.is_live(epoch);
    let samples = bus.samples_mut();
    let n = num_frames.min(samples.len());
    for (i, slot) in samples.iter_mut().take(n).enumerate() {
        let value = gen(i);
        *slot = if first_writer { value } else { *slot + value };
    }
    bus.mark_written(epoch);
}

/// Read a control port's current value, or `default` if unconnected (which
/// should not happen for a well-formed graph, but synths must not panic on
/// it).
pub(crate) fn read_control(binding: PortBinding, default: f32) -> f32 {
    match binding {
        PortBinding::Control(v) => v,
        PortBinding::Bus(_) => default,
    }
}
