//! `thrum:oscillator` - a free-running sine-wave `SynthDef` (§2 component 12).
//!
//! One control port for frequency in Hz, one audio output. Reuses
//! [`thrum_core::Lfo`]'s phase accumulator at audio rate rather than
//! duplicating a sine generator; `Lfo` already produces an alias-free
//! \[-1.0, 1.0\] sine from a phase increment, which is exactly what an
//! oscillator node needs regardless of how slow the frequencies it was
//! originally written for are.

use alloc::boxed::Box;

use thrum_core::{
    EngineResult, Lfo, PortBinding, PortDescriptor, PortDirection, PortType, SynthDef,
    SynthInstance, World,
};

use crate::port::{mix_audio, read_control};

/// Default oscillator frequency before any `SetControl` has arrived.
const DEFAULT_FREQ_HZ: f32 = 440.0;

/// Definition for `thrum:oscillator`: frequency Hz control (0), audio out (1).
#[derive(Debug, Default)]
pub struct Oscillator;

impl SynthDef for Oscillator {
    fn uri(&self) -> &str {
        "thrum:oscillator"
    }

    fn port_descriptor(&self, index: u32) -> Option<PortDescriptor> {
        match index {
            0 => Some(PortDescriptor::new(PortDirection::Input, PortType::Control)),
            1 => Some(PortDescriptor::new(PortDirection::Output, PortType::Audio)),
            _ => None,
        }
    }

    fn construct(
        &self,
        world: &mut dyn World,
        _options: &[u8],
    ) -> EngineResult<Box<dyn SynthInstance>> {
        Ok(Box::new(OscillatorInstance {
            lfo: Lfo::new(world.sample_rate() as f32, DEFAULT_FREQ_HZ),
        }))
    }
}

struct OscillatorInstance {
    lfo: Lfo,
}

impl SynthInstance for OscillatorInstance {
    fn activate(&mut self, _world: &mut dyn World) {}

    fn process(&mut self, world: &mut dyn World, ports: &mut [PortBinding], num_frames: usize) {
        let (Some(freq), Some(&output)) = (ports.first(), ports.get(1)) else {
            return;
        };
        self.lfo
            .set_frequency(read_control(*freq, DEFAULT_FREQ_HZ));
        let lfo = &mut self.lfo;
        mix_audio(world, output, num_frames, |_| lfo.next());
    }
}
