//! `thrum:gain` - a minimal gain-staging `SynthDef` (§2 component 12).
//!
//! One audio input, one audio output, one control port holding the gain in
//! decibels. Exists so a graph can insert a level change without loading a
//! dynamic plugin, and gives the built-in set a second fixture alongside
//! `test:sine` that actually reads its input.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use thrum_core::{
    EngineResult, PortBinding, PortDescriptor, PortDirection, PortType, SynthDef, SynthInstance,
    World, db_to_linear,
};

use crate::port::{mix_audio, read_audio, read_control};

/// Default gain applied by a freshly constructed instance before any
/// `SetControl` has arrived: unity (0 dB).
const DEFAULT_GAIN_DB: f32 = 0.0;

/// Definition for `thrum:gain`: audio in (0), audio out (1), gain dB control (2).
#[derive(Debug, Default)]
pub struct Gain;

impl SynthDef for Gain {
    fn uri(&self) -> &str {
        "thrum:gain"
    }

    fn port_descriptor(&self, index: u32) -> Option<PortDescriptor> {
        match index {
            0 => Some(PortDescriptor::new(PortDirection::Input, PortType::Audio)),
            1 => Some(PortDescriptor::new(PortDirection::Output, PortType::Audio)),
            2 => Some(PortDescriptor::new(PortDirection::Input, PortType::Control)),
            _ => None,
        }
    }

    fn construct(
        &self,
        world: &mut dyn World,
        _options: &[u8],
    ) -> EngineResult<Box<dyn SynthInstance>> {
        Ok(Box::new(GainInstance {
            scratch: vec![0.0; world.block_size()],
        }))
    }
}

struct GainInstance {
    scratch: Vec<f32>,
}

impl SynthInstance for GainInstance {
    fn activate(&mut self, _world: &mut dyn World) {}

    fn process(&mut self, world: &mut dyn World, ports: &mut [PortBinding], num_frames: usize) {
        let (Some(&input), Some(&output), gain_db) = (ports.first(), ports.get(1), ports.get(2))
        else {
            return;
        };
        if self.scratch.len() < num_frames {
            self.scratch.resize(num_frames, 0.0);
        }
        let scratch = &mut self.scratch[..num_frames];
        read_audio(world, input, num_frames, scratch);

        let gain = db_to_linear(gain_db.copied().map_or(DEFAULT_GAIN_DB, |b| {
            read_control(b, DEFAULT_GAIN_DB)
        }));
        mix_audio(world, output, num_frames, |i| scratch[i] * gain);
    }
}
