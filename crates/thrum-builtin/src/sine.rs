//! `test:sine` - a fixed-output fixture synth.
//!
//! Writes a constant 0.5 to its single audio output every block. Used by
//! integration tests and examples that need a synth definition with
//! deterministic, non-silent output and no parameters to configure.

use alloc::boxed::Box;

use thrum_core::{
    EngineResult, PortBinding, PortDescriptor, PortDirection, PortType, SynthDef, SynthInstance,
    World,
};

use crate::port::mix_audio;

/// Definition for `test:sine`: one audio output, no inputs, no controls.
#[derive(Debug, Default)]
pub struct TestSine;

impl SynthDef for TestSine {
    fn uri(&self) -> &str {
        "test:sine"
    }

    fn port_descriptor(&self, index: u32) -> Option<PortDescriptor> {
        match index {
            0 => Some(PortDescriptor::new(PortDirection::Output, PortType::Audio)),
            _ => None,
        }
    }

    fn construct(&self, _world: &mut dyn World, _options: &[u8]) -> EngineResult<Box<dyn SynthInstance>> {
        Ok(Box::new(TestSineInstance))
    }
}

struct TestSineInstance;

impl SynthInstance for TestSineInstance {
    fn activate(&mut self, _world: &mut dyn World) {}

    fn process(&mut self, world: &mut dyn World, ports: &mut [PortBinding], num_frames: usize) {
        if let Some(&out) = ports.first() {
            mix_audio(world, out, num_frames, |_| 0.5);
        }
    }
}
