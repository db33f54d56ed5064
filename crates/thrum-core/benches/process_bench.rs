//! Criterion benchmarks for the engine's per-block process loop.
//!
//! Exercises the scheduler (§4.7) end to end: draining commands, walking
//! the node tree, and publishing outputs, with a varying number of active
//! synths mixing into a shared output bus. Run with: cargo bench -p thrum-core
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use thrum_core::{
    AddAction, AudioBusId, EngineResult, Environment, Options, PortBinding, PortDescriptor,
    PortDirection, PortType, SynthDef, SynthInstance, World,
};

/// A fixture synth definition writing a constant value to its single audio
/// output, used to populate the tree with a chosen number of active synths.
#[derive(Debug, Default)]
struct ConstSynth;

impl SynthDef for ConstSynth {
    fn uri(&self) -> &str {
        "bench:const"
    }

    fn port_descriptor(&self, index: u32) -> Option<PortDescriptor> {
        (index == 0).then(|| PortDescriptor::new(PortDirection::Output, PortType::Audio))
    }

    fn construct(
        &self,
        _world: &mut dyn World,
        _options: &[u8],
    ) -> EngineResult<Box<dyn SynthInstance>> {
        Ok(Box::new(ConstInstance))
    }
}

struct ConstInstance;

impl SynthInstance for ConstInstance {
    fn activate(&mut self, _world: &mut dyn World) {}

    fn process(&mut self, world: &mut dyn World, ports: &mut [PortBinding], num_frames: usize) {
        let Some(PortBinding::Bus(Some(bus))) = ports.first().copied() else {
            return;
        };
        let epoch = world.current_epoch();
        let Ok(bus) = world.bus_mut(bus) else {
            return;
        };
        let first_writer = !bus.is_live(epoch);
        let samples = bus.samples_mut();
        let n = num_frames.min(samples.len());
        for slot in samples.iter_mut().take(n) {
            *slot = if first_writer { 0.25 } else { *slot + 0.25 };
        }
        bus.mark_written(epoch);
    }
}

fn build_env_with_synths(block_size: usize, num_synths: usize) -> Environment {
    let (mut env, mut tx, _jobs) = Environment::new(Options {
        block_size,
        num_inputs: 0,
        num_outputs: 1,
        num_internal_buses: 1,
        max_num_nodes: num_synths + 4,
        max_commands_per_block: num_synths + 4,
        ..Options::default()
    });
    let root = env.root();
    let def = Arc::new(ConstSynth);
    // With num_inputs = 0, the first external output occupies bus index 0.
    let bus = AudioBusId::from_index(0);

    for _ in 0..num_synths {
        let (reply_tx, reply_rx) = std::sync::mpsc::channel();
        tx.try_send(thrum_core::RtCommand::CreateSynth {
            target: root,
            action: AddAction::AddToTail,
            def: def.clone(),
            options: Box::from([]),
            respond: Box::new(move |resp| {
                let _ = reply_tx.send(resp);
            }),
        })
        .unwrap();
        let mut out = vec![0.0f32; block_size];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut out];
            env.process(block_size, &[], &mut outputs).unwrap();
        }
        let thrum_core::Response::NodeCreated(node) = reply_rx.recv().unwrap() else {
            panic!("expected NodeCreated");
        };
        let (reply_tx, reply_rx) = std::sync::mpsc::channel();
        tx.try_send(thrum_core::RtCommand::MapPort {
            target: node,
            port_index: 0,
            bus,
            respond: Box::new(move |resp| {
                let _ = reply_tx.send(resp);
            }),
        })
        .unwrap();
        let mut out = vec![0.0f32; block_size];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut out];
            env.process(block_size, &[], &mut outputs).unwrap();
        }
        reply_rx.recv().unwrap();
    }

    env
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("Environment::process");

    for &num_synths in &[0usize, 8, 64, 256] {
        let block_size = 64;
        group.bench_with_input(
            BenchmarkId::from_parameter(num_synths),
            &num_synths,
            |b, &num_synths| {
                let mut env = build_env_with_synths(block_size, num_synths);
                let mut out = vec![0.0f32; block_size];
                b.iter(|| {
                    let mut outputs: [&mut [f32]; 1] = [&mut out];
                    black_box(env.process(block_size, &[], &mut outputs).unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_process);
criterion_main!(benches);
