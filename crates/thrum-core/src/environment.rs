//! Top-level engine instance: owns the node tree, bus registry, and the
//! RT/NRT command queues that connect them to the outside world (§4.7,
//! §6).
//!
//! Corresponds to the source's `Environment`/`Options` pairing: `Options`
//! is the immutable configuration chosen once at startup, `Environment` is
//! the live instance built from it. `Environment::new` returns the engine
//! instance plus the two queue endpoints a caller on the NRT/dispatcher
//! side needs to talk to it — there is no single object implementing both
//! `World` and "the thing you hand a driver," because the RT and NRT
//! halves of the engine never share a thread.

extern crate alloc;

use alloc::boxed::Box;

use crate::bus::{AudioBus, AudioBusId, BusRegistry};
use crate::command::{Response, RtCommand};
use crate::epoch::Epoch;
use crate::error::{EngineError, EngineResult};
use crate::node::{AddAction, NodeId, NodeTable};
use crate::queue::{self, NrtJobReceiver, NrtJobSender, RtCommandReceiver, RtCommandSender};
use crate::world::{NrtJob, World};

/// Immutable engine configuration, chosen once at startup and never
/// changed for the lifetime of an `Environment` (§9: no sample-rate or
/// block-size reconfiguration while running).
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Audio sample rate in Hz.
    pub sample_rate: f64,
    /// Frames processed per `process` call.
    pub block_size: usize,
    /// Number of external input channels.
    pub num_inputs: usize,
    /// Number of external output channels.
    pub num_outputs: usize,
    /// Number of internal (non-external) audio buses.
    pub num_internal_buses: usize,
    /// Maximum number of live nodes (§4.5).
    pub max_num_nodes: usize,
    /// Capacity of the NRT-to-RT command queue (§4.2).
    pub rt_command_queue_size: usize,
    /// Capacity of the RT-to-NRT job queue (§4.2).
    pub nrt_job_queue_size: usize,
    /// Maximum number of queued commands drained per block (§4.7 step 2);
    /// bounds how much structural work one block can absorb.
    pub max_commands_per_block: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 64,
            num_inputs: 2,
            num_outputs: 2,
            num_internal_buses: 32,
            max_num_nodes: 1024,
            rt_command_queue_size: 256,
            nrt_job_queue_size: 256,
            max_commands_per_block: 64,
        }
    }
}

/// The `World` implementation backing an `Environment`'s RT thread.
/// Deliberately holds no reference to the node table: `Environment::process`
/// passes `&mut` borrows of this and the table as disjoint fields, which is
/// what lets a synth's `process` call receive `&mut dyn World` while the
/// tree walk is still holding `&mut NodeTable` (§9).
struct RtState {
    buses: BusRegistry,
    epoch: Epoch,
    block_size: usize,
    sample_rate: f64,
    nrt_jobs: NrtJobSender,
}

impl World for RtState {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn current_epoch(&self) -> Epoch {
        self.epoch
    }

    fn bus(&self, id: AudioBusId) -> EngineResult<&AudioBus> {
        self.buses.bus(id)
    }

    fn bus_mut(&mut self, id: AudioBusId) -> EngineResult<&mut AudioBus> {
        self.buses.bus_mut(id)
    }

    fn schedule_nrt(&mut self, job: NrtJob) -> EngineResult<()> {
        self.nrt_jobs.try_send(job)
    }
}

/// The live engine instance. Runs entirely on the RT thread once built;
/// [`Environment::new`] hands back the two queue endpoints a caller wires
/// up to its NRT-side dispatcher.
pub struct Environment {
    rt: RtState,
    nodes: NodeTable,
    incoming: RtCommandReceiver,
    max_commands_per_block: usize,
}

impl Environment {
    /// Build a new engine instance from `options`, returning it alongside
    /// the sender the NRT side uses to submit commands and the receiver it
    /// uses to drain RT-originated jobs.
    #[must_use]
    pub fn new(options: Options) -> (Self, RtCommandSender, NrtJobReceiver) {
        let (command_tx, command_rx) = queue::channel(options.rt_command_queue_size);
        let (job_tx, job_rx) = queue::channel(options.nrt_job_queue_size);

        let env = Self {
            rt: RtState {
                buses: BusRegistry::new(
                    options.num_inputs,
                    options.num_outputs,
                    options.num_internal_buses,
                    options.block_size,
                ),
                epoch: Epoch::ZERO,
                block_size: options.block_size,
                sample_rate: options.sample_rate,
                nrt_jobs: job_tx,
            },
            nodes: NodeTable::new(options.max_num_nodes),
            incoming: command_rx,
            max_commands_per_block: options.max_commands_per_block,
        };
        (env, command_tx, job_rx)
    }

    /// The root group every node is ultimately a descendant of.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.nodes.root()
    }

    /// The block size this environment was configured with (§4.7); the
    /// largest `num_frames` a call to [`Environment::process`] will accept.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.rt.block_size
    }

    /// Run one block of `num_frames` frames: drain at most
    /// `max_commands_per_block` queued commands, refresh I/O buses, walk
    /// the node tree, then publish outputs and reset triggers (§4.7).
    ///
    /// `num_frames` must not exceed the configured block size; `inputs`/
    /// `outputs` are driver-supplied per-channel slices, each expected to
    /// hold at least `num_frames` samples (a shorter slice is itself
    /// tolerated, per §7 "the RT thread continues producing silence for the
    /// affected subtree rather than stopping" — see [`BusRegistry::refresh_inputs`]).
    ///
    /// `num_frames == 0` is a no-op except for the epoch increment (§8
    /// boundary behavior): no commands are drained, no bus is touched, and
    /// the tree is not walked.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidArgument`] if `num_frames` exceeds the
    /// configured block size; the epoch is not advanced in that case.
    pub fn process(
        &mut self,
        num_frames: usize,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
    ) -> EngineResult<()> {
        if num_frames > self.rt.block_size {
            return Err(EngineError::InvalidArgument(alloc::format!(
                "num_frames {num_frames} exceeds block_size {}",
                self.rt.block_size
            )));
        }

        self.rt.epoch = self.rt.epoch.next();
        let epoch = self.rt.epoch;

        if num_frames == 0 {
            return Ok(());
        }

        let mut drained = 0;
        while drained < self.max_commands_per_block {
            let Some(command) = self.incoming.try_recv() else {
                break;
            };
            self.apply(command);
            drained += 1;
        }

        self.rt.buses.refresh_inputs(inputs, epoch, num_frames);
        self.rt.buses.zero_outputs(epoch, num_frames);

        self.nodes.walk_process(&mut self.rt, num_frames);
        self.nodes.clear_triggers();

        self.rt.buses.publish_outputs(outputs, num_frames);
        Ok(())
    }

    fn apply(&mut self, command: RtCommand) {
        match command {
            RtCommand::CreateGroup {
                target,
                action,
                respond,
            } => {
                let result = self.nodes.insert_group(target, action);
                respond(to_response(result));
            }
            RtCommand::CreateSynth {
                target,
                action,
                def,
                options,
                respond,
            } => {
                let result =
                    self.nodes
                        .insert_synth(target, action, def, &mut self.rt, &options);
                respond(to_response(result));
            }
            RtCommand::FreeNode { target, respond } => {
                let result = self.free_subtree(target);
                respond(match result {
                    Ok(()) => Response::Ok,
                    Err(e) => Response::Err(e),
                });
            }
            RtCommand::MapPort {
                target,
                port_index,
                bus,
                respond,
            } => {
                let result = self.nodes.map_port(target, port_index, bus);
                respond(match result {
                    Ok(()) => Response::Ok,
                    Err(e) => Response::Err(e),
                });
            }
            RtCommand::SetControl {
                target,
                port_index,
                value,
                respond,
            } => {
                let result = self.nodes.set_control(target, port_index, value);
                respond(match result {
                    Ok(()) => Response::Ok,
                    Err(e) => Response::Err(e),
                });
            }
            RtCommand::Job(job) => job(&mut self.rt),
        }
    }

    fn free_subtree(&mut self, target: NodeId) -> EngineResult<()> {
        let ids = self.nodes.collect_subtree(target)?;
        self.nodes.deactivate(&ids);
        self.nodes.detach_from_parent(target);
        for id in ids {
            if let Some(mut instance) = self.nodes.remove_and_take_instance(id) {
                instance.destroy(&mut self.rt);
            }
        }
        Ok(())
    }
}

fn to_response(result: EngineResult<NodeId>) -> Response {
    match result {
        Ok(id) => Response::NodeCreated(id),
        Err(e) => Response::Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use core::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn boot_produces_silence_with_only_root_group() {
        let (mut env, _tx, _jobs) = Environment::new(Options {
            block_size: 8,
            num_inputs: 0,
            num_outputs: 1,
            ..Options::default()
        });
        let mut out = [0.0f32; 8];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut out];
            env.process(8, &[], &mut outputs).unwrap();
        }
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn create_group_command_is_drained_and_responded() {
        let (mut env, mut tx, _jobs) = Environment::new(Options {
            block_size: 4,
            num_inputs: 0,
            num_outputs: 1,
            ..Options::default()
        });
        let responded = alloc::sync::Arc::new(AtomicBool::new(false));
        let responded2 = responded.clone();
        let root = env.root();
        tx.try_send(RtCommand::CreateGroup {
            target: root,
            action: AddAction::AddToTail,
            respond: Box::new(move |resp| {
                assert!(matches!(resp, Response::NodeCreated(_)));
                responded2.store(true, Ordering::SeqCst);
            }),
        })
        .unwrap();

        let mut out = [0.0f32; 4];
        let mut outputs: [&mut [f32]; 1] = [&mut out];
        env.process(4, &[], &mut outputs).unwrap();

        assert!(responded.load(Ordering::SeqCst));
    }

    #[test]
    fn zero_frames_is_a_no_op_except_epoch() {
        let (mut env, mut tx, _jobs) = Environment::new(Options {
            block_size: 4,
            num_inputs: 0,
            num_outputs: 1,
            ..Options::default()
        });
        let root = env.root();
        let responded = alloc::sync::Arc::new(AtomicBool::new(false));
        let responded2 = responded.clone();
        tx.try_send(RtCommand::CreateGroup {
            target: root,
            action: AddAction::AddToTail,
            respond: Box::new(move |_| responded2.store(true, Ordering::SeqCst)),
        })
        .unwrap();

        let epoch_before = env.rt.epoch;
        env.process(0, &[], &mut []).unwrap();

        assert_eq!(env.rt.epoch, epoch_before.next());
        assert!(
            !responded.load(Ordering::SeqCst),
            "a zero-frame block must not drain queued commands"
        );
    }

    #[test]
    fn sub_block_num_frames_only_touches_the_requested_prefix() {
        let (mut env, _tx, _jobs) = Environment::new(Options {
            block_size: 8,
            num_inputs: 0,
            num_outputs: 1,
            ..Options::default()
        });
        let mut out = [7.0f32; 8];
        {
            let mut outputs: [&mut [f32]; 1] = [&mut out];
            env.process(3, &[], &mut outputs).unwrap();
        }
        assert!(out[..3].iter().all(|&s| s == 0.0));
        assert!(out[3..].iter().all(|&s| s == 7.0));
    }

    #[test]
    fn num_frames_exceeding_block_size_fails_without_advancing_epoch() {
        let (mut env, _tx, _jobs) = Environment::new(Options {
            block_size: 4,
            num_inputs: 0,
            num_outputs: 1,
            ..Options::default()
        });
        let epoch_before = env.rt.epoch;
        let mut out = [0.0f32; 4];
        let mut outputs: [&mut [f32]; 1] = [&mut out];
        let err = env.process(5, &[], &mut outputs).unwrap_err();
        assert_eq!(err, EngineError::InvalidArgument(alloc::format!(
            "num_frames 5 exceeds block_size 4"
        )));
        assert_eq!(env.rt.epoch, epoch_before);
    }

    #[test]
    fn queue_overflow_reports_queue_full() {
        let (env, mut tx, _jobs) = Environment::new(Options {
            rt_command_queue_size: 1,
            ..Options::default()
        });
        let root = env.root();
        tx.try_send(RtCommand::CreateGroup {
            target: root,
            action: AddAction::AddToTail,
            respond: Box::new(|_| {}),
        })
        .unwrap();
        let err = tx
            .try_send(RtCommand::CreateGroup {
                target: root,
                action: AddAction::AddToTail,
                respond: Box::new(|_| {}),
            })
            .unwrap_err();
        assert_eq!(err, EngineError::QueueFull);
    }
}
