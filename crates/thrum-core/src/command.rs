//! RT/NRT command protocol (§4.8, §6).
//!
//! The source pairs a C function pointer with an opaque data blob for both
//! directions of cross-thread work (`Methcla_HostPerformCommand`,
//! `Methcla_WorldPerformCommand`) and correlates dispatcher requests with
//! their responses through a caller-managed request id. Idiomatic Rust
//! replaces the function-pointer/blob pairing with boxed `FnOnce` closures
//! ([`crate::host::RtJob`], [`crate::world::NrtJob`]), and replaces the
//! request-id correlation table with a response closure
//! ([`RespondFn`]) carried directly on each structured command — simpler,
//! and equally faithful to "the dispatcher eventually gets a response for
//! every accepted request."

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::bus::AudioBusId;
use crate::error::EngineError;
use crate::node::{AddAction, NodeId};
use crate::plugin::SynthDef;

/// Invoked exactly once with the outcome of a structured [`RtCommand`],
/// from whichever thread finishes processing it.
pub type RespondFn = Box<dyn FnOnce(Response) + Send>;

/// Outcome of a structured command, delivered to its [`RespondFn`].
#[derive(Debug)]
pub enum Response {
    /// `CreateGroup`/`CreateSynth` succeeded, producing a new node.
    NodeCreated(NodeId),
    /// A command with no payload to return succeeded.
    Ok,
    /// The command failed.
    Err(EngineError),
}

/// A unit of structural or control work submitted to the RT thread by the
/// dispatcher (§4.6, §4.8). Each variant carries the [`RespondFn`] the
/// dispatcher wants invoked once the command is processed.
pub enum RtCommand {
    /// Create a group and attach it relative to `target` (§4.6 "Adding a
    /// node").
    CreateGroup {
        /// Node to splice the new group relative to.
        target: NodeId,
        /// Where to splice it.
        action: AddAction,
        /// Invoked with `NodeCreated` or `Err`.
        respond: RespondFn,
    },
    /// Construct a synth from `def` and attach it relative to `target`
    /// (§4.6 "Synth construction").
    CreateSynth {
        /// Node to splice the new synth relative to.
        target: NodeId,
        /// Where to splice it.
        action: AddAction,
        /// The definition to construct an instance of.
        def: Arc<dyn SynthDef>,
        /// Opaque construction options forwarded to `SynthDef::construct`.
        options: Box<[u8]>,
        /// Invoked with `NodeCreated` or `Err`.
        respond: RespondFn,
    },
    /// Detach and destroy `target`'s entire subtree (§4.6 "Removing a
    /// node").
    FreeNode {
        /// Root of the subtree to free.
        target: NodeId,
        /// Invoked with `Ok` or `Err`.
        respond: RespondFn,
    },
    /// Bind an audio port on `target` to `bus`.
    MapPort {
        /// Synth node whose port is being bound.
        target: NodeId,
        /// Port index on that synth's definition.
        port_index: u32,
        /// Bus to bind the port to.
        bus: AudioBusId,
        /// Invoked with `Ok` or `Err`.
        respond: RespondFn,
    },
    /// Set a control port's direct value on `target`.
    SetControl {
        /// Synth node whose port is being set.
        target: NodeId,
        /// Port index on that synth's definition.
        port_index: u32,
        /// New value.
        value: f32,
        /// Invoked with `Ok` or `Err`.
        respond: RespondFn,
    },
    /// Arbitrary RT-side work scheduled from the NRT thread, e.g. via
    /// [`crate::host::Host::schedule_rt`]. No response is delivered; the
    /// job itself is responsible for any follow-up communication.
    Job(crate::host::RtJob),
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn respond_fn_runs_exactly_once() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag2 = flag.clone();
        let respond: RespondFn = Box::new(move |_resp| flag2.store(true, Ordering::SeqCst));
        respond(Response::Ok);
        assert!(flag.load(Ordering::SeqCst));
    }
}
