//! Synth-definition (plugin descriptor) ABI (§3, §4.9, §6).
//!
//! The source models plugins as a C struct of function pointers
//! (`Methcla_SynthDef` in `plugin.h`). The idiomatic Rust translation is an
//! object-safe trait: a plugin author implements [`SynthDef`] and
//! [`SynthInstance`] instead of filling in a function-pointer table, and the
//! engine stores `Arc<dyn SynthDef>` / `Box<dyn SynthInstance>` instead of
//! raw pointers plus an opaque instance blob. Ports keep the "iterate
//! `port_descriptor` until it returns `None`" contract (§9 open question)
//! rather than exposing a `port_count()`.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;

use crate::error::EngineResult;
use crate::world::World;

/// Which way data flows through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// The synth reads from this port.
    Input,
    /// The synth writes to this port.
    Output,
}

/// What kind of signal a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    /// A single float, set directly via `SetControl` or read once per
    /// block.
    Control,
    /// A block-sized sample buffer bound to an [`crate::bus::AudioBusId`].
    Audio,
}

/// Per-port capability flags.
///
/// Hand-rolled rather than pulled from the `bitflags` crate, matching the
/// `ParamFlags` convention already used by this crate's parameter system
/// (`param_info.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortFlags(u8);

impl PortFlags {
    /// No special behavior.
    pub const NONE: PortFlags = PortFlags(0);
    /// A control input whose value is read once per block then reset to 0,
    /// mimicking a falling edge (§4.6 "Port binding").
    pub const TRIGGER: PortFlags = PortFlags(1 << 0);

    /// Combine two flag sets.
    #[must_use]
    pub const fn union(self, other: PortFlags) -> PortFlags {
        PortFlags(self.0 | other.0)
    }

    /// Whether `self` contains every bit set in `other`.
    #[must_use]
    pub const fn contains(self, other: PortFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Describes a single port on a synth definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Input or output.
    pub direction: PortDirection,
    /// Control or audio.
    pub port_type: PortType,
    /// Capability flags.
    pub flags: PortFlags,
}

impl PortDescriptor {
    /// Convenience constructor with no flags set.
    #[must_use]
    pub const fn new(direction: PortDirection, port_type: PortType) -> Self {
        Self {
            direction,
            port_type,
            flags: PortFlags::NONE,
        }
    }

    /// Set the port's flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: PortFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A connection the scheduler has made from a synth's port to its backing
/// storage: an audio bus id for audio ports, or a direct value for control
/// ports.
#[derive(Debug, Clone, Copy)]
pub enum PortBinding {
    /// Audio port connected to a bus (or unconnected = silent).
    Bus(Option<crate::bus::AudioBusId>),
    /// Control port holding a direct value.
    Control(f32),
}

/// Per-instance plugin state, constructed by [`SynthDef::construct`].
///
/// Every method here runs on the RT thread. Implementations must not
/// allocate, lock, or block.
pub trait SynthInstance: Send {
    /// Called once after construction and port binding, before the first
    /// `process`.
    fn activate(&mut self, world: &mut dyn World);

    /// Render `num_frames` of audio given the current port bindings.
    /// Implementations read input ports and write output ports via
    /// `ports`, mixing additively into audio outputs.
    fn process(&mut self, world: &mut dyn World, ports: &mut [PortBinding], num_frames: usize);

    /// Called once before the instance is dropped; implementations release
    /// any resources retained through the `World` facet.
    fn destroy(&mut self, world: &mut dyn World) {
        let _ = world;
    }
}

/// Immutable plugin descriptor, registered once by URI (§3, §4.4).
///
/// `Arc<dyn SynthDef>` is shared between every synth instance of that
/// definition and the plugin manager's registry; it outlives every synth
/// built from it.
pub trait SynthDef: Send + Sync {
    /// Stable URI identifying this definition, e.g. `"test:sine"`.
    fn uri(&self) -> &str;

    /// Port `index`, or `None` past the last port. Callers iterate
    /// `0, 1, 2, ...` until `None` (§9).
    fn port_descriptor(&self, index: u32) -> Option<PortDescriptor>;

    /// Parse `options` (an opaque tag/arg buffer assembled by the
    /// dispatcher from a `Synth` request's `args`) and construct a fresh
    /// instance.
    ///
    /// # Errors
    /// Returns an error if `options` cannot be parsed into valid
    /// construction parameters.
    fn construct(
        &self,
        world: &mut dyn World,
        options: &[u8],
    ) -> EngineResult<Box<dyn SynthInstance>>;
}

/// A loaded plugin module, returned by a library's entry point (§6).
///
/// Dropping the handle tears down the module; `Drop` impls play the role of
/// the source's explicit `destroy(library)` call.
pub trait Library: Send {
    /// Human-readable name of the loaded module, for diagnostics.
    fn name(&self) -> &str;
}

/// A statically known synth definition paired with the URI it registers
/// under, as produced by a built-in plugin module (`thrum-builtin`) or a
/// dynamically loaded one (`thrum-loader`).
pub struct RegisteredSynthDef {
    /// URI to register the definition under.
    pub uri: String,
    /// The definition itself.
    pub def: Arc<dyn SynthDef>,
}
