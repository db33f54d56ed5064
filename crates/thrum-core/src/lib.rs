//! Thrum Core - real-time node-graph audio engine
//!
//! This crate provides the engine core: a bus-routed node graph, an RT/NRT
//! command protocol connecting it to a dispatcher, and the plugin ABI
//! synth definitions implement against. It also retains the DSP
//! primitives used to build those synths, designed for real-time audio
//! processing with zero allocation in the audio path.
//!
//! # Engine
//!
//! - [`Environment`] - the live engine instance: owns the node tree, bus
//!   registry, and epoch clock, and drives one block of processing at a
//!   time
//! - [`World`] - the facet of the engine visible to synth instances while
//!   they run on the RT thread
//! - [`Host`] - the facet visible to synth definitions and deferred NRT
//!   jobs
//! - [`SynthDef`] / [`SynthInstance`] - the plugin ABI a synth implements
//! - [`NodeTable`], [`NodeId`] - the group/synth tree and its handles
//! - [`BusRegistry`], [`AudioBusId`] - fixed-size external and internal
//!   audio bus storage
//! - [`RtCommand`] - structural and control commands submitted from the
//!   NRT dispatcher
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for all audio effects
//! - [`EffectExt`] - Extension trait for effect chaining
//! - [`Chain`] - Zero-cost effect chain combinator
//! - [`EffectWithParams`] - Bridges `Effect` and `ParameterInfo` behind one vtable
//!
//! ## Parameter Smoothing
//!
//! Zipper-free parameter changes for click-free automation:
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//! - [`LinearSmoothedParam`] - Linear ramps (constant rate)
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`StateVariableFilter`] - Multi-output SVF (lowpass, highpass, bandpass simultaneously)
//! - [`CombFilter`] - Comb filter with damping for reverb algorithms
//! - [`AllpassFilter`] - Schroeder allpass for diffusion
//!
//! ## Delay Lines
//!
//! - [`InterpolatedDelay`] - Variable-length delay with interpolation
//! - [`FixedDelayLine`] - Fixed-length delay (compile-time size)
//!
//! ## Modulation & Dynamics
//!
//! - [`Lfo`] - Low-frequency oscillator (5 waveforms)
//! - [`EnvelopeFollower`] - Amplitude envelope detection
//!
//! ## Utilities
//!
//! - [`Oversampled`] - Generic wrapper for anti-aliased nonlinear processing
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`fast_tanh`], etc.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded audio applications.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! thrum-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: the engine never allocates from the general heap
//!   once a block's queued commands have been drained; structural
//!   mutation is bounded per block (see [`environment::Options::max_commands_per_block`])
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Object-safe traits**: Dynamic dispatch at the plugin ABI and engine
//!   facet boundaries
//! - **Zero-cost abstractions**: Static dispatch DSP chains optimize away

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod allpass;
pub mod arena;
pub mod biquad;
pub mod bus;
pub mod comb;
pub mod command;
pub mod dc_blocker;
pub mod delay;
pub mod effect;
pub mod effect_with_params;
pub mod envelope;
pub mod environment;
pub mod epoch;
pub mod error;
pub mod fast_math;
pub mod gain;
pub mod host;
pub mod lfo;
pub mod math;
pub mod modulation;
pub mod node;
pub mod one_pole;
pub mod oversample;
pub mod param;
pub mod param_info;
pub mod plugin;
pub mod queue;
pub mod resource;
pub mod svf;
pub mod tempo;
pub mod world;

// Re-export engine types at crate root
pub use arena::{Slab, SlabId};
pub use bus::{AudioBus, AudioBusId, BusRegistry};
pub use command::{Response, RespondFn, RtCommand};
pub use environment::{Environment, Options};
pub use epoch::Epoch;
pub use error::{EngineError, EngineResult, FileErrorKind};
pub use host::{Host, LogLevel, RtJob, SoundFile, SoundFileApi};
pub use node::{AddAction, NodeId, NodeTable};
pub use plugin::{
    Library, PortBinding, PortDescriptor, PortDirection, PortFlags, PortType, RegisteredSynthDef,
    SynthDef, SynthInstance,
};
pub use queue::{NrtJobReceiver, NrtJobSender, RtCommandReceiver, RtCommandSender};
pub use resource::Resource;
pub use world::{NrtJob, World};

// Re-export DSP primitive types at crate root
pub use allpass::AllpassFilter;
pub use biquad::{
    Biquad, bandpass_coefficients, highpass_coefficients, lowpass_coefficients, notch_coefficients,
    peaking_eq_coefficients,
};
pub use comb::CombFilter;
pub use dc_blocker::DcBlocker;
pub use delay::{FixedDelayLine, InterpolatedDelay, Interpolation};
pub use effect::{Chain, Effect, EffectExt};
pub use effect_with_params::EffectWithParams;
pub use envelope::EnvelopeFollower;
pub use fast_math::{
    fast_db_to_linear, fast_exp2, fast_linear_to_db, fast_log2, fast_sin_turns, fast_tan,
};
pub use lfo::{Lfo, LfoWaveform};
pub use math::{
    asymmetric_clip, db_to_linear, fast_tanh, flush_denormal, foldback, hard_clip, linear_to_db,
    mono_sum, soft_clip, wet_dry_mix, wet_dry_mix_stereo,
};
pub use modulation::{ModulationAmount, ModulationSource};
pub use one_pole::OnePole;
pub use oversample::{MAX_OVERSAMPLE_FACTOR, Oversampled};
pub use param::{LinearSmoothedParam, SmoothedParam};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit, ParameterInfo};
pub use svf::{StateVariableFilter, SvfOutput};
pub use tempo::{NoteDivision, TempoManager, TransportState};
