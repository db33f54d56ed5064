//! Thrum Builtin - native `SynthDef`s usable without dynamic loading (§2
//! component 12).
//!
//! This crate provides the small set of synth definitions the engine can
//! construct without a plugin registered through `thrum-loader`:
//!
//! - [`TestSine`] (`test:sine`) - fixed-output fixture used by scenario
//!   tests and examples.
//! - [`Gain`] (`thrum:gain`) - audio in, audio out, dB control.
//! - [`Oscillator`] (`thrum:oscillator`) - free-running sine, frequency
//!   control, audio out.
//!
//! It also carries the mono [`Effect`](thrum_core::Effect) building blocks
//! ([`Delay`], [`LowPassFilter`]) usable outside the node graph, e.g. by a
//! dynamically loaded plugin's own `process` implementation, or by the CLI's
//! offline render path.
//!
//! ## Example
//!
//! ```rust,ignore
//! use thrum_registry::PluginRegistry;
//! use std::sync::Arc;
//!
//! let mut registry = PluginRegistry::new();
//! registry.register("test:sine", Arc::new(thrum_builtin::TestSine)).unwrap();
//! registry.register("thrum:gain", Arc::new(thrum_builtin::Gain)).unwrap();
//! registry.register("thrum:oscillator", Arc::new(thrum_builtin::Oscillator)).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod port;

pub mod delay;
pub mod filter;
pub mod gain;
pub mod oscillator;
pub mod sine;

pub use delay::Delay;
pub use filter::LowPassFilter;
pub use gain::Gain;
pub use oscillator::Oscillator;
pub use sine::TestSine;
