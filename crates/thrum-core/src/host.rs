//! NRT-thread facet exposed to synth definitions and dispatcher-originated
//! jobs (§4.9, §6).
//!
//! Mirrors the source's `Methcla_Host`: the side of the engine a plugin
//! talks to when constructing an instance or handling a deferred NRT job —
//! registering resources, touching the filesystem, logging diagnostics.
//! Never called from the RT thread.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::plugin::SynthDef;

/// Deferred work scheduled onto the RT thread from NRT context (dispatcher
/// requests, or a `Host`-side job scheduling RT follow-up), boxed the same
/// way [`crate::world::NrtJob`] unifies the opposite direction (§9).
pub type RtJob = Box<dyn FnOnce(&mut dyn crate::world::World) + Send>;

/// A handle to an open sound file, returned by [`SoundFileApi::open`].
///
/// Dropping the handle closes the file, playing the role of the source's
/// explicit `Methcla_SoundFile_close`.
pub trait SoundFile: Send {
    /// Number of interleaved channels in the file.
    fn num_channels(&self) -> u32;

    /// Sample rate the file was recorded at.
    fn sample_rate(&self) -> f64;

    /// Total number of frames in the file.
    fn num_frames(&self) -> u64;

    /// Read up to `out.len() / num_channels()` interleaved frames starting
    /// at the file's current position, returning the number of frames
    /// actually read.
    ///
    /// # Errors
    /// Returns `FileError` on an I/O or format failure.
    fn read(&mut self, out: &mut [f32]) -> EngineResult<u64>;

    /// Seek to `frame`.
    ///
    /// # Errors
    /// Returns `FileError` if `frame` is past the end of the file.
    fn seek(&mut self, frame: u64) -> EngineResult<()>;
}

/// Filesystem access exposed to plugins, kept behind a trait so
/// `thrum-core` itself never depends on a concrete codec (§6, §9).
pub trait SoundFileApi: Send + Sync {
    /// Open `path` for reading.
    ///
    /// # Errors
    /// Returns `FileError` with `NotFound` or `BadFormat` as appropriate.
    fn open(&self, path: &str) -> EngineResult<Box<dyn SoundFile>>;
}

/// The facet of the engine visible to synth definitions during
/// `construct`, and to jobs run on the NRT thread.
pub trait Host {
    /// Look up a registered synth definition by URI.
    ///
    /// # Errors
    /// Returns `UnknownPlugin` if no definition is registered under `uri`.
    fn lookup(&self, uri: &str) -> EngineResult<Arc<dyn SynthDef>>;

    /// Register a synth definition under `uri`.
    ///
    /// # Errors
    /// Returns `PluginRegistrationFailed` if `uri` is already registered.
    fn register(&mut self, uri: String, def: Arc<dyn SynthDef>) -> EngineResult<()>;

    /// Access to the sound-file API, if one was configured (§9).
    fn sound_files(&self) -> Option<&dyn SoundFileApi>;

    /// Enqueue work to run later on the RT thread. Fails with `QueueFull`
    /// if the NRT-to-RT queue has no room.
    ///
    /// # Errors
    /// Returns `QueueFull` if the outgoing queue has no capacity.
    fn schedule_rt(&mut self, job: RtJob) -> EngineResult<()>;

    /// Emit a diagnostic log line at the given level (§10). Implementations
    /// forward to the engine's configured `tracing` subscriber.
    fn log(&self, level: LogLevel, message: &str);
}

/// Severity for [`Host::log`], mirroring `tracing`'s levels without
/// requiring callers to depend on the `tracing` crate directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Fine-grained diagnostic detail.
    Trace,
    /// Debugging detail not needed in normal operation.
    Debug,
    /// Routine operational information.
    Info,
    /// Unexpected but recoverable condition.
    Warn,
    /// A failure serious enough to affect correctness.
    Error,
}

#[cfg(test)]
mod tests {
    use super::{EngineError, LogLevel};
    use alloc::string::ToString;

    #[test]
    fn log_levels_order_trace_below_error() {
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn unknown_plugin_error_carries_uri() {
        let err = EngineError::UnknownPlugin("test:missing".into());
        assert!(err.to_string().contains("test:missing"));
    }
}
