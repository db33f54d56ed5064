//! Audio I/O layer for the `thrum` engine (§6 "External interfaces").
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav_channels`] / [`write_wav_channels`] for the
//!   `render` command's offline path, plus the mono [`read_wav`] / [`write_wav`]
//!   helpers and [`read_wav_info`] for quick inspection.
//! - **Device enumeration**: [`list_devices`] / [`default_device`] for the
//!   `devices` command.
//! - **The pluggable backend**: [`backend::AudioBackend`], with
//!   [`cpal_backend::CpalBackend`] as the concrete implementation used by the
//!   `run` command.
//! - **The driver**: [`driver::run`] wires a running `thrum_core::Environment`
//!   to an `AudioBackend`, handling the interleave/deinterleave between the
//!   backend's flat buffers and the engine's per-channel block processing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use thrum_core::{Environment, Options};
//! use thrum_io::backend::{AudioBackend, BackendStreamConfig};
//! use thrum_io::cpal_backend::CpalBackend;
//! use thrum_io::driver;
//!
//! let (env, _commands, _jobs) = Environment::new(Options::default());
//! let backend = CpalBackend::new();
//! let config = BackendStreamConfig::default();
//! let handle = driver::run(&backend, env, &config, 0)?;
//! // Audio plays until `handle` is dropped.
//! ```

pub mod backend;
pub mod cpal_backend;
pub mod driver;
mod stream;
mod wav;

pub use stream::{
    AudioDevice, StreamConfig, default_device, find_device_by_index, find_device_fuzzy,
    list_devices,
};
pub use wav::{
    WavFormat, WavInfo, WavSpec, read_wav, read_wav_channels, read_wav_info, write_wav,
    write_wav_channels,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
