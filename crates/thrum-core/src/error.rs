//! Engine-level error kinds.
//!
//! Mirrors the field-carrying `thiserror` style the rest of the workspace
//! uses for its error enums (see `thrum-config::ConfigError`): named fields
//! over tuple variants wherever more than one piece of context is useful,
//! and `#[source]`/`#[from]` to chain into a lower-level error.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// A file-layer error kind, surfaced from the sound-file API a `Host`
/// exposes to plugins (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    /// A malformed request was made of the sound-file API.
    InvalidArgument,
    /// The requested file does not exist.
    NotFound,
    /// The file exists but its contents could not be parsed.
    BadFormat,
    /// An I/O failure occurred while reading or writing.
    IoFailed,
    /// Any other file-layer failure.
    Unspecified,
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileErrorKind::InvalidArgument => "invalid argument",
            FileErrorKind::NotFound => "not found",
            FileErrorKind::BadFormat => "bad format",
            FileErrorKind::IoFailed => "I/O failed",
            FileErrorKind::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// Every error kind the engine can produce, per §7.
///
/// Never panics or unwinds across the plugin ABI: RT-side failures are
/// enqueued as NRT commands carrying one of these variants (§7 propagation
/// policy); NRT-side failures become response messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Malformed request or out-of-range index.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Target node id does not resolve to a live node.
    #[error("invalid node id")]
    InvalidNodeId,

    /// A node id was reused without first being released.
    #[error("duplicate node id")]
    DuplicateNodeId,

    /// Bus id out of range.
    #[error("invalid bus id")]
    InvalidBusId,

    /// Plugin URI is not registered.
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    /// Registration of a plugin failed (duplicate URI).
    #[error("plugin registration failed: duplicate uri {0}")]
    PluginRegistrationFailed(String),

    /// The RT arena is exhausted.
    #[error("allocation failed")]
    AllocationFailed,

    /// A command queue was full; the command was dropped.
    #[error("queue full")]
    QueueFull,

    /// An error surfaced from the sound-file layer.
    #[error("file error: {kind}")]
    FileError {
        /// The specific file-layer failure.
        kind: FileErrorKind,
    },
}

/// Convenience result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
