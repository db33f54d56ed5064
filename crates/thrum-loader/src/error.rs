//! Dynamic-loading failure modes (§7, §11).

use std::path::PathBuf;

use thiserror::Error;

/// Failures specific to locating, opening, or initializing a plugin
/// bundle. Distinct from [`thrum_core::EngineError`]: these happen before
/// the module ever gets a chance to register a synth definition.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The dynamic library at `path` could not be opened (missing file,
    /// wrong architecture, unresolved symbol dependencies).
    #[error("failed to open plugin bundle {path}")]
    OpenFailed {
        /// The bundle that failed to open.
        path: PathBuf,
        /// The underlying `libloading` failure.
        #[source]
        source: libloading::Error,
    },

    /// The library opened but does not export `thrum_library_init`.
    #[error("plugin bundle {path} has no thrum_library_init entry point")]
    MissingEntryPoint {
        /// The bundle missing the entry point.
        path: PathBuf,
        /// The underlying `libloading` failure.
        #[source]
        source: libloading::Error,
    },

    /// `path` does not look like a plugin bundle for the current platform
    /// (wrong file extension).
    #[error("not a plugin bundle for this platform: {0}")]
    NotABundle(PathBuf),
}
