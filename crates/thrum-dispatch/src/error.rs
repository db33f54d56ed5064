//! Dispatcher-level errors (§7, §11).
//!
//! Wraps [`EngineError`] the way the rest of the crate stack wraps a
//! lower-layer error with `#[from]` (see `thrum-config::ConfigError`),
//! adding the two failure modes that are specific to decoding an already-
//! parsed request object before it ever reaches the engine.

use thiserror::Error;
use thrum_core::EngineError;

/// Failures that can occur while decoding and validating a request before
/// it is translated into an [`thrum_core::RtCommand`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A request body was missing a property its type requires.
    #[error("request body '{body}' is missing required property '{property}'")]
    MissingProperty {
        /// The body type being decoded (`Group`, `Synth`, `Free`, ...).
        body: &'static str,
        /// The missing property name.
        property: &'static str,
    },

    /// A request's root object was not one of the recognized body types.
    #[error("unrecognized request body type: {0}")]
    UnknownBodyType(String),

    /// The command was accepted for dispatch but the engine rejected it.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
