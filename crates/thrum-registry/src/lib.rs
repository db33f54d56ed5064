//! Plugin manager: URI-keyed registration and lookup of synth definitions
//! (§4.4).
//!
//! The source keeps a flat array of registered `Methcla_SynthDef` structs and
//! does a linear scan by URI on lookup. This crate keeps that same shape —
//! a `Vec` of entries rather than a `HashMap` — since the registry is
//! populated once at startup (by `thrum-builtin`'s statically linked set, and
//! by `thrum-loader` for dynamically loaded modules) and then read far more
//! often than written; a handful of entries makes the linear scan no slower
//! than hashing in practice, and avoids pulling in a hasher for a `no_std`
//! crate.
//!
//! # no_std support
//!
//! Built `no_std` + `alloc` by default, mirroring `thrum-core`. Enable the
//! `std` feature to pull in `thrum-core`'s `std` feature as well.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use thrum_core::{EngineError, EngineResult, RegisteredSynthDef, SynthDef};

/// Registry of synth definitions, keyed by URI.
///
/// Holds strong references (`Arc<dyn SynthDef>`) rather than the definitions
/// themselves: every live synth instance of a definition, and the registry
/// itself, share ownership, so a definition stays alive as long as anything
/// still needs it (§4.4 "a synth definition outlives every instance
/// constructed from it").
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<(String, Arc<dyn SynthDef>)>,
}

impl PluginRegistry {
    /// An empty registry with no plugins registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a synth definition under `uri`.
    ///
    /// # Errors
    /// Returns [`EngineError::PluginRegistrationFailed`] if `uri` is already
    /// registered; re-registering the same URI under a different definition
    /// would silently alias every future `Synth` request that names it, so
    /// duplicates are rejected rather than replacing the prior entry.
    pub fn register(&mut self, uri: impl Into<String>, def: Arc<dyn SynthDef>) -> EngineResult<()> {
        let uri = uri.into();
        if self.entries.iter().any(|(existing, _)| *existing == uri) {
            return Err(EngineError::PluginRegistrationFailed(uri));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(uri = %uri, "registered plugin");
        self.entries.push((uri, def));
        Ok(())
    }

    /// Register every definition a built-in or dynamically loaded module
    /// exports, stopping at the first duplicate.
    ///
    /// # Errors
    /// See [`PluginRegistry::register`].
    pub fn register_all(
        &mut self,
        defs: impl IntoIterator<Item = RegisteredSynthDef>,
    ) -> EngineResult<()> {
        for RegisteredSynthDef { uri, def } in defs {
            self.register(uri, def)?;
        }
        Ok(())
    }

    /// Look up a definition by URI.
    ///
    /// # Errors
    /// Returns [`EngineError::UnknownPlugin`] if no definition is registered
    /// under `uri`.
    pub fn lookup(&self, uri: &str) -> EngineResult<Arc<dyn SynthDef>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == uri)
            .map(|(_, def)| Arc::clone(def))
            .ok_or_else(|| EngineError::UnknownPlugin(uri.into()))
    }

    /// Whether a definition is registered under `uri`.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == uri)
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no registered definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the registered URIs, in registration order.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(uri, _)| uri.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use thrum_core::{PortDescriptor, PortDirection, PortType, SynthInstance, World};

    struct StubInstance;

    impl SynthInstance for StubInstance {
        fn activate(&mut self, _world: &mut dyn World) {}
        fn process(
            &mut self,
            _world: &mut dyn World,
            _ports: &mut [thrum_core::PortBinding],
            _num_frames: usize,
        ) {
        }
    }

    struct StubDef(&'static str);

    impl SynthDef for StubDef {
        fn uri(&self) -> &str {
            self.0
        }

        fn port_descriptor(&self, index: u32) -> Option<PortDescriptor> {
            (index == 0).then(|| PortDescriptor::new(PortDirection::Output, PortType::Audio))
        }

        fn construct(
            &self,
            _world: &mut dyn World,
            _options: &[u8],
        ) -> EngineResult<Box<dyn SynthInstance>> {
            Ok(Box::new(StubInstance))
        }
    }

    #[test]
    fn register_then_lookup_round_trips() {
        let mut registry = PluginRegistry::new();
        registry
            .register("test:stub", Arc::new(StubDef("test:stub")))
            .unwrap();
        assert!(registry.contains("test:stub"));
        assert_eq!(registry.lookup("test:stub").unwrap().uri(), "test:stub");
    }

    #[test]
    fn duplicate_uri_is_rejected() {
        let mut registry = PluginRegistry::new();
        registry
            .register("test:stub", Arc::new(StubDef("test:stub")))
            .unwrap();
        let err = registry
            .register("test:stub", Arc::new(StubDef("test:stub")))
            .unwrap_err();
        assert_eq!(err, EngineError::PluginRegistrationFailed("test:stub".into()));
    }

    #[test]
    fn unknown_uri_fails_lookup() {
        let registry = PluginRegistry::new();
        assert_eq!(
            registry.lookup("test:missing").unwrap_err(),
            EngineError::UnknownPlugin("test:missing".into())
        );
    }

    #[test]
    fn empty_registry_reports_empty() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
