//! `Host` implementation backing the NRT worker (§4.9, §6).

use std::sync::{Arc, Mutex};

use thrum_core::{EngineResult, Host, LogLevel, RtJob, SoundFileApi, SynthDef};
use thrum_registry::PluginRegistry;

/// Concrete [`Host`] handed to synth definitions during `construct` and to
/// jobs drained by [`crate::worker::NrtWorker`].
///
/// Owns the shared plugin registry (behind a mutex: `register`/`lookup` can
/// be called from the dispatcher's setup code as well as from inside a
/// running NRT job) and the sender side of the RT-to-NRT... rather, the
/// NRT-to-RT queue it uses to honor [`Host::schedule_rt`].
pub struct DispatchHost {
    registry: Arc<Mutex<PluginRegistry>>,
    rt_commands: thrum_core::RtCommandSender,
    sound_files: Option<Arc<dyn SoundFileApi>>,
}

impl DispatchHost {
    /// Build a host around a shared plugin registry and the command sender
    /// used to schedule RT follow-up work.
    #[must_use]
    pub fn new(
        registry: Arc<Mutex<PluginRegistry>>,
        rt_commands: thrum_core::RtCommandSender,
        sound_files: Option<Arc<dyn SoundFileApi>>,
    ) -> Self {
        Self {
            registry,
            rt_commands,
            sound_files,
        }
    }
}

impl Host for DispatchHost {
    fn lookup(&self, uri: &str) -> EngineResult<Arc<dyn SynthDef>> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner()).lookup(uri)
    }

    fn register(&mut self, uri: String, def: Arc<dyn SynthDef>) -> EngineResult<()> {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .register(uri, def)
    }

    fn sound_files(&self) -> Option<&dyn SoundFileApi> {
        self.sound_files.as_deref()
    }

    fn schedule_rt(&mut self, job: RtJob) -> EngineResult<()> {
        self.rt_commands
            .try_send(thrum_core::RtCommand::Job(job))
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thrum_core::{EngineError, Options};

    #[test]
    fn unregistered_uri_fails_lookup() {
        let registry = Arc::new(Mutex::new(PluginRegistry::new()));
        let (_env, tx, _jobs) = thrum_core::Environment::new(Options::default());
        let host = DispatchHost::new(registry, tx, None);
        assert_eq!(host.lookup("test:missing").unwrap_err(), EngineError::UnknownPlugin("test:missing".into()));
    }
}
