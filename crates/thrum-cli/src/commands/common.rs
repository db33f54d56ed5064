//! Shared CLI helpers used across multiple commands.

use std::sync::{Arc, Mutex};

use thrum_config::GraphPreset;
use thrum_core::{EngineResult, Environment, Host, LogLevel, NodeId, RtJob, SoundFileApi, SynthDef};
use thrum_dispatch::{Dispatcher, Reply};
use thrum_registry::PluginRegistry;

/// The [`Host`] facet this CLI hands to `NrtWorker` and to
/// `thrum_loader::load_bundle`.
///
/// The command queue `Environment::new` mints has exactly one producer
/// (§4.5), and this build's single [`Dispatcher`] already owns it — so
/// rather than split the queue or mint a second, disconnected one,
/// `schedule_rt` forwards through the same `Dispatcher` via
/// [`Dispatcher::schedule_rt`]. `register`/`lookup` go straight to the
/// shared registry, same as `DispatchHost` does.
pub struct CliHost {
    registry: Arc<Mutex<PluginRegistry>>,
    dispatcher: Arc<Mutex<Dispatcher>>,
}

impl CliHost {
    #[must_use]
    pub fn new(registry: Arc<Mutex<PluginRegistry>>, dispatcher: Arc<Mutex<Dispatcher>>) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }
}

impl Host for CliHost {
    fn lookup(&self, uri: &str) -> EngineResult<Arc<dyn SynthDef>> {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lookup(uri)
    }

    fn register(&mut self, uri: String, def: Arc<dyn SynthDef>) -> EngineResult<()> {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .register(uri, def)
    }

    fn sound_files(&self) -> Option<&dyn SoundFileApi> {
        None
    }

    fn schedule_rt(&mut self, job: RtJob) -> EngineResult<()> {
        self.dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .schedule_rt(job)
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

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Load a graph preset by name or path.
///
/// Searches in this order: a direct file path, then the user/system preset
/// directories via [`thrum_config::find_preset`].
pub fn load_preset(name: &str) -> anyhow::Result<GraphPreset> {
    let path = std::path::PathBuf::from(name);
    if path.is_file() {
        return GraphPreset::load(&path).map_err(|e| anyhow::anyhow!("{e}"));
    }

    if let Some(path) = thrum_config::find_preset(name) {
        return GraphPreset::load(&path).map_err(|e| anyhow::anyhow!("{e}"));
    }

    anyhow::bail!("preset '{name}' not found (searched cwd and the user/system preset directories)")
}

/// Replay every step of `preset` against `env` through `dispatcher`, in
/// order, resolving each step's `target` against the `NodeId`s produced by
/// earlier steps (§12 "a saved set of `Insert` requests to replay at
/// boot").
///
/// Returns the `NodeId` each step produced, indexed the same way the
/// preset's own steps are (a `MapPort`/`SetControl` step that created no
/// node gets the target's id, for convenience).
pub fn replay_preset(
    env: &mut Environment,
    dispatcher: &mut Dispatcher,
    preset: &GraphPreset,
) -> anyhow::Result<Vec<NodeId>> {
    preset.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    let root = env.root();
    let mut resolved_ids: Vec<NodeId> = Vec::with_capacity(preset.steps.len());

    for (index, step) in preset.steps.iter().enumerate() {
        let target = match step.depends_on() {
            Some(dep) => resolved_ids[dep],
            None => root,
        };
        let resolved = step.resolve(Some(target));

        let reply_slot: Arc<Mutex<Option<Reply>>> = Arc::new(Mutex::new(None));
        let reply_slot_in_closure = reply_slot.clone();
        dispatcher
            .submit(index as u64, &resolved, move |reply| {
                *reply_slot_in_closure.lock().unwrap() = Some(reply);
            })
            .map_err(|e| anyhow::anyhow!("preset step {index}: {e}"))?;

        // `Dispatcher::submit` only enqueues the command; the reply arrives
        // once `Environment::process` drains it. Drive empty blocks until
        // this step's reply lands, since later steps may depend on the
        // `NodeId` it produces. `num_frames` must be nonzero here (a
        // zero-frame block is a pure no-op that never drains the queue).
        let block_size = env.block_size();
        while reply_slot.lock().unwrap().is_none() {
            env.process(block_size, &[], &mut [])
                .map_err(|e| anyhow::anyhow!("{e}"))?;
        }

        let reply = reply_slot.lock().unwrap().take().unwrap();
        if let Some(error) = reply.error {
            anyhow::bail!("preset step {index} failed: {error}");
        }
        resolved_ids.push(reply.node_id.unwrap_or(target));
    }

    Ok(resolved_ids)
}
