//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod list_plugins;
pub mod render;
pub mod run;

/// Build a plugin registry carrying every statically linked `thrum-builtin`
/// definition.
pub fn build_registry()
-> anyhow::Result<std::sync::Arc<std::sync::Mutex<thrum_registry::PluginRegistry>>> {
    use std::sync::{Arc, Mutex};
    use thrum_core::RegisteredSynthDef;

    let mut registry = thrum_registry::PluginRegistry::new();
    registry
        .register_all([
            RegisteredSynthDef {
                uri: "test:sine".into(),
                def: Arc::new(thrum_builtin::TestSine),
            },
            RegisteredSynthDef {
                uri: "thrum:gain".into(),
                def: Arc::new(thrum_builtin::Gain),
            },
            RegisteredSynthDef {
                uri: "thrum:oscillator".into(),
                def: Arc::new(thrum_builtin::Oscillator),
            },
        ])
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(Arc::new(Mutex::new(registry)))
}

/// Discover plugin bundles on the configured search paths and load each one
/// into `host`, logging what was found.
///
/// A no-op unless the `dynamic-loading` feature is enabled, since loading a
/// bundle requires `thrum-loader`'s `unsafe` FFI call. The returned handles
/// must be kept alive by the caller for as long as the registry they
/// populated is in use — dropping one unmaps the code backing its `Arc<dyn
/// SynthDef>` entries.
#[cfg(feature = "dynamic-loading")]
pub fn load_dynamic_plugins(host: &mut dyn thrum_core::Host) -> Vec<thrum_loader::LoadedModule> {
    let extension = thrum_loader::bundle_extension();
    let mut loaded = Vec::new();
    for dir in thrum_config::plugin_search_paths() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            match thrum_loader::load_bundle(&path, host) {
                Ok(module) => {
                    tracing::info!(path = %path.display(), name = module.name(), "loaded plugin bundle");
                    loaded.push(module);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load plugin bundle");
                }
            }
        }
    }
    loaded
}

#[cfg(not(feature = "dynamic-loading"))]
pub fn load_dynamic_plugins(_host: &mut dyn thrum_core::Host) -> Vec<()> {
    tracing::debug!("dynamic plugin loading disabled (build with --features dynamic-loading)");
    Vec::new()
}
