//! `thrum list-plugins`: print every discoverable synth-definition URI (§13).

use clap::Args;

use thrum_core::Environment;

use super::common::CliHost;

#[derive(Args)]
pub struct ListPluginsArgs {}

pub fn run(_args: ListPluginsArgs) -> anyhow::Result<()> {
    let registry = super::build_registry()?;

    let (_env, tx, _jobs) = Environment::new(thrum_core::Options::default());
    let dispatcher = std::sync::Arc::new(std::sync::Mutex::new(thrum_dispatch::Dispatcher::new(
        tx,
        registry.clone(),
    )));
    let mut host = CliHost::new(registry.clone(), dispatcher);
    let loaded = super::load_dynamic_plugins(&mut host);

    let guard = registry.lock().unwrap_or_else(|e| e.into_inner());
    println!("Registered plugins ({}):", guard.len());
    for uri in guard.uris() {
        println!("  {uri}");
    }

    if !loaded.is_empty() {
        println!();
        println!("Loaded {} dynamic bundle(s).", loaded.len());
    }

    Ok(())
}
