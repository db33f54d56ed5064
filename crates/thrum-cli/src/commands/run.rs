//! `thrum run`: boot the engine against a live audio device (§6, §13).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Args;

use thrum_config::EngineOptions;
use thrum_core::Environment;
use thrum_dispatch::Dispatcher;
use thrum_io::backend::BackendStreamConfig;
use thrum_io::cpal_backend::CpalBackend;

use super::common::{load_preset, replay_preset, CliHost};

#[derive(Args)]
pub struct RunArgs {
    /// Preset to replay at boot (name or path to a `.toml` file).
    #[arg(long)]
    preset: Option<String>,

    /// Engine options file (TOML). Falls back to engine defaults.
    #[arg(long)]
    config: Option<String>,

    /// Output device name (partial match). Uses the system default if unset.
    #[arg(long)]
    output: Option<String>,

    /// Number of hardware input channels to capture. 0 disables capture.
    #[arg(long, default_value_t = 0)]
    inputs: u16,

    /// Requested buffer size, in frames.
    #[arg(long)]
    buffer_size: Option<u32>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let engine_options = match &args.config {
        Some(path) => EngineOptions::load(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => EngineOptions::default(),
    };
    let num_inputs = args.inputs as usize;
    let mut options = engine_options.into_engine();
    options.num_inputs = options.num_inputs.max(num_inputs);

    let (mut env, tx, jobs) = Environment::new(options);

    let registry = super::build_registry()?;
    let dispatcher = Arc::new(Mutex::new(Dispatcher::new(tx, registry.clone())));

    let mut host = CliHost::new(registry.clone(), dispatcher.clone());
    let _loaded_plugins = super::load_dynamic_plugins(&mut host);

    let worker = thrum_dispatch::NrtWorker::new(jobs, host);
    std::thread::spawn(move || worker.run());

    if let Some(name) = &args.preset {
        let preset = load_preset(name)?;
        let mut guard = dispatcher.lock().unwrap_or_else(|e| e.into_inner());
        replay_preset(&mut env, &mut guard, &preset)?;
    }

    let backend = CpalBackend::new();
    let config = BackendStreamConfig {
        sample_rate: options.sample_rate as u32,
        buffer_size: args.buffer_size.unwrap_or(256),
        channels: options.num_outputs as u16,
        device_name: args.output.clone(),
    };

    tracing::info!(
        sample_rate = config.sample_rate,
        buffer_size = config.buffer_size,
        channels = config.channels,
        "starting audio stream"
    );

    let _driver = thrum_io::driver::run(&backend, env, &config, num_inputs)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let running = Arc::new(AtomicBool::new(true));
    let running_in_handler = running.clone();
    ctrlc::set_handler(move || running_in_handler.store(false, Ordering::SeqCst))?;

    println!("Running. Press Ctrl-C to stop.");
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    Ok(())
}
