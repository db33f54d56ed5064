//! `thrum render`: offline rendering to a WAV file (§6, §13).

use std::sync::{Arc, Mutex};

use clap::Args;

use thrum_config::EngineOptions;
use thrum_core::Environment;
use thrum_dispatch::{Dispatcher, NrtWorker};
use thrum_io::WavSpec;

use super::common::{load_preset, replay_preset, CliHost};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file path.
    output: String,

    /// Preset to replay before rendering (name or path to a `.toml` file).
    #[arg(long)]
    preset: Option<String>,

    /// Engine options file (TOML). Falls back to engine defaults.
    #[arg(long)]
    config: Option<String>,

    /// Duration to render, in seconds.
    #[arg(long, default_value_t = 1.0)]
    duration: f64,

    /// Optional WAV file to feed in as engine input.
    #[arg(long)]
    input: Option<String>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let engine_options = match &args.config {
        Some(path) => EngineOptions::load(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => EngineOptions::default(),
    };
    let options = engine_options.into_engine();
    let (mut env, tx, jobs) = Environment::new(options);

    let registry = super::build_registry()?;
    let dispatcher = Arc::new(Mutex::new(Dispatcher::new(tx, registry.clone())));

    let mut host = CliHost::new(registry.clone(), dispatcher.clone());
    let _loaded_plugins = super::load_dynamic_plugins(&mut host);
    let mut worker = NrtWorker::new(jobs, host);

    if let Some(name) = &args.preset {
        let preset = load_preset(name)?;
        let mut guard = dispatcher.lock().unwrap_or_else(|e| e.into_inner());
        replay_preset(&mut env, &mut guard, &preset)?;
    }
    worker.poll();

    let block_size = options.block_size;
    let num_outputs = options.num_outputs;
    let num_inputs = options.num_inputs;

    let input_channels: Vec<Vec<f32>> = match &args.input {
        Some(path) => {
            let (channels, _spec) =
                thrum_io::read_wav_channels(path).map_err(|e| anyhow::anyhow!("{e}"))?;
            channels
        }
        None => Vec::new(),
    };

    let total_frames = (args.duration * options.sample_rate).ceil() as usize;
    let num_blocks = total_frames.div_ceil(block_size);

    let mut output_channels: Vec<Vec<f32>> =
        (0..num_outputs).map(|_| Vec::with_capacity(num_blocks * block_size)).collect();

    let mut input_block: Vec<Vec<f32>> = vec![vec![0.0; block_size]; num_inputs];
    let mut output_block: Vec<Vec<f32>> = vec![vec![0.0; block_size]; num_outputs];

    for block_index in 0..num_blocks {
        let start = block_index * block_size;
        for (channel_index, buffer) in input_block.iter_mut().enumerate() {
            buffer.fill(0.0);
            if let Some(source) = input_channels.get(channel_index) {
                for (frame, sample) in buffer.iter_mut().enumerate() {
                    if let Some(value) = source.get(start + frame) {
                        *sample = *value;
                    }
                }
            }
        }

        let input_refs: Vec<&[f32]> = input_block.iter().map(Vec::as_slice).collect();
        let mut output_refs: Vec<&mut [f32]> =
            output_block.iter_mut().map(Vec::as_mut_slice).collect();
        env.process(block_size, &input_refs, &mut output_refs)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        worker.poll();

        for (channel_index, buffer) in output_block.iter().enumerate() {
            output_channels[channel_index].extend_from_slice(buffer);
        }
    }

    for channel in &mut output_channels {
        channel.truncate(total_frames);
    }

    let spec = WavSpec {
        channels: num_outputs as u16,
        sample_rate: options.sample_rate as u32,
        bits_per_sample: 32,
    };
    thrum_io::write_wav_channels(&args.output, &output_channels, spec)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!(
        "Rendered {:.2}s ({} blocks) to {}",
        total_frames as f64 / options.sample_rate,
        num_blocks,
        args.output
    );

    Ok(())
}
