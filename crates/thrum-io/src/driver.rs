//! Wires a running [`thrum_core::Environment`] to an [`AudioBackend`] (§6
//! "External interfaces", the `run` command).
//!
//! The engine's `Environment::process` wants one `&[f32]`/`&mut [f32]` slice
//! per channel; a backend's callbacks hand over (or want filled) one flat,
//! interleaved buffer. This module is the seam between the two shapes, plus
//! the plumbing needed to bridge a separate input stream to the output
//! callback that actually drives the engine (cpal has no single duplex
//! callback, so capture and playback run on independent streams joined by a
//! ring buffer).

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

use thrum_core::Environment;

use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};
use crate::Result;

/// A running engine bound to a backend stream.
///
/// Dropping this stops both the output stream and, if one was opened, the
/// input stream feeding it.
pub struct Driver {
    _output: StreamHandle,
    _input: Option<StreamHandle>,
}

/// Start the engine running against `backend`.
///
/// `config.channels` is the number of engine output buses to drive (and
/// matches the number of hardware output channels opened); `num_inputs` is
/// how many hardware input channels to capture and present to
/// `Environment::process` as its `inputs` slice. Pass `0` for a pure
/// generator/synth engine that reads no live input.
///
/// The engine itself is moved into the output callback and lives there for
/// the life of the stream; there is no way to reach back into it once
/// `run` returns. Callers that need to send commands to the running engine
/// should keep the `RtCommandSender` returned by `Environment::new` instead
/// of trying to get it back out of here.
pub fn run(
    backend: &dyn AudioBackend,
    mut env: Environment,
    config: &BackendStreamConfig,
    num_inputs: usize,
) -> Result<Driver> {
    let block_size = config.buffer_size as usize;
    let num_outputs = config.channels as usize;

    // Sized generously relative to one block so the output callback can
    // always find a full block waiting even if it runs slightly ahead of
    // the input callback.
    let capacity = (block_size * num_inputs.max(1) * 8).max(1);
    let rb = HeapRb::<f32>::new(capacity);
    let (mut producer, mut consumer) = rb.split();

    let input = if num_inputs > 0 {
        let mut input_config = config.clone();
        input_config.channels = num_inputs as u16;
        Some(backend.build_input_stream(
            &input_config,
            Box::new(move |data: &[f32]| {
                let _ = producer.push_slice(data);
            }),
            Box::new(|err| tracing::error!(error = %err, "input stream error")),
        )?)
    } else {
        None
    };

    let mut input_interleaved = vec![0.0f32; block_size * num_inputs.max(1)];
    let mut input_channels: Vec<Vec<f32>> = vec![vec![0.0; block_size]; num_inputs];
    let mut output_channels: Vec<Vec<f32>> = vec![vec![0.0; block_size]; num_outputs];

    let output = backend.build_output_stream(
        config,
        Box::new(move |data: &mut [f32]| {
            let frames = if num_outputs == 0 {
                0
            } else {
                (data.len() / num_outputs).min(block_size)
            };

            if num_inputs > 0 {
                let available_frames = consumer.occupied_len() / num_inputs;
                let have_frames = available_frames.min(frames);
                let got = consumer.pop_slice(&mut input_interleaved[..have_frames * num_inputs]);
                let have_frames = got / num_inputs;

                for channel in &mut input_channels {
                    channel[..frames].fill(0.0);
                }
                for frame in 0..have_frames {
                    for (channel_idx, channel) in input_channels.iter_mut().enumerate() {
                        channel[frame] = input_interleaved[frame * num_inputs + channel_idx];
                    }
                }
            }

            for channel in &mut output_channels {
                channel[..frames].fill(0.0);
            }

            let input_refs: Vec<&[f32]> = input_channels
                .iter()
                .map(|channel| &channel[..frames])
                .collect();
            let mut output_refs: Vec<&mut [f32]> = output_channels
                .iter_mut()
                .map(|channel| &mut channel[..frames])
                .collect();
            // `frames` is already clamped to `block_size` above, so this
            // can never fail with `InvalidArgument`.
            let _ = env.process(frames, &input_refs, &mut output_refs);

            for frame in 0..frames {
                for (channel_idx, channel) in output_channels.iter().enumerate() {
                    data[frame * num_outputs + channel_idx] = channel[frame];
                }
            }
            for sample in &mut data[frames * num_outputs..] {
                *sample = 0.0;
            }
        }),
        Box::new(|err| tracing::error!(error = %err, "output stream error")),
    )?;

    Ok(Driver {
        _output: output,
        _input: input,
    })
}
