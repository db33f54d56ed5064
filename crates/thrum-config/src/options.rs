//! Serializable mirror of [`thrum_core::Options`] (§12).
//!
//! `thrum_core::Options` itself carries no serde dependency (it is
//! `no_std`-compatible and lives on the RT side of the crate boundary). This
//! module is the TOML-facing copy: a `thrum-cli` `run`/`render` invocation
//! loads an [`EngineOptions`] from disk (or falls back to its `Default`,
//! which matches `thrum_core::Options::default()`) and converts it once at
//! boot.

use serde::{Deserialize, Serialize};
use std::path::Path;

use thrum_core::Options;

use crate::error::ConfigError;

/// TOML-serializable mirror of [`thrum_core::Options`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineOptions {
    /// Audio sample rate in Hz.
    pub sample_rate: f64,
    /// Frames processed per `process` call.
    pub block_size: usize,
    /// Number of external input channels.
    pub num_inputs: usize,
    /// Number of external output channels.
    pub num_outputs: usize,
    /// Number of internal (non-external) audio buses.
    pub num_internal_buses: usize,
    /// Maximum number of live nodes.
    pub max_num_nodes: usize,
    /// Capacity of the NRT-to-RT command queue.
    pub rt_command_queue_size: usize,
    /// Capacity of the RT-to-NRT job queue.
    pub nrt_job_queue_size: usize,
    /// Maximum number of queued commands drained per block.
    pub max_commands_per_block: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Options::default().into()
    }
}

impl From<Options> for EngineOptions {
    fn from(opts: Options) -> Self {
        Self {
            sample_rate: opts.sample_rate,
            block_size: opts.block_size,
            num_inputs: opts.num_inputs,
            num_outputs: opts.num_outputs,
            num_internal_buses: opts.num_internal_buses,
            max_num_nodes: opts.max_num_nodes,
            rt_command_queue_size: opts.rt_command_queue_size,
            nrt_job_queue_size: opts.nrt_job_queue_size,
            max_commands_per_block: opts.max_commands_per_block,
        }
    }
}

impl From<EngineOptions> for Options {
    fn from(opts: EngineOptions) -> Self {
        Self {
            sample_rate: opts.sample_rate,
            block_size: opts.block_size,
            num_inputs: opts.num_inputs,
            num_outputs: opts.num_outputs,
            num_internal_buses: opts.num_internal_buses,
            max_num_nodes: opts.max_num_nodes,
            rt_command_queue_size: opts.rt_command_queue_size,
            nrt_job_queue_size: opts.nrt_job_queue_size,
            max_commands_per_block: opts.max_commands_per_block,
        }
    }
}

impl EngineOptions {
    /// Load engine options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Save engine options to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert into the engine's own [`thrum_core::Options`].
    #[must_use]
    pub fn into_engine(self) -> Options {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_engine_default() {
        let ours = EngineOptions::default();
        let engine = Options::default();
        assert_eq!(ours.sample_rate, engine.sample_rate);
        assert_eq!(ours.block_size, engine.block_size);
        assert_eq!(ours.max_num_nodes, engine.max_num_nodes);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut opts = EngineOptions::default();
        opts.sample_rate = 44_100.0;
        opts.block_size = 128;
        let toml = toml::to_string_pretty(&opts).unwrap();
        let parsed: EngineOptions = toml::from_str(&toml).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn converts_into_engine_options() {
        let opts = EngineOptions {
            sample_rate: 96_000.0,
            block_size: 256,
            ..EngineOptions::default()
        };
        let engine: Options = opts.into_engine();
        assert_eq!(engine.sample_rate, 96_000.0);
        assert_eq!(engine.block_size, 256);
    }

    #[test]
    fn missing_fields_fall_back_to_default() {
        let parsed: EngineOptions = toml::from_str("sample_rate = 44100.0").unwrap();
        assert_eq!(parsed.sample_rate, 44_100.0);
        assert_eq!(parsed.block_size, EngineOptions::default().block_size);
    }
}
