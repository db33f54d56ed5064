//! Configuration and preset management for the thrum engine (§12).
//!
//! This crate owns everything that needs to persist across process
//! restarts but has no place on the RT/NRT hot path:
//!
//! - [`EngineOptions`]: a TOML-serializable mirror of
//!   [`thrum_core::Options`], the engine's immutable startup configuration.
//! - [`GraphPreset`]: a named, replayable sequence of graph-construction
//!   steps - "a saved set of `Insert` requests to replay at boot" - built
//!   on `thrum-dispatch`'s `RequestBody` contract.
//! - [`paths`]: platform-specific config/preset/plugin-search directories,
//!   resolved through `dirs`.
//!
//! # Example
//!
//! ```rust,no_run
//! use thrum_config::{EngineOptions, GraphPreset, user_presets_dir};
//!
//! let options = EngineOptions::load("thrum.toml").unwrap_or_default();
//! let preset = GraphPreset::load(user_presets_dir().join("boot.toml")).unwrap();
//! preset.validate().unwrap();
//! ```

mod error;
mod options;
mod preset;

/// Platform-specific paths for presets, configuration, and plugin search.
pub mod paths;

pub use error::ConfigError;
pub use options::EngineOptions;
pub use paths::{
    ensure_user_config_dir, ensure_user_presets_dir, find_preset, list_all_presets,
    list_system_presets, list_user_presets, plugin_search_paths, preset_name_from_path,
    system_presets_dir, user_config_dir, user_presets_dir,
};
pub use preset::{GraphPreset, GraphStep, ResolvedStep, StepAddAction, StepArg};
