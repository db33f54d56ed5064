//! Integration tests for thrum-config.
//!
//! These tests verify end-to-end functionality across modules: a
//! [`GraphPreset`] saved to disk, loaded back, validated, and resolved into
//! [`thrum_dispatch::RequestBody`] objects the way `thrum-cli`'s replay
//! loop would.

use tempfile::TempDir;
use thrum_config::{EngineOptions, GraphPreset, GraphStep, StepAddAction, StepArg};
use thrum_dispatch::RequestBody;

fn boot_preset() -> GraphPreset {
    GraphPreset::new("Sine through gain")
        .with_description("test:sine feeding thrum:gain on bus 0")
        .with_step(GraphStep::Synth {
            target: None,
            add_action: StepAddAction::AddToTail,
            plugin: "test:sine".into(),
            args: Vec::new(),
        })
        .with_step(GraphStep::Synth {
            target: None,
            add_action: StepAddAction::AddToTail,
            plugin: "thrum:gain".into(),
            args: vec![StepArg::Float(440.0)],
        })
        .with_step(GraphStep::MapPort {
            target: 0,
            index: 0,
            bus: Some(0),
        })
        .with_step(GraphStep::MapPort {
            target: 1,
            index: 0,
            bus: Some(0),
        })
        .with_step(GraphStep::SetControl {
            target: 1,
            index: 2,
            value: -6.0,
        })
}

#[test]
fn preset_save_load_roundtrip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let preset_path = temp_dir.path().join("boot.toml");

    let original = boot_preset();
    original.save(&preset_path).expect("should save preset");

    let loaded = GraphPreset::load(&preset_path).expect("should load preset");
    assert_eq!(loaded, original);
    assert!(loaded.validate().is_ok());
}

#[test]
fn preset_validates_before_replay() {
    let preset = boot_preset();
    assert!(preset.validate().is_ok());

    let broken = GraphPreset::new("Broken").with_step(GraphStep::MapPort {
        target: 5,
        index: 0,
        bus: Some(0),
    });
    assert!(broken.validate().is_err());
}

/// Simulates `thrum-cli`'s replay loop: walk steps in order, resolve each
/// `target` against a fake id table, and confirm the resulting
/// `RequestBody` carries the fields the step described.
#[test]
fn resolved_steps_carry_through_to_request_body() {
    let preset = boot_preset();
    preset.validate().expect("preset should validate");

    // Fake per-step "NodeId" stand-ins: thrum-dispatch's NodeId has no
    // public constructor outside the engine, so this test only checks the
    // non-NodeId fields a Dispatcher would read off each resolved step.
    for (index, step) in preset.steps.iter().enumerate() {
        let resolved = step.resolve(None);
        match step {
            GraphStep::Synth { plugin, args, .. } => {
                assert_eq!(resolved.body_type(), "Synth");
                assert_eq!(resolved.plugin_uri(), Some(plugin.as_str()));
                assert_eq!(resolved.args().len(), args.len());
            }
            GraphStep::MapPort { index: port, bus, .. } => {
                assert_eq!(resolved.body_type(), "MapPort");
                assert_eq!(resolved.port_index(), Some(*port));
                assert_eq!(resolved.bus().map(|b| b.index()), *bus);
            }
            GraphStep::SetControl { index: port, value, .. } => {
                assert_eq!(resolved.body_type(), "SetControl");
                assert_eq!(resolved.port_index(), Some(*port));
                assert_eq!(resolved.value(), Some(*value));
            }
            GraphStep::Group { .. } => assert_eq!(resolved.body_type(), "Group"),
        }
        let _ = index;
    }
}

#[test]
fn engine_options_round_trip_through_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let options_path = temp_dir.path().join("thrum.toml");

    let mut options = EngineOptions::default();
    options.sample_rate = 96_000.0;
    options.block_size = 256;
    options.save(&options_path).expect("should save options");

    let loaded = EngineOptions::load(&options_path).expect("should load options");
    assert_eq!(loaded, options);

    let engine: thrum_core::Options = loaded.into_engine();
    assert_eq!(engine.sample_rate, 96_000.0);
    assert_eq!(engine.block_size, 256);
}
