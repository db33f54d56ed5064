//! Graph preset demo: building, saving, and replaying a boot preset.
//!
//! Run with: cargo run -p thrum-config --example preset_demo

use thrum_config::{EngineOptions, GraphPreset, GraphStep, StepAddAction, StepArg};
use thrum_dispatch::RequestBody;

fn main() {
    println!("=== Engine Options ===\n");

    let options = EngineOptions::default();
    println!("{}", toml::to_string_pretty(&options).unwrap());

    println!("=== Graph Preset ===\n");

    let preset = GraphPreset::new("Sine through gain")
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
        });

    preset.validate().expect("preset should validate");

    println!("Preset: {}", preset.name);
    println!(
        "Description: {}",
        preset.description.as_deref().unwrap_or("none")
    );
    println!("Steps ({}):", preset.len());

    println!("\n--- Serialized TOML ---");
    let toml = preset.to_toml().unwrap();
    println!("{toml}");

    // Walk the steps the way thrum-cli's replay loop would, printing the
    // resolved request body each step would submit. `target` resolution to
    // a concrete `thrum_core::NodeId` happens at replay time, once the RT
    // thread's reply for the targeted step has arrived; here we just show
    // the request shape with no target filled in.
    println!("--- Resolved request bodies ---");
    for (index, step) in preset.steps.iter().enumerate() {
        let resolved = step.resolve(None);
        println!(
            "  [{index}] {} plugin={:?} port={:?} bus={:?} value={:?}",
            resolved.body_type(),
            resolved.plugin_uri(),
            resolved.port_index(),
            resolved.bus().map(|b| b.index()),
            resolved.value(),
        );
    }

    println!("\nPreset demo complete.");
}
