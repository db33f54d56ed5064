//! Integration tests for thrum-cli: exercises the built `thrum` binary
//! end-to-end against its four subcommands.

use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `thrum` binary built by cargo.
fn thrum_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_thrum"))
}

#[test]
fn cli_help_lists_every_subcommand() {
    let output = thrum_bin().arg("--help").output().expect("failed to run thrum --help");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Thrum DSP Framework CLI"));
    assert!(stdout.contains("devices"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("list-plugins"));
}

#[test]
fn cli_version_works() {
    let output = thrum_bin().arg("--version").output().expect("failed to run thrum --version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("thrum"), "version output should contain 'thrum'");
}

#[test]
fn cli_devices_list_runs() {
    let output = thrum_bin()
        .args(["devices", "list"])
        .output()
        .expect("failed to run thrum devices list");

    // A CI sandbox may have no audio devices at all, but the command itself
    // must not fail: absence of hardware is reported, not an error.
    assert!(
        output.status.success(),
        "thrum devices list failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_list_plugins_shows_builtins() {
    let output = thrum_bin()
        .arg("list-plugins")
        .output()
        .expect("failed to run thrum list-plugins");

    assert!(
        output.status.success(),
        "thrum list-plugins failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("test:sine"));
    assert!(stdout.contains("thrum:gain"));
    assert!(stdout.contains("thrum:oscillator"));
}

#[test]
fn cli_render_without_preset_produces_silence() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("silence.wav");

    let output = thrum_bin()
        .args([
            "render",
            output_path.to_str().unwrap(),
            "--duration",
            "0.1",
        ])
        .output()
        .expect("failed to run thrum render");

    assert!(
        output.status.success(),
        "thrum render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output_path.exists(), "render should produce an output file");

    let (channels, spec) = thrum_io::read_wav_channels(&output_path).unwrap();
    assert_eq!(spec.sample_rate, 48000);
    assert!(channels.iter().all(|c| c.iter().all(|&s| s == 0.0)));
}

#[test]
fn cli_render_with_preset_produces_nonsilent_output() {
    let dir = TempDir::new().unwrap();
    let preset_path = dir.path().join("tone.toml");
    let output_path = dir.path().join("tone.wav");

    std::fs::write(
        &preset_path,
        r#"
name = "integration-test-tone"

[[steps]]
op = "synth"
plugin = "test:sine"

[[steps]]
op = "map_port"
target = 0
index = 0
bus = 0
"#,
    )
    .unwrap();

    let output = thrum_bin()
        .args([
            "render",
            output_path.to_str().unwrap(),
            "--preset",
            preset_path.to_str().unwrap(),
            "--duration",
            "0.05",
        ])
        .output()
        .expect("failed to run thrum render --preset");

    assert!(
        output.status.success(),
        "thrum render --preset failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (channels, _spec) = thrum_io::read_wav_channels(&output_path).unwrap();
    assert!(
        channels.iter().any(|c| c.iter().any(|&s| s != 0.0)),
        "rendering a preset that wires a sine generator to bus 0 should produce audible output"
    );
}

#[test]
fn cli_render_rejects_missing_preset() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("out.wav");

    let output = thrum_bin()
        .args([
            "render",
            output_path.to_str().unwrap(),
            "--preset",
            "definitely_not_a_real_preset_xyz",
        ])
        .output()
        .expect("failed to run thrum render");

    assert!(!output.status.success(), "render with an unresolvable preset name should fail");
}
