//! Thrum CLI - Command-line interface for the Thrum DSP framework.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "thrum")]
#[command(author, version, about = "Thrum DSP Framework CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List and manage audio devices
    Devices(commands::devices::DevicesArgs),

    /// Run the engine against a live audio device
    Run(commands::run::RunArgs),

    /// Render the engine offline to a WAV file
    Render(commands::render::RenderArgs),

    /// List discoverable synth-definition URIs
    ListPlugins(commands::list_plugins::ListPluginsArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    tracing::debug!(command = ?std::mem::discriminant(&cli.command), "dispatching command");

    match cli.command {
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::ListPlugins(args) => commands::list_plugins::run(args),
    }
}
