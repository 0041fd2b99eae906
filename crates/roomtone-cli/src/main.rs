//! Roomtone CLI - inspect scenes and run the occlusion engine from a terminal.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roomtone")]
#[command(author, version, about = "Zone-graph sound occlusion CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in scenes, or print one as TOML
    Scenes(commands::scenes::ScenesArgs),

    /// Show the zones, connectors and adjacency of a scene
    Inspect(commands::inspect::InspectArgs),

    /// Find the path between two zones and reduce it to occlusion
    Route(commands::route::RouteArgs),

    /// Check a scene file for authoring mistakes
    Validate(commands::validate::ValidateArgs),

    /// Run the scheduler on a scene and print occlusion per tick
    Simulate(commands::simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so that `--json` output on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenes(args) => commands::scenes::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Route(args) => commands::route::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
    }
}
