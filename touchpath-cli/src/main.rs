use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod display;
mod input;
mod output;

#[derive(Parser)]
#[command(name = "touchpath", about = "Multi-touch revenue attribution")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Attribute conversions and write every output collection
    Run(commands::run::RunArgs),
    /// Show grouped channel pathways
    Pathways(commands::pathways::PathwaysArgs),
    /// Compare per-channel credit across models
    Channels(commands::channels::ChannelsArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Pathways(args) => commands::pathways::run(args),
        Commands::Channels(args) => commands::channels::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
