//! Prisma CLI - command-line host for the prisma analysis engine.

mod commands;
mod preset;
mod stft;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prisma")]
#[command(author, version, about = "Real-time audio feature extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract audio features from a WAV file
    Analyze(commands::analyze::AnalyzeArgs),

    /// List available analysis modules and their parameters
    Modules(commands::modules::ModulesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Modules(args) => commands::modules::run(args),
    }
}
