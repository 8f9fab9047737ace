//! Voz CLI - offline rendering and inspection for the voz voice engine.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "voz")]
#[command(author, version, about = "Voz voice engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the voice bank to a WAV file
    Render(commands::render::RenderArgs),

    /// List the synthesis models of each module
    Models(commands::models::ModelsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Models(args) => commands::models::run(args),
    }
}
