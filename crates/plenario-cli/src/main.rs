//! Plenário CLI
//!
//! Two-step pipeline over Chamber of Deputies voting data:
//! - `harvest` pulls raw JSON from the open-data API into a year archive
//! - `consolidate` reconciles the archive into one per-ballot table

use clap::{Parser, Subcommand};

mod consolidate;
mod harvest;

#[derive(Parser)]
#[command(name = "plenario")]
#[command(version, about = "Chamber of Deputies voting-data pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch vote events, ballots, directives, and proposição themes into an archive.
    Harvest(harvest::HarvestArgs),
    /// Reconcile an archive into the consolidated per-ballot table.
    Consolidate(consolidate::ConsolidateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("plenario v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Commands::Harvest(args) => harvest::run(args).await,
        Commands::Consolidate(args) => consolidate::run(args),
    }
}
