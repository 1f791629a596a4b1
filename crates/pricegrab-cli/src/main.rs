use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod collect;

#[derive(Debug, Parser)]
#[command(name = "pricegrab")]
#[command(about = "Marketplace listing price collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process the configured URL rows and write the results file.
    Collect {
        /// Rows file to read instead of the configured path.
        #[arg(long)]
        rows: Option<PathBuf>,
        /// Results file to write instead of the configured path.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Process at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
        /// Skip all inter-request delays (for dry runs against fixtures).
        #[arg(long)]
        no_pacing: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration problems are the only fatal errors — they stop the run
    // before any row is touched.
    let config = pricegrab_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Collect {
            rows,
            out,
            limit,
            no_pacing,
        } => collect::run(&config, rows, out, limit, no_pacing).await,
    }
}
