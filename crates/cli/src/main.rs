//! Cull CLI - cull command

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cli_lib::cmd;

/// Cull - generational retention for database backup blobs
#[derive(Parser)]
#[command(name = "cull")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and delete expired backups for every configured database
    Run {
        /// Path to config file (default: <config_dir>/cull/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Classify and report only; delete nothing
        #[arg(long)]
        dry_run: bool,

        /// Restrict the run to one configured database
        #[arg(long)]
        database: Option<String>,
    },
    /// Check the config file and every database policy
    Validate {
        /// Path to config file (default: <config_dir>/cull/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print a documented sample configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            dry_run,
            database,
        } => cmd::run::run(config, dry_run, database).await,
        Commands::Validate { config } => cmd::validate::run(config).await,
        Commands::Example => cmd::example::run().await,
    }
}
