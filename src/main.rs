// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Investigate {
            packages,
            registry,
            label,
            format,
            record,
        } => {
            commands::cmd_investigate(&packages, &registry, &label, &format, record.as_deref())
                .await
        }
        Commands::Requery {
            registry,
            database,
            once,
        } => commands::cmd_requery(&registry, database, once).await,
        Commands::Stats { config, database } => commands::cmd_stats(config.as_deref(), database),
    }
}
