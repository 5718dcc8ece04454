// src/commands/investigate.rs

//! Investigate command

use super::load_with_overrides;
use crate::cli::RegistryArgs;
use anyhow::{Context, Result, anyhow};
use portcheck::output::{self, OutputFormat};
use portcheck::{Investigator, SqliteStatisticsStore, StatisticsStore};
use std::path::Path;
use tracing::info;

/// Investigate `packages` and print the result
pub async fn cmd_investigate(
    packages: &[String],
    registry: &RegistryArgs,
    label: &str,
    format: &str,
    record: Option<&Path>,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow!(e))?;
    let config = load_with_overrides(registry)?;

    let client = config.registry_client()?;
    info!("Using registry: {}", client.name());

    let investigator =
        Investigator::new(client, config.policy()).with_config(config.investigator_config()?);
    let result = investigator.process(label, packages).await?;

    print!("{}", output::render(&result, format)?);
    if format != OutputFormat::Flat {
        println!();
    }

    if let Some(path) = record {
        let store = SqliteStatisticsStore::open(path)
            .with_context(|| format!("Failed to open statistics database {}", path.display()))?;
        let recorded = store.record_result(&result)?;
        info!("Recorded {} packages in {}", recorded, path.display());
    }

    Ok(())
}
