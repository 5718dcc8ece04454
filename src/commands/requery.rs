// src/commands/requery.rs

//! Requery command

use super::load_with_overrides;
use crate::cli::RegistryArgs;
use anyhow::{Context, Result};
use portcheck::{RequeryTask, SqliteStatisticsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Re-check recorded packages, once or on the configured schedule
pub async fn cmd_requery(
    registry: &RegistryArgs,
    database: Option<PathBuf>,
    once: bool,
) -> Result<()> {
    let config = load_with_overrides(registry)?;
    let database = database.unwrap_or_else(|| config.requery.database.clone());

    let store = SqliteStatisticsStore::open(&database)
        .with_context(|| format!("Failed to open statistics database {}", database.display()))?;
    let task = RequeryTask::new(Arc::new(store), config.registry_client()?, config.policy())
        .with_config(config.investigator_config()?);

    if once {
        let summary = task.run_once().await?;
        println!(
            "Checked {} packages: {} updated, {} unchanged, {} failed, {} missing",
            summary.checked, summary.updated, summary.unchanged, summary.failed, summary.missing
        );
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping requery task");
            shutdown.cancel();
        }
    });

    task.run(config.requery_schedule()?, &cancel).await;
    Ok(())
}
