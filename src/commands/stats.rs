// src/commands/stats.rs

//! Statistics listing command

use super::load_config;
use anyhow::{Context, Result};
use portcheck::{SqliteStatisticsStore, StatisticsStore};
use std::path::{Path, PathBuf};

/// List recorded packages with their counts and last classification
pub fn cmd_stats(config: Option<&Path>, database: Option<PathBuf>) -> Result<()> {
    let database = match database {
        Some(database) => database,
        None => load_config(config)?.requery.database,
    };

    let store = SqliteStatisticsStore::open(&database)
        .with_context(|| format!("Failed to open statistics database {}", database.display()))?;
    let stats = store.all_package_statistics()?;

    if stats.is_empty() {
        println!("No packages recorded.");
        println!("\nUse 'portcheck investigate --record <db> <package>' to record results.");
        return Ok(());
    }

    println!(
        "Packages ({}, {} investigations):",
        stats.len(),
        store.investigation_count()?
    );
    for stat in &stats {
        let support = stat
            .latest_support_type
            .map_or("-", |support_type| support_type.as_str());
        println!("  {:<40} {:>6}  {}", stat.name, stat.count, support);
    }

    Ok(())
}
