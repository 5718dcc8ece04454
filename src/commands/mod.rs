// src/commands/mod.rs
//! Command handlers for the portcheck CLI

mod investigate;
mod requery;
mod stats;

pub use investigate::cmd_investigate;
pub use requery::cmd_requery;
pub use stats::cmd_stats;

use crate::cli::RegistryArgs;
use anyhow::{Context, Result};
use portcheck::Config;
use std::path::Path;

/// Load the config file if one was given, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Load the config and apply registry flags on top of it
fn load_with_overrides(args: &RegistryArgs) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(url) = &args.registry {
        config.registry.url = Some(url.clone());
        config.registry.index = None;
    }
    if let Some(index) = &args.index {
        config.registry.index = Some(index.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.investigation.max_concurrency = concurrency;
    }
    if let Some(timeout) = &args.timeout {
        config.investigation.timeout = Some(timeout.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
