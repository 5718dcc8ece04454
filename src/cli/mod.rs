// src/cli/mod.rs
//! CLI definitions for portcheck
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `investigate` - Classify packages and their dependency trees
//! - `requery` - Re-check recorded packages on a schedule
//! - `stats` - Show recorded package statistics

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portcheck")]
#[command(version)]
#[command(about = "Check whether packages and their dependencies support a target platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Registry selection shared by commands that talk to a registry
#[derive(Args, Debug, Default)]
pub struct RegistryArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Registry base URL (overrides the config file)
    #[arg(long, conflicts_with = "index")]
    pub registry: Option<String>,

    /// Static package index file instead of a registry
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Maximum concurrent registry lookups
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Overall deadline for one investigation (e.g., "10m")
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Investigate packages and print their classification
    Investigate {
        /// Root package names
        #[arg(required = true)]
        packages: Vec<String>,

        #[command(flatten)]
        registry: RegistryArgs,

        /// Label attached to the result
        #[arg(short, long, default_value = "cli")]
        label: String,

        /// Output format: flat, json, json-flat
        #[arg(short, long, default_value = "flat")]
        format: String,

        /// Record the result in this statistics database
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Re-check recorded packages and update changed classifications
    Requery {
        #[command(flatten)]
        registry: RegistryArgs,

        /// Statistics database (overrides the config file)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
    },

    /// Show recorded package statistics
    Stats {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Statistics database (overrides the config file)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}
