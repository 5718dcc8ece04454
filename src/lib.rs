// src/lib.rs

//! Package compatibility investigation
//!
//! Given one or more root packages, walks their dependency graphs through a
//! package registry, classifies every package for support on the target
//! platform and reports the result as a tree or a flat list.
//!
//! # Architecture
//!
//! - Registry: pluggable lookup source ([`RegistryClient`]), HTTP or static
//! - Policy: pure classification over curated lists ([`ClassificationPolicy`])
//! - Investigator: bounded-concurrency crawl with a singleflight cache
//! - Statistics: SQLite record of investigated packages, periodically
//!   re-checked by [`RequeryTask`]

pub mod aggregate;
pub mod config;
pub mod db;
mod error;
pub mod investigator;
pub mod output;
pub mod package;
pub mod policy;
pub mod registry;
pub mod statistics;

pub use aggregate::flatten;
pub use config::{Config, parse_duration};
pub use error::{Error, Result};
pub use investigator::{
    DEFAULT_MAX_DEPTH, InvestigationCache, Investigator, InvestigatorConfig, NoResultCache,
    ResultCache,
};
pub use output::OutputFormat;
pub use package::{InvestigationResult, PackageKey, PackageResult, SupportType};
pub use policy::{ClassificationPolicy, PolicyConfig};
pub use registry::{HttpRegistry, LookupOutcome, PackageMetadata, RegistryClient, StaticRegistry};
pub use statistics::{
    RequerySchedule, RequerySummary, RequeryTask, SqliteStatisticsStore, StatisticsStore,
};
