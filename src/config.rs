// src/config.rs
//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [registry] - Registry URL and request timeout, or a static index file
//! - [investigation] - Concurrency limit, overall deadline
//! - [policy] - Curated supported/unsupported/replacement lists
//! - [requery] - Statistics database and requery schedule

use crate::error::{Error, Result};
use crate::investigator::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_DEPTH, InvestigatorConfig};
use crate::policy::{ClassificationPolicy, PolicyConfig};
use crate::registry::{HttpRegistry, RegistryClient, StaticRegistry};
use crate::statistics::RequerySchedule;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub investigation: InvestigationSection,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub requery: RequerySection,
}

/// Registry configuration section
#[derive(Debug, Deserialize)]
pub struct RegistrySection {
    /// Base URL of the package registry
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request timeout (e.g., "30s")
    #[serde(default = "default_registry_timeout")]
    pub timeout: String,

    /// Static package index; takes precedence over `url`
    #[serde(default)]
    pub index: Option<PathBuf>,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_registry_timeout(),
            index: None,
        }
    }
}

fn default_registry_timeout() -> String {
    "30s".to_string()
}

/// Investigation configuration section
#[derive(Debug, Deserialize)]
pub struct InvestigationSection {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Overall deadline for one investigation (e.g., "10m")
    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub allow_empty_roots: bool,

    /// Depth at which the reported tree stops expanding
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for InvestigationSection {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            timeout: None,
            allow_empty_roots: false,
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Requery configuration section
#[derive(Debug, Deserialize)]
pub struct RequerySection {
    /// Statistics database path
    #[serde(default = "default_database")]
    pub database: PathBuf,

    #[serde(default = "default_initial_delay")]
    pub initial_delay: String,

    #[serde(default = "default_interval")]
    pub interval: String,
}

impl Default for RequerySection {
    fn default() -> Self {
        Self {
            database: default_database(),
            initial_delay: default_initial_delay(),
            interval: default_interval(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("/var/lib/portcheck/statistics.db")
}

fn default_initial_delay() -> String {
    "10m".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.investigation.max_concurrency == 0 {
            return Err(Error::Config(
                "investigation.max_concurrency must be at least 1".to_string(),
            ));
        }

        parse_duration(&self.registry.timeout)?;
        if let Some(timeout) = &self.investigation.timeout {
            parse_duration(timeout)?;
        }
        self.requery_schedule()?;

        Ok(())
    }

    /// Build the registry client: the static index if set, else HTTP
    pub fn registry_client(&self) -> Result<Arc<dyn RegistryClient>> {
        if let Some(index) = &self.registry.index {
            return Ok(Arc::new(StaticRegistry::load(index)?));
        }

        let url = self
            .registry
            .url
            .as_deref()
            .ok_or_else(|| Error::Config("No registry.url or registry.index configured".to_string()))?;
        let timeout = parse_duration(&self.registry.timeout)?;
        Ok(Arc::new(HttpRegistry::with_timeout(url, timeout)?))
    }

    pub fn investigator_config(&self) -> Result<InvestigatorConfig> {
        let timeout = self
            .investigation
            .timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?;

        Ok(InvestigatorConfig {
            max_concurrency: self.investigation.max_concurrency,
            timeout,
            allow_empty_roots: self.investigation.allow_empty_roots,
            max_depth: self.investigation.max_depth,
            ..InvestigatorConfig::default()
        })
    }

    pub fn policy(&self) -> ClassificationPolicy {
        ClassificationPolicy::new(&self.policy)
    }

    pub fn requery_schedule(&self) -> Result<RequerySchedule> {
        let interval = parse_duration(&self.requery.interval)?;
        if interval.is_zero() {
            return Err(Error::Config("requery.interval must not be zero".to_string()));
        }

        Ok(RequerySchedule {
            initial_delay: parse_duration(&self.requery.initial_delay)?,
            interval,
        })
    }
}

/// Parse a duration string (e.g., "30s", "5m", "2h", "1d", "1w")
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = match s.char_indices().last() {
        Some((i, unit)) if unit.is_ascii_alphabetic() => {
            let multiplier = match unit {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 24 * 60 * 60,
                'w' => 7 * 24 * 60 * 60,
                _ => return Err(Error::Config(format!("Invalid duration unit: {}", unit))),
            };
            (&s[..i], multiplier)
        }
        _ => (s.as_str(), 1),
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid duration number: {}", num_str)))?;

    let seconds = num
        .checked_mul(multiplier)
        .ok_or_else(|| Error::Config(format!("Duration out of range: {}", s)))?;

    Ok(Duration::from_secs(seconds))
}
