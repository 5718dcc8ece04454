// src/registry/index.rs

//! In-memory registry index
//!
//! Serves lookups from a fixed set of packages. Used for offline
//! investigations against a curated snapshot and throughout the tests.
//!
//! File format:
//!
//! ```toml
//! [[package]]
//! name = "Acme.Http"
//! version = "2.1.0"
//! dependencies = ["Acme.Core"]
//! supports_target = true
//!
//! [[package]]
//! name = "Flaky.Package"
//! error = "registry timed out"
//! ```

use super::{PackageMetadata, RegistryClient};
use crate::error::{Error, Result};
use crate::package::PackageKey;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    package: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    supports_target: bool,
    #[serde(default)]
    replacement: Option<String>,
    /// Simulated lookup failure for this package
    #[serde(default)]
    error: Option<String>,
}

/// Registry backed by an in-memory map
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    packages: HashMap<PackageKey, PackageMetadata>,
    failures: HashMap<PackageKey, String>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::ParseError(format!("{}: {e}", path.display())))
    }

    /// Parse an index from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let file: IndexFile =
            toml::from_str(content).map_err(|e| Error::ParseError(e.to_string()))?;

        let mut registry = Self::new();
        for entry in file.package {
            if let Some(error) = entry.error {
                registry.insert_failure(&entry.name, error);
                continue;
            }
            registry.insert(PackageMetadata {
                name: entry.name,
                version: entry.version,
                dependencies: entry.dependencies,
                supports_target: entry.supports_target,
                replacement: entry.replacement,
            });
        }
        Ok(registry)
    }

    /// Add or replace a package
    pub fn insert(&mut self, metadata: PackageMetadata) {
        let key = PackageKey::new(&metadata.name);
        self.failures.remove(&key);
        self.packages.insert(key, metadata);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, metadata: PackageMetadata) -> Self {
        self.insert(metadata);
        self
    }

    /// Make lookups of `name` fail with `message`
    pub fn insert_failure(&mut self, name: &str, message: impl Into<String>) {
        let key = PackageKey::new(name);
        self.packages.remove(&key);
        self.failures.insert(key, message.into());
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[async_trait]
impl RegistryClient for StaticRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<PackageMetadata>> {
        let key = PackageKey::new(name);
        if let Some(message) = self.failures.get(&key) {
            return Err(Error::DownloadError(message.clone()));
        }
        Ok(self.packages.get(&key).cloned())
    }

    fn name(&self) -> &str {
        "static"
    }
}
