// src/registry/mod.rs

//! Package registry clients
//!
//! A registry answers one question per package: what does it depend on,
//! and does it claim to support the target platform. Implementations:
//! - [`HttpRegistry`]: JSON over HTTP
//! - [`StaticRegistry`]: in-memory index, optionally loaded from TOML
//!
//! Lookup failures are returned as errors to the caller, which turns them
//! into an `Error` classification. Clients never retry.

mod http;
mod index;

pub use http::HttpRegistry;
pub use index::StaticRegistry;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Registry metadata for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Canonical spelling of the package name
    pub name: String,
    /// Version the metadata describes (usually the latest release)
    #[serde(default)]
    pub version: Option<String>,
    /// Names of the declared dependencies
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Registry asserts the package supports the target platform
    #[serde(default)]
    pub supports_target: bool,
    /// Substitute package suggested by the registry
    #[serde(default)]
    pub replacement: Option<String>,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            dependencies: Vec::new(),
            supports_target: false,
            replacement: None,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn supported(mut self) -> Self {
        self.supports_target = true;
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }
}

/// What a single registry lookup produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(PackageMetadata),
    NotFound,
    Failed(String),
}

impl LookupOutcome {
    pub fn metadata(&self) -> Option<&PackageMetadata> {
        match self {
            LookupOutcome::Found(metadata) => Some(metadata),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LookupOutcome::Failed(_))
    }
}

impl From<Result<Option<PackageMetadata>>> for LookupOutcome {
    fn from(result: Result<Option<PackageMetadata>>) -> Self {
        match result {
            Ok(Some(metadata)) => LookupOutcome::Found(metadata),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => LookupOutcome::Failed(e.to_string()),
        }
    }
}

/// Trait for querying package metadata from a registry
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Look up a single package by name
    ///
    /// Returns `Ok(None)` when the registry has no such package.
    async fn lookup(&self, name: &str) -> Result<Option<PackageMetadata>>;

    /// Get a human-readable name for this registry (for logging)
    fn name(&self) -> &str;
}
