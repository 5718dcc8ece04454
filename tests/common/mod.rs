// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use portcheck::{
    ClassificationPolicy, Investigator, PackageKey, PackageMetadata, PolicyConfig, RegistryClient,
    Result, StaticRegistry,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Registry wrapper that counts lookups and tracks peak concurrency
pub struct CountingRegistry {
    inner: StaticRegistry,
    delay: Duration,
    lookups: Mutex<HashMap<PackageKey, usize>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingRegistry {
    pub fn new(inner: StaticRegistry) -> Self {
        Self::with_delay(inner, Duration::ZERO)
    }

    /// Every lookup sleeps for `delay` before answering
    pub fn with_delay(inner: StaticRegistry, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            lookups: Mutex::new(HashMap::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Number of lookups issued for `name`
    pub fn lookups(&self, name: &str) -> usize {
        self.lookups
            .lock()
            .get(&PackageKey::new(name))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_lookups(&self) -> usize {
        self.lookups.lock().values().sum()
    }

    /// Highest number of lookups seen running at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for CountingRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<PackageMetadata>> {
        *self.lookups.lock().entry(PackageKey::new(name)).or_insert(0) += 1;

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = self.inner.lookup(name).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Build a registry from `(package, dependencies)` pairs
///
/// Packages are not marked as supporting the target.
pub fn graph(edges: &[(&str, &[&str])]) -> StaticRegistry {
    let mut registry = StaticRegistry::new();
    for (name, dependencies) in edges {
        registry.insert(PackageMetadata::new(*name).with_dependencies(dependencies.iter().copied()));
    }
    registry
}

pub fn default_policy() -> ClassificationPolicy {
    ClassificationPolicy::new(&PolicyConfig::default())
}

pub fn investigator(registry: &Arc<CountingRegistry>) -> Investigator {
    Investigator::new(registry.clone(), default_policy())
}
