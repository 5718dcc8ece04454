// src/investigator/mod.rs

//! Package compatibility investigation
//!
//! Walks the dependency graph of one or more root packages, classifies every
//! package it meets and returns the result as a tree.
//!
//! # Architecture
//!
//! - **Traversal arena**: one node per distinct package name, queued then
//!   in flight then resolved. Cycles never re-enter a lookup.
//! - **Bounded fan-out**: at most `max_concurrency` registry lookups run at
//!   once across the whole graph, not per level.
//! - **Result cache**: singleflight memo in front of the registry, fresh per
//!   run unless one is injected with [`Investigator::with_cache`].
//! - **Deterministic assembly**: the tree is built after the crawl, from root
//!   order and declared dependency order.
//!
//! A failed lookup becomes an `Error` leaf; it never fails the run.
//! Cancellation and the overall timeout fail the whole run and discard
//! partial results.

mod cache;
mod traversal;

pub use cache::{CacheStats, InvestigationCache, NoResultCache, ResultCache};

use crate::error::{Error, Result};
use crate::package::{InvestigationResult, PackageKey};
use crate::policy::ClassificationPolicy;
use crate::registry::{LookupOutcome, RegistryClient};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use traversal::Traversal;

/// Default number of concurrent registry lookups
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default depth at which the result tree stops expanding
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Registry state of one package, as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub key: PackageKey,
    pub outcome: LookupOutcome,
}

/// Investigator tuning
#[derive(Debug, Clone)]
pub struct InvestigatorConfig {
    /// Maximum concurrent registry lookups per run
    pub max_concurrency: usize,
    /// Overall deadline for one run
    pub timeout: Option<Duration>,
    /// Accept an empty root list instead of failing the call
    pub allow_empty_roots: bool,
    /// Mark otherwise unclassified roots as `InvestigationTarget`
    pub mark_targets: bool,
    /// Nesting depth of the result tree; deeper packages are left out
    pub max_depth: usize,
}

impl Default for InvestigatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
            allow_empty_roots: false,
            mark_targets: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Recursive compatibility investigator
pub struct Investigator {
    registry: Arc<dyn RegistryClient>,
    policy: ClassificationPolicy,
    /// Shared cache; None means a fresh cache per run
    cache: Option<Arc<dyn ResultCache>>,
    config: InvestigatorConfig,
}

impl Investigator {
    /// Create an investigator with the default configuration
    pub fn new(registry: Arc<dyn RegistryClient>, policy: ClassificationPolicy) -> Self {
        Self {
            registry,
            policy,
            cache: None,
            config: InvestigatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: InvestigatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `cache` for every run instead of a fresh one per run
    ///
    /// Pass [`NoResultCache`] to always query the registry.
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Investigate `roots` and return the classified dependency tree
    pub async fn process<S: AsRef<str>>(
        &self,
        label: &str,
        roots: &[S],
    ) -> Result<InvestigationResult> {
        self.process_with_cancel(label, roots, &CancellationToken::new())
            .await
    }

    /// Like [`process`](Self::process), abandoning the run when `cancel` fires
    pub async fn process_with_cancel<S: AsRef<str>>(
        &self,
        label: &str,
        roots: &[S],
        cancel: &CancellationToken,
    ) -> Result<InvestigationResult> {
        let roots = self.validate_roots(roots)?;
        if roots.is_empty() {
            return Ok(InvestigationResult::new(label, Vec::new()));
        }

        let started = Instant::now();
        let cache: Arc<dyn ResultCache> = match &self.cache {
            Some(cache) => Arc::clone(cache),
            None => Arc::new(InvestigationCache::new()),
        };

        let mut traversal = Traversal::new();
        for root in &roots {
            traversal.schedule(root);
        }

        info!(
            "Investigating {} root package(s) for '{}' via {} registry ({} cache)",
            roots.len(),
            label,
            self.registry.name(),
            cache.name()
        );

        let crawl = self.crawl(cache.as_ref(), &mut traversal, cancel);
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, crawl)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => crawl.await?,
        }

        let dependencies = traversal.assemble(
            &roots,
            &self.policy,
            self.config.mark_targets,
            self.config.max_depth,
        );
        info!(
            "Investigation '{}' resolved {} package(s) in {:?}",
            label,
            traversal.len(),
            started.elapsed()
        );

        Ok(InvestigationResult::new(label, dependencies))
    }

    fn validate_roots<S: AsRef<str>>(&self, roots: &[S]) -> Result<Vec<String>> {
        if roots.is_empty() && !self.config.allow_empty_roots {
            return Err(Error::InvalidInput(
                "At least one root package is required".to_string(),
            ));
        }

        roots
            .iter()
            .map(|root| {
                let root = root.as_ref().trim();
                if root.is_empty() {
                    Err(Error::InvalidInput("Root package name is blank".to_string()))
                } else {
                    Ok(root.to_string())
                }
            })
            .collect()
    }

    /// Resolve every reachable package, bounded by `max_concurrency`
    async fn crawl(
        &self,
        cache: &dyn ResultCache,
        traversal: &mut Traversal,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let limit = self.config.max_concurrency.max(1);
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < limit {
                let Some((key, name)) = traversal.start_next() else {
                    break;
                };
                in_flight.push(self.resolve(cache, key, name));
            }

            if in_flight.is_empty() {
                debug_assert!(!traversal.has_queued());
                return Ok(());
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Investigation cancelled with {} lookup(s) in flight", in_flight.len());
                    return Err(Error::Cancelled);
                }
                next = in_flight.next() => next,
            };

            if let Some(resolved) = next {
                debug_assert!(traversal.is_in_flight(&resolved.key));
                let scheduled = traversal.complete(resolved);
                if scheduled > 0 {
                    debug!("Scheduled {} new dependencies", scheduled);
                }
            }
        }
    }

    /// Look up and cache a single package
    async fn resolve(
        &self,
        cache: &dyn ResultCache,
        key: PackageKey,
        name: String,
    ) -> Arc<ResolvedPackage> {
        let compute = Box::pin(async {
            debug!("Looking up {} in {} registry", name, self.registry.name());
            let outcome = LookupOutcome::from(self.registry.lookup(&name).await);
            if let LookupOutcome::Failed(message) = &outcome {
                warn!("Lookup of {} failed: {}", name, message);
            }
            ResolvedPackage {
                key: key.clone(),
                outcome,
            }
        });

        cache.get_or_compute(&key, compute).await
    }
}
