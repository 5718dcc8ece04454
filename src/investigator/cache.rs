// src/investigator/cache.rs

//! Result caching for registry lookups (singleflight pattern)
//!
//! When several tasks ask for the same package concurrently, only one
//! registry lookup is made. The other tasks wait for that lookup and share
//! its result. Completed results are served from memory until they expire.
//!
//! [`NoResultCache`] is the pass-through variant for callers that always
//! want current registry data.

use super::ResolvedPackage;
use crate::package::PackageKey;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::debug;

/// Memoization layer between the investigator and the registry
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Return the cached resolution for `key`, running `compute` if needed
    ///
    /// Implementations that cache must run at most one `compute` per key
    /// at a time; concurrent callers share the in-flight computation.
    async fn get_or_compute<'a>(
        &'a self,
        key: &'a PackageKey,
        compute: BoxFuture<'a, ResolvedPackage>,
    ) -> Arc<ResolvedPackage>;

    /// Get a human-readable name for this cache (for logging)
    fn name(&self) -> &str;
}

/// A completed lookup and when it completed
struct Cached {
    resolved: Arc<ResolvedPackage>,
    completed_at: Instant,
}

type Slot = Arc<OnceCell<Cached>>;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held (completed or in flight)
    pub entries: usize,
    /// Requests answered without running a computation
    pub hits: u64,
    /// Computations actually executed
    pub misses: u64,
}

/// Singleflight cache keyed by package name
///
/// Failed lookups are dropped as soon as their computation finishes, so a
/// transient registry problem is retried by the next run instead of being
/// served from memory.
pub struct InvestigationCache {
    entries: DashMap<PackageKey, Slot>,
    /// Time-to-live for completed entries (None = never expire)
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InvestigationCache {
    /// Create a cache whose entries never expire
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache whose completed entries expire after `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::new()
        }
    }

    /// Get the in-flight or completed cell for a key, replacing it if expired
    ///
    /// Age counts from when the lookup finished, not when it started.
    fn cell_for(&self, key: &PackageKey) -> Slot {
        let mut entry = self.entries.entry(key.clone()).or_default();
        if let Some(ttl) = self.ttl
            && entry
                .get()
                .is_some_and(|cached| cached.completed_at.elapsed() >= ttl)
        {
            debug!("Cache entry for {} expired", key);
            *entry = Slot::default();
        }
        Arc::clone(&entry)
    }

    pub fn invalidate(&self, key: &PackageKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for InvestigationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for InvestigationCache {
    async fn get_or_compute<'a>(
        &'a self,
        key: &'a PackageKey,
        compute: BoxFuture<'a, ResolvedPackage>,
    ) -> Arc<ResolvedPackage> {
        // DashMap guard is released inside cell_for, before any await
        let cell = self.cell_for(key);

        if let Some(cached) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(&cached.resolved);
        }

        let cached = cell
            .get_or_init(|| async {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let resolved = Arc::new(compute.await);
                Cached {
                    resolved,
                    completed_at: Instant::now(),
                }
            })
            .await;
        let resolved = Arc::clone(&cached.resolved);

        if resolved.outcome.is_failure() {
            self.entries
                .remove_if(key, |_, slot| Arc::ptr_eq(slot, &cell));
        }

        resolved
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResultCache;

#[async_trait]
impl ResultCache for NoResultCache {
    async fn get_or_compute<'a>(
        &'a self,
        _key: &'a PackageKey,
        compute: BoxFuture<'a, ResolvedPackage>,
    ) -> Arc<ResolvedPackage> {
        Arc::new(compute.await)
    }

    fn name(&self) -> &str {
        "none"
    }
}
