// src/statistics/requery.rs

//! Periodic requery of recorded packages
//!
//! Re-investigates every package in the statistics store with caching
//! disabled and writes back classifications that changed. Lookup failures
//! are logged and never persisted, so a registry outage cannot overwrite a
//! last-known-good classification.

use super::{PackageStatistic, StatisticsStore};
use crate::error::{Error, Result};
use crate::investigator::{Investigator, InvestigatorConfig, NoResultCache};
use crate::package::PackageResult;
use crate::policy::ClassificationPolicy;
use crate::registry::RegistryClient;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Label attached to requery investigations
pub const REQUERY_LABEL: &str = "Requery";

/// When the requery runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequerySchedule {
    /// Delay before the first run
    pub initial_delay: Duration,
    /// Time between runs
    pub interval: Duration,
}

impl Default for RequerySchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10 * 60),
            interval: Duration::from_secs(24 * 3600),
        }
    }
}

/// Outcome counts of one requery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequerySummary {
    pub checked: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Lookup errors, and store writes that failed
    pub failed: usize,
    /// Packages the investigation returned no result for
    pub missing: usize,
}

/// Requery job over a statistics store
pub struct RequeryTask {
    store: Arc<dyn StatisticsStore>,
    registry: Arc<dyn RegistryClient>,
    policy: ClassificationPolicy,
    config: InvestigatorConfig,
}

impl RequeryTask {
    pub fn new(
        store: Arc<dyn StatisticsStore>,
        registry: Arc<dyn RegistryClient>,
        policy: ClassificationPolicy,
    ) -> Self {
        Self {
            store,
            registry,
            policy,
            config: InvestigatorConfig::default(),
        }
    }

    /// Tune the underlying investigator (concurrency, timeout)
    pub fn with_config(mut self, config: InvestigatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Investigator for one pass: no cache, roots keep their real class
    fn investigator(&self) -> Investigator {
        let config = InvestigatorConfig {
            allow_empty_roots: true,
            mark_targets: false,
            ..self.config.clone()
        };

        Investigator::new(Arc::clone(&self.registry), self.policy.clone())
            .with_config(config)
            .with_cache(Arc::new(NoResultCache))
    }

    /// Run a single requery pass
    pub async fn run_once(&self) -> Result<RequerySummary> {
        self.run_once_with_cancel(&CancellationToken::new()).await
    }

    pub async fn run_once_with_cancel(&self, cancel: &CancellationToken) -> Result<RequerySummary> {
        let stats = self.store.all_package_statistics()?;
        let names: Vec<&str> = stats.iter().map(|stat| stat.name.as_str()).collect();

        let result = self
            .investigator()
            .process_with_cancel(REQUERY_LABEL, &names, cancel)
            .await?;

        let mut summary = RequerySummary {
            checked: stats.len(),
            ..RequerySummary::default()
        };
        for stat in &stats {
            self.update_package(result.root(&stat.name), stat, &mut summary);
        }

        Ok(summary)
    }

    fn update_package(
        &self,
        package: Option<&PackageResult>,
        stat: &PackageStatistic,
        summary: &mut RequerySummary,
    ) {
        let Some(package) = package else {
            info!("No result returned for {}", stat.name);
            summary.missing += 1;
            return;
        };

        if !package.was_successful() {
            info!(
                "Error occurred retrieving {}: {}",
                stat.name,
                package.error.as_deref().unwrap_or("unknown error")
            );
            summary.failed += 1;
            return;
        }

        if !package.support_type.is_persistable()
            || stat.latest_support_type == Some(package.support_type)
        {
            summary.unchanged += 1;
            return;
        }

        info!(
            "Updating support type for {} from {} to {}",
            stat.name,
            stat.latest_support_type
                .map_or("(none)", |support_type| support_type.as_str()),
            package.support_type
        );
        match self.store.update_support_type(stat, package.support_type) {
            Ok(()) => summary.updated += 1,
            Err(e) => {
                warn!("Failed to store support type for {}: {}", stat.name, e);
                summary.failed += 1;
            }
        }
    }

    /// Requery on `schedule` until `cancel` fires
    ///
    /// A failed pass is logged and the schedule continues.
    pub async fn run(&self, schedule: RequerySchedule, cancel: &CancellationToken) {
        info!(
            "Starting requery task timer (first run in {:?}, then every {:?})",
            schedule.initial_delay, schedule.interval
        );

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(schedule.initial_delay) => {}
        }

        let mut ticker = tokio::time::interval(schedule.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            info!("Requery statistics package support task started");
            match self.run_once_with_cancel(cancel).await {
                Ok(summary) => info!(
                    "Requery finished in {:?}: {} checked, {} updated, {} failed, {} missing",
                    started.elapsed(),
                    summary.checked,
                    summary.updated,
                    summary.failed,
                    summary.missing
                ),
                Err(Error::Cancelled) => break,
                Err(e) => error!("Requery statistics package support task failed: {}", e),
            }
        }

        info!("Requery task stopped");
    }
}
