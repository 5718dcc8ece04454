// src/statistics/mod.rs

//! Package statistics
//!
//! Remembers which packages have been investigated and their last known
//! classification, and periodically re-checks them against the registry
//! (see [`RequeryTask`]).

mod requery;

pub use requery::{RequerySchedule, RequerySummary, RequeryTask};

use crate::db::{self, models};
use crate::error::Result;
use crate::package::{InvestigationResult, SupportType};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

pub use crate::db::models::PackageStatistic;

/// Storage for package statistics
pub trait StatisticsStore: Send + Sync {
    /// All recorded packages with their last known classification
    fn all_package_statistics(&self) -> Result<Vec<PackageStatistic>>;

    /// Replace the stored classification of a package
    fn update_support_type(&self, stat: &PackageStatistic, support_type: SupportType)
    -> Result<()>;

    /// Count every distinct package of an investigation
    ///
    /// Returns the number of packages recorded.
    fn record_result(&self, result: &InvestigationResult) -> Result<usize>;
}

/// Statistics store on SQLite
pub struct SqliteStatisticsStore {
    conn: Mutex<Connection>,
}

impl SqliteStatisticsStore {
    /// Open (creating and migrating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
        })
    }

    /// Look up a single package (case-insensitive)
    pub fn find(&self, name: &str) -> Result<Option<PackageStatistic>> {
        PackageStatistic::find_by_name(&self.conn.lock(), name)
    }

    /// Number of investigations recorded so far
    pub fn investigation_count(&self) -> Result<i64> {
        models::investigation_count(&self.conn.lock())
    }
}

impl StatisticsStore for SqliteStatisticsStore {
    fn all_package_statistics(&self) -> Result<Vec<PackageStatistic>> {
        PackageStatistic::list_all(&self.conn.lock())
    }

    fn update_support_type(
        &self,
        stat: &PackageStatistic,
        support_type: SupportType,
    ) -> Result<()> {
        let updated =
            PackageStatistic::set_support_type(&self.conn.lock(), &stat.name, support_type)?;
        if !updated {
            debug!("No statistics row for {}, nothing updated", stat.name);
        }
        Ok(())
    }

    fn record_result(&self, result: &InvestigationResult) -> Result<usize> {
        let packages = result.distinct_packages();
        let mut conn = self.conn.lock();

        db::transaction(&mut conn, |tx| {
            for package in &packages {
                PackageStatistic::record(tx, &package.package_name, package.support_type)?;
            }
            models::record_investigation(
                tx,
                &result.label,
                result.dependencies.len(),
                packages.len(),
            )?;
            Ok(packages.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageResult;

    #[test]
    fn test_record_result_counts_distinct_packages() {
        let store = SqliteStatisticsStore::open_in_memory().unwrap();

        let mut app = PackageResult::new("App", SupportType::InvestigationTarget);
        app.dependencies = vec![
            PackageResult::new("Json", SupportType::Supported),
            PackageResult::new("json", SupportType::Supported),
            PackageResult::failed("Flaky", "timeout"),
        ];
        let result = InvestigationResult::new("cli", vec![app]);

        assert_eq!(store.record_result(&result).unwrap(), 3);
        assert_eq!(store.record_result(&result).unwrap(), 3);

        let json = store.find("JSON").unwrap().unwrap();
        assert_eq!(json.count, 2);
        assert_eq!(json.latest_support_type, Some(SupportType::Supported));

        let flaky = store.find("Flaky").unwrap().unwrap();
        assert_eq!(flaky.latest_support_type, None);

        assert_eq!(store.all_package_statistics().unwrap().len(), 3);
        assert_eq!(store.investigation_count().unwrap(), 2);
    }

    #[test]
    fn test_update_support_type() {
        let store = SqliteStatisticsStore::open_in_memory().unwrap();
        let result = InvestigationResult::new(
            "cli",
            vec![PackageResult::new("Foo", SupportType::Unsupported)],
        );
        store.record_result(&result).unwrap();

        let stat = store.find("foo").unwrap().unwrap();
        store
            .update_support_type(&stat, SupportType::KnownReplacementAvailable)
            .unwrap();

        assert_eq!(
            store.find("Foo").unwrap().unwrap().latest_support_type,
            Some(SupportType::KnownReplacementAvailable)
        );
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.db");

        {
            let store = SqliteStatisticsStore::open(&path).unwrap();
            let result = InvestigationResult::new(
                "cli",
                vec![PackageResult::new("Foo", SupportType::Supported)],
            );
            store.record_result(&result).unwrap();
        }

        let reopened = SqliteStatisticsStore::open(&path).unwrap();
        assert_eq!(reopened.all_package_statistics().unwrap().len(), 1);
    }
}
