// src/db/models/statistic.rs

//! Package statistics model
//!
//! One row per package name (case-insensitive) counting how often the
//! package has shown up in investigations and remembering its last
//! persistable classification.

use crate::error::Result;
use crate::package::SupportType;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A package statistics record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStatistic {
    pub id: Option<i64>,
    pub name: String,
    /// Number of investigations the package appeared in
    pub count: i64,
    /// Last persistable classification, None until one is recorded
    pub latest_support_type: Option<SupportType>,
    pub updated_at: Option<String>,
}

impl PackageStatistic {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let support_type: Option<String> = row.get(3)?;
        let latest_support_type = support_type
            .map(|s| {
                s.parse::<SupportType>()
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))
            })
            .transpose()?;

        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            count: row.get(2)?,
            latest_support_type,
            updated_at: row.get(4)?,
        })
    }

    /// List all statistics ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, count, latest_support_type, updated_at
             FROM package_statistics ORDER BY name COLLATE NOCASE",
        )?;

        let stats = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(stats)
    }

    /// Find the statistics for a package name (case-insensitive)
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let stat = conn
            .query_row(
                "SELECT id, name, count, latest_support_type, updated_at
                 FROM package_statistics WHERE name = ?1 COLLATE NOCASE",
                [name],
                Self::from_row,
            )
            .optional()?;

        Ok(stat)
    }

    /// Count one appearance of a package, storing its classification when
    /// it is persistable
    pub fn record(conn: &Connection, name: &str, support_type: SupportType) -> Result<()> {
        let stored = support_type.is_persistable().then(|| support_type.as_str());
        conn.execute(
            "INSERT INTO package_statistics (name, count, latest_support_type)
             VALUES (?1, 1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                count = count + 1,
                latest_support_type = COALESCE(excluded.latest_support_type, latest_support_type),
                updated_at = CURRENT_TIMESTAMP",
            params![name, stored],
        )?;
        Ok(())
    }

    /// Overwrite the stored classification
    ///
    /// Returns false if no row exists for the name.
    pub fn set_support_type(
        conn: &Connection,
        name: &str,
        support_type: SupportType,
    ) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE package_statistics
             SET latest_support_type = ?1, updated_at = CURRENT_TIMESTAMP
             WHERE name = ?2 COLLATE NOCASE",
            params![support_type.as_str(), name],
        )?;
        Ok(updated > 0)
    }
}

/// Log an investigation run
pub fn record_investigation(
    conn: &Connection,
    label: &str,
    root_count: usize,
    package_count: usize,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO investigations (label, root_count, package_count) VALUES (?1, ?2, ?3)",
        params![label, root_count as i64, package_count as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Number of recorded investigation runs
pub fn investigation_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM investigations", [], |row| row.get(0))?;
    Ok(count)
}
