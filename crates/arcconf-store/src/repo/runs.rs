//! Ledger of applied reconciliation runs
//!
//! Each applied plan leaves one row keyed by the change log's run id, so a
//! later run can be compared against earlier ones by digest.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use arcconf_core::changelog::{ChangeKind, ChangeLog};
use arcconf_core::path::Path;
use rusqlite::Connection;
use serde::Serialize;

/// One row of the run ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub device_dn: String,
    pub started_at: String,
    pub ops_applied: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub change_log_digest: String,
}

/// Record an applied run
pub fn record_run(
    conn: &Connection,
    device: &Path,
    change_log: &ChangeLog,
    ops_applied: usize,
) -> Result<()> {
    conn.execute(
        "INSERT INTO reconcile_runs (run_id, device_dn, started_at, applied_at, ops_applied,
            created_count, updated_count, deleted_count, change_log_digest)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            change_log.run_id().to_string(),
            device.normalized(),
            change_log.started_at().to_rfc3339(),
            chrono::Utc::now().timestamp(),
            ops_applied as i64,
            change_log.count(ChangeKind::Created) as i64,
            change_log.count(ChangeKind::Updated) as i64,
            change_log.count(ChangeKind::Deleted) as i64,
            change_log.digest()?,
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

/// Runs recorded for `device`, oldest first
pub fn list_runs(conn: &Connection, device: &Path) -> Result<Vec<RunRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT run_id, device_dn, started_at, ops_applied, created_count, updated_count,
                    deleted_count, change_log_digest
             FROM reconcile_runs WHERE device_dn = ?1
             ORDER BY applied_at, started_at",
        )
        .map_err(from_rusqlite)?;
    let runs = stmt
        .query_map([device.normalized()], |row| {
            Ok(RunRecord {
                run_id: row.get(0)?,
                device_dn: row.get(1)?,
                started_at: row.get(2)?,
                ops_applied: row.get::<_, i64>(3)? as usize,
                created: row.get::<_, i64>(4)? as usize,
                updated: row.get::<_, i64>(5)? as usize,
                deleted: row.get::<_, i64>(6)? as usize,
                change_log_digest: row.get(7)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(runs)
}
