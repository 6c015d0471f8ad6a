//! SQL migrations compiled into the crate
//!
//! Ids are recorded in `schema_version` together with a checksum of the SQL,
//! so a shipped migration must never be edited; add a new one instead.

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All migrations, oldest first
pub const MIGRATIONS: &[Migration] = &[
    // entries table backing SqliteDirectory
    Migration {
        id: "001_directory_entries",
        sql: include_str!("../../migrations/001_directory_entries.sql"),
    },
    // reconcile run ledger
    Migration {
        id: "002_reconcile_runs",
        sql: include_str!("../../migrations/002_reconcile_runs.sql"),
    },
];
