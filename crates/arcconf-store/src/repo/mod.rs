//! Repository layer: the SQLite directory store and the run ledger

pub mod runs;
pub mod sqlite_directory;

pub use runs::{list_runs, record_run, RunRecord};
pub use sqlite_directory::SqliteDirectory;
