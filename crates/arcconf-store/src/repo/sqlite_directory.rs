//! SQLite-backed directory store
//!
//! Entries live in the `entries` table keyed by normalized path, with their
//! attribute set as a JSON column. Subtree deletion walks `parent_norm`
//! links with a recursive CTE.

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{from_rusqlite, store_failure, Result};
use arcconf_core::apply::apply_ops;
use arcconf_core::diff::Mutation;
use arcconf_core::directory::{DirectoryStore, Entry, Filter, Scope};
use arcconf_core::errors::ConfError;
use arcconf_core::model::AttributeSet;
use arcconf_core::path::Path;
use arcconf_core::reconcile::ReconcilePlan;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path as FsPath;

type StoreResult<T> = arcconf_core::errors::Result<T>;

/// Directory store persisted in SQLite
pub struct SqliteDirectory {
    conn: Connection,
}

impl SqliteDirectory {
    /// Open (creating and migrating if needed) the database at `path`
    pub fn open<P: AsRef<FsPath>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: db::open_migrated(path)?,
        })
    }

    /// Fresh in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        crate::migrations::apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Wrap an already migrated connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Apply every op of `plan` inside one transaction
    ///
    /// Either all ops are applied or, on the first failure, none are.
    pub fn apply_atomically(&mut self, plan: &ReconcilePlan) -> Result<usize> {
        self.apply_atomically_with(plan, |_, _| Ok(()))
    }

    /// Like [`apply_atomically`](Self::apply_atomically), then run `after`
    /// with the applied op count inside the same transaction
    ///
    /// An error from `after` rolls back the ops as well.
    pub fn apply_atomically_with<F>(&mut self, plan: &ReconcilePlan, after: F) -> Result<usize>
    where
        F: FnOnce(&Connection, usize) -> Result<()>,
    {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let applied = apply_ops(&mut Entries(&tx), &plan.ops)?;
        after(&tx, applied)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(applied)
    }

    /// Number of stored entries
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl DirectoryStore for SqliteDirectory {
    fn search(&self, base: &Path, scope: Scope, filter: &Filter) -> StoreResult<Vec<Entry>> {
        Entries(&self.conn).search(base, scope, filter)
    }

    fn create_subtree(&mut self, path: &Path, attributes: &AttributeSet) -> StoreResult<()> {
        Entries(&self.conn).create_subtree(path, attributes)
    }

    fn modify_attributes(&mut self, path: &Path, mutations: &[Mutation]) -> StoreResult<()> {
        Entries(&self.conn).modify_attributes(path, mutations)
    }

    fn delete_subtree(&mut self, path: &Path) -> StoreResult<()> {
        Entries(&self.conn).delete_subtree(path)
    }
}

/// Entry operations over a connection or an open transaction
struct Entries<'c>(&'c Connection);

impl Entries<'_> {
    fn load(&self, path: &Path) -> StoreResult<Option<AttributeSet>> {
        let json: Option<String> = self
            .0
            .query_row(
                "SELECT attributes FROM entries WHERE dn_norm = ?1",
                [path.normalized()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| store_failure("read", e))?;
        json.map(|j| decode_attributes(&j)).transpose()
    }

    fn rows(&self, sql: &str, base: &Path) -> StoreResult<Vec<(String, String)>> {
        let mut stmt = self.0.prepare(sql).map_err(|e| store_failure("search", e))?;
        let rows = stmt
            .query_map([base.normalized()], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| store_failure("search", e))?
            .collect::<std::result::Result<Vec<(String, String)>, _>>()
            .map_err(|e| store_failure("search", e))?;
        Ok(rows)
    }
}

impl DirectoryStore for Entries<'_> {
    fn search(&self, base: &Path, scope: Scope, filter: &Filter) -> StoreResult<Vec<Entry>> {
        let sql = match scope {
            Scope::Base => "SELECT dn, attributes FROM entries WHERE dn_norm = ?1",
            Scope::OneLevel => {
                "SELECT dn, attributes FROM entries WHERE parent_norm = ?1 ORDER BY dn_norm"
            }
            Scope::Subtree => {
                "WITH RECURSIVE sub(dn_norm) AS (
                    SELECT dn_norm FROM entries WHERE dn_norm = ?1
                    UNION ALL
                    SELECT e.dn_norm FROM entries e JOIN sub ON e.parent_norm = sub.dn_norm
                 )
                 SELECT dn, attributes FROM entries
                 WHERE dn_norm IN (SELECT dn_norm FROM sub)
                 ORDER BY dn_norm"
            }
        };

        let mut entries = Vec::new();
        for (dn, json) in self.rows(sql, base)? {
            let attributes = decode_attributes(&json)?;
            if filter.matches(&attributes) {
                entries.push(Entry {
                    path: Path::parse(&dn)?,
                    attributes,
                });
            }
        }
        Ok(entries)
    }

    fn create_subtree(&mut self, path: &Path, attributes: &AttributeSet) -> StoreResult<()> {
        if path.is_empty() {
            return Err(ConfError::InvalidPath {
                path: String::new(),
                reason: "cannot create the empty path".to_string(),
            });
        }
        if self.load(path)?.is_some() {
            return Err(ConfError::EntryExists {
                path: path.to_string(),
            });
        }
        let parent = path.parent().filter(|p| !p.is_empty());
        if let Some(parent) = &parent {
            if self.load(parent)?.is_none() {
                return Err(ConfError::NoSuchEntry {
                    path: parent.to_string(),
                });
            }
        }

        let now = chrono::Utc::now().timestamp();
        self.0
            .execute(
                "INSERT INTO entries (dn_norm, dn, parent_norm, depth, attributes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    path.normalized(),
                    path.to_string(),
                    parent.as_ref().map(|p| p.normalized().to_string()),
                    path.depth() as i64,
                    encode_attributes(attributes)?,
                    now,
                ],
            )
            .map_err(|e| store_failure("create_subtree", e))?;
        Ok(())
    }

    fn modify_attributes(&mut self, path: &Path, mutations: &[Mutation]) -> StoreResult<()> {
        let mut attributes = self.load(path)?.ok_or_else(|| ConfError::NoSuchEntry {
            path: path.to_string(),
        })?;
        attributes.apply(&path.to_string(), mutations)?;

        self.0
            .execute(
                "UPDATE entries SET attributes = ?1, updated_at = ?2 WHERE dn_norm = ?3",
                params![
                    encode_attributes(&attributes)?,
                    chrono::Utc::now().timestamp(),
                    path.normalized(),
                ],
            )
            .map_err(|e| store_failure("modify_attributes", e))?;
        Ok(())
    }

    fn delete_subtree(&mut self, path: &Path) -> StoreResult<()> {
        let removed = self
            .0
            .execute(
                "WITH RECURSIVE sub(dn_norm) AS (
                    SELECT dn_norm FROM entries WHERE dn_norm = ?1
                    UNION ALL
                    SELECT e.dn_norm FROM entries e JOIN sub ON e.parent_norm = sub.dn_norm
                 )
                 DELETE FROM entries WHERE dn_norm IN (SELECT dn_norm FROM sub)",
                [path.normalized()],
            )
            .map_err(|e| store_failure("delete_subtree", e))?;
        if removed == 0 {
            return Err(ConfError::NoSuchEntry {
                path: path.to_string(),
            });
        }
        tracing::debug!(path = %path, removed, "subtree deleted");
        Ok(())
    }
}

fn encode_attributes(attributes: &AttributeSet) -> StoreResult<String> {
    serde_json::to_string(attributes).map_err(|e| ConfError::Serialization {
        message: e.to_string(),
    })
}

fn decode_attributes(json: &str) -> StoreResult<AttributeSet> {
    serde_json::from_str(json).map_err(|e| ConfError::Serialization {
        message: e.to_string(),
    })
}
