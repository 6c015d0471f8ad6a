//! Change log produced by a reconciliation run.
//!
//! Each [`ChangeRecord`] names one entity that was created, updated or
//! deleted. In [`Verbosity::Verbose`] mode records carry the attribute
//! mutations; in [`Verbosity::Summary`] mode only kind, path and type.
//!
//! Records never carry values of sensitive fields: those are replaced by
//! [`REDACTED`] before a record is built.
//!
//! The log [`digest`](ChangeLog::digest) covers the records only, so two
//! runs over the same inputs agree on it even though their run ids and
//! start times differ.

pub mod human_summary;

pub use human_summary::render_summary;

use crate::diff::Mutation;
use crate::errors::{ConfError, Result};
use crate::path::Path;
use crate::schema::EntityType;
use arcconf_core_types::{RequestId, REDACTED};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How much detail change records carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Summary,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub path: Path,
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutations: Vec<Mutation>,
}

impl ChangeRecord {
    /// Record for an entity of `entity_type`, masking sensitive attributes
    pub fn new(
        kind: ChangeKind,
        path: Path,
        entity_type: &EntityType,
        mutations: &[Mutation],
    ) -> Self {
        Self {
            kind,
            path,
            entity_type: entity_type.name.clone(),
            mutations: redact(entity_type, mutations),
        }
    }
}

/// Mutations with values of sensitive fields masked
pub fn redact(entity_type: &EntityType, mutations: &[Mutation]) -> Vec<Mutation> {
    mutations
        .iter()
        .map(|m| match entity_type.field_by_attribute(m.attribute()) {
            Some(field) if field.sensitive => m.masked(REDACTED),
            _ => m.clone(),
        })
        .collect()
}

/// Ordered change records of one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLog {
    run_id: RequestId,
    started_at: DateTime<Utc>,
    verbosity: Verbosity,
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            run_id: RequestId::new(),
            started_at: Utc::now(),
            verbosity,
            records: Vec::new(),
        }
    }

    /// Tag the log with the caller's request id
    pub fn with_run_id(mut self, run_id: RequestId) -> Self {
        self.run_id = run_id;
        self
    }

    /// Append a record, dropping its mutations in summary mode
    pub fn push(&mut self, mut record: ChangeRecord) {
        if self.verbosity == Verbosity::Summary {
            record.mutations.clear();
        }
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ChangeRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn run_id(&self) -> &RequestId {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of records of the given kind
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// SHA-256 over the canonical JSON of the records, hex encoded
    ///
    /// # Errors
    ///
    /// `Serialization` if the records cannot be encoded.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.records).map_err(|e| ConfError::Serialization {
            message: e.to_string(),
        })?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfError::Serialization {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn record(kind: ChangeKind) -> ChangeRecord {
        let schema = Schema::archive().unwrap();
        let ty = schema.entity_type("queue").unwrap();
        ChangeRecord::new(
            kind,
            Path::parse("dcmQueueName=Q1,dicomDeviceName=arc").unwrap(),
            ty,
            &[Mutation::replace("dcmMaxRetries", vec!["3".to_string()])],
        )
    }

    #[test]
    fn test_summary_mode_drops_mutations() {
        let mut log = ChangeLog::new(Verbosity::Summary);
        log.push(record(ChangeKind::Updated));
        assert!(log.records()[0].mutations.is_empty());

        let mut verbose = ChangeLog::new(Verbosity::Verbose);
        verbose.push(record(ChangeKind::Updated));
        assert_eq!(verbose.records()[0].mutations.len(), 1);
    }

    #[test]
    fn test_digest_ignores_run_identity() {
        let mut a = ChangeLog::new(Verbosity::Verbose);
        let mut b = ChangeLog::new(Verbosity::Verbose);
        a.push(record(ChangeKind::Created));
        b.push(record(ChangeKind::Created));
        assert_ne!(a.run_id(), b.run_id());
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);
    }

    #[test]
    fn test_sensitive_values_masked() {
        let schema = Schema::archive().unwrap();
        let rec = ChangeRecord::new(
            ChangeKind::Updated,
            Path::parse("dicomDeviceName=arc").unwrap(),
            schema.root(),
            &[Mutation::replace("dcmKeyStorePin", vec!["secret".to_string()])],
        );
        assert_eq!(rec.mutations[0].values(), [REDACTED]);
    }

    #[test]
    fn test_counts_by_kind() {
        let mut log = ChangeLog::new(Verbosity::Summary);
        log.extend([record(ChangeKind::Created), record(ChangeKind::Deleted)]);
        assert_eq!(log.count(ChangeKind::Created), 1);
        assert_eq!(log.count(ChangeKind::Updated), 0);
        assert_eq!(log.len(), 2);
    }
}
