//! Embedded archive device schema

use super::Schema;
use crate::errors::Result;

/// Schema document for the archive device extension and its collections
pub const ARCHIVE_SCHEMA_YAML: &str = include_str!("archive.yaml");

/// Resolve the embedded archive schema
pub fn archive_schema() -> Result<Schema> {
    Schema::from_yaml_str(ARCHIVE_SCHEMA_YAML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{IsoDuration, Value};

    #[test]
    fn test_archive_schema_resolves() {
        let schema = archive_schema().unwrap();
        let root = schema.root();
        assert_eq!(root.name, "archiveDevice");
        assert_eq!(root.object_class, "dcmArchiveDevice");
        assert_eq!(root.children.len(), 12);
    }

    #[test]
    fn test_archive_queue_defaults() {
        let schema = archive_schema().unwrap();
        let queue = schema.entity_type("queue").unwrap();
        assert_eq!(queue.field("maxRetries").unwrap().default, Some(Value::Int(0)));
        assert_eq!(
            queue.field("retryDelay").unwrap().default,
            Some(Value::Duration(IsoDuration::from_secs(60)))
        );
    }

    #[test]
    fn test_archive_nested_and_tuple_keys() {
        let schema = archive_schema().unwrap();
        let sets = schema.root().collection("attributeSets").unwrap();
        assert_eq!(sets.key, ["type", "id"]);

        let ui = schema.root().collection("uiConfigs").unwrap();
        let diff = ui.entity_type.collection("uiDiffConfigs").unwrap();
        assert!(diff.entity_type.collection("uiDiffCriteria").is_some());
    }

    #[test]
    fn test_archive_sensitive_fields() {
        let schema = archive_schema().unwrap();
        let pin = schema.root().field("keyStorePin").unwrap();
        assert!(pin.sensitive);
    }
}
